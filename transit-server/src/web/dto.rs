//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Route, Stop, VehiclePosition};
use crate::gtfs::RoutePath;

/// Query string for search endpoints.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<usize>,
}

/// Query string for the arrivals endpoint.
#[derive(Debug, Deserialize)]
pub struct ArrivalsQuery {
    pub limit: Option<usize>,
}

/// Health check with load counts.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub stops: usize,
    pub routes: usize,
    pub trips: usize,
    pub shapes: usize,
    pub online: bool,
}

/// A stop in responses.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Ids of the routes serving this stop.
    pub routes: Vec<String>,
}

impl From<&Stop> for StopResult {
    fn from(stop: &Stop) -> Self {
        Self {
            id: stop.id.clone(),
            name: stop.name.clone(),
            lat: stop.lat,
            lon: stop.lon,
            routes: stop.route_ids().to_vec(),
        }
    }
}

/// A route in responses.
#[derive(Debug, Serialize)]
pub struct RouteResult {
    pub id: String,
    pub name: String,
    pub route_type: String,
    pub stop_count: usize,
}

impl From<&Route> for RouteResult {
    fn from(route: &Route) -> Self {
        Self {
            id: route.id.clone(),
            name: route.name.clone(),
            route_type: route.route_type.clone(),
            stop_count: route.stop_ids().len(),
        }
    }
}

/// A vehicle position in responses, live or simulated.
#[derive(Debug, Serialize)]
pub struct VehicleResult {
    pub vehicle_id: String,
    pub route_id: String,
    pub lat: f64,
    pub lon: f64,
    /// Heading in degrees; absent when the feed did not report one.
    pub bearing: Option<f32>,
}

impl From<&VehiclePosition> for VehicleResult {
    fn from(vehicle: &VehiclePosition) -> Self {
        Self {
            vehicle_id: vehicle.vehicle_id.clone(),
            route_id: vehicle.route_id.clone(),
            lat: vehicle.lat,
            lon: vehicle.lon,
            bearing: vehicle.has_bearing().then_some(vehicle.bearing),
        }
    }
}

/// One arrival line. Live arrivals carry a delay status, scheduled ones
/// the trip they belong to.
#[derive(Debug, Serialize)]
pub struct ArrivalResult {
    pub route_id: String,
    pub route_name: String,
    /// `HH:MM:SS`, local time for live predictions, verbatim schedule
    /// time otherwise.
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<String>,
}

/// Arrivals for a stop, tagged with the source that produced them.
#[derive(Debug, Serialize)]
pub struct ArrivalsResponse {
    pub source: &'static str,
    pub arrivals: Vec<ArrivalResult>,
}

/// A polyline point.
#[derive(Debug, Serialize)]
pub struct PathPoint {
    pub lat: f64,
    pub lon: f64,
}

/// A route's physical path, tagged with where it came from.
#[derive(Debug, Serialize)]
pub struct RoutePathResponse {
    pub source: &'static str,
    pub points: Vec<PathPoint>,
}

impl From<RoutePath> for RoutePathResponse {
    fn from(path: RoutePath) -> Self {
        let source = match &path {
            RoutePath::Shape(_) => "shape",
            RoutePath::StopPolyline(_) => "stops",
        };
        Self {
            source,
            points: path
                .points()
                .iter()
                .map(|&(lat, lon)| PathPoint { lat, lon })
                .collect(),
        }
    }
}

/// Current connectivity state.
#[derive(Debug, Serialize)]
pub struct ConnectivityResponse {
    pub online: bool,
}
