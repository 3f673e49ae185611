//! Schedule file parsing.
//!
//! Each resource is comma-delimited with a header row and fixed column
//! positions. Quoted fields may contain commas; the reader is flexible so
//! short rows reach our field-count check and are skipped rather than
//! aborting the load.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::domain::{Route, ShapePoint, Stop, StopTime, Trip};

/// A parsed schedule, before the linking pass.
///
/// Trips are kept in schedule-file order so the linking pass attaches them
/// to routes deterministically.
#[derive(Debug, Default)]
pub struct Schedule {
    pub stops: HashMap<String, Stop>,
    pub routes: HashMap<String, Route>,
    pub trips: Vec<Trip>,
    pub shapes: HashMap<String, Vec<ShapePoint>>,
}

/// Load every schedule resource from `dir`.
///
/// A missing or unreadable file logs a warning and contributes an empty
/// collection; the application still starts with whatever data is present.
pub fn load_schedule(dir: &Path) -> Schedule {
    let stops = load_stops(&dir.join("stops.txt"));
    let routes = load_routes(&dir.join("routes.txt"));
    let trips = load_trips(&dir.join("trips.txt"), &dir.join("stop_times.txt"));
    let shapes = load_shapes(&dir.join("shapes.txt"));

    Schedule {
        stops,
        routes,
        trips,
        shapes,
    }
}

fn open_reader(path: &Path) -> Option<csv::Reader<std::fs::File>> {
    match csv::ReaderBuilder::new().flexible(true).from_path(path) {
        Ok(reader) => Some(reader),
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "schedule resource missing; continuing with empty collection"
            );
            None
        }
    }
}

/// stops.txt: id(0), name(2), lat(4), lon(5).
fn load_stops(path: &Path) -> HashMap<String, Stop> {
    let mut stops = HashMap::new();
    let Some(mut reader) = open_reader(path) else {
        return stops;
    };

    for record in reader.records() {
        let Ok(record) = record else {
            continue;
        };
        if record.len() < 6 {
            debug!(fields = record.len(), "skipping short stop row");
            continue;
        }

        let id = record[0].trim().to_string();
        let name = record[2].trim().to_string();
        let (Ok(lat), Ok(lon)) = (record[4].trim().parse(), record[5].trim().parse()) else {
            debug!(stop_id = %id, "skipping stop row with unparseable coordinates");
            continue;
        };

        stops.insert(id.clone(), Stop::new(id, name, lat, lon));
    }

    info!(stops = stops.len(), "stops loaded");
    stops
}

/// routes.txt: id(0), type(1), name(2).
fn load_routes(path: &Path) -> HashMap<String, Route> {
    let mut routes = HashMap::new();
    let Some(mut reader) = open_reader(path) else {
        return routes;
    };

    for record in reader.records() {
        let Ok(record) = record else {
            continue;
        };
        if record.len() < 3 {
            debug!(fields = record.len(), "skipping short route row");
            continue;
        }

        let id = record[0].trim().to_string();
        let route_type = record[1].trim().to_string();
        let name = record[2].trim().to_string();
        routes.insert(id.clone(), Route::new(id, name, route_type));
    }

    info!(routes = routes.len(), "routes loaded");
    routes
}

/// trips.txt: route_id(0), trip_id(2), shape_id(6), then stop_times.txt:
/// trip_id(0), arrival_time(1), stop_id(3) appended to their trips.
///
/// Stop-times referencing an unknown trip are dropped.
fn load_trips(trips_path: &Path, stop_times_path: &Path) -> Vec<Trip> {
    let mut order: Vec<String> = Vec::new();
    let mut trips: HashMap<String, Trip> = HashMap::new();

    if let Some(mut reader) = open_reader(trips_path) {
        for record in reader.records() {
            let Ok(record) = record else {
                continue;
            };
            if record.len() < 7 {
                debug!(fields = record.len(), "skipping short trip row");
                continue;
            }

            let route_id = record[0].trim().to_string();
            let trip_id = record[2].trim().to_string();
            let shape_id = match record[6].trim() {
                "" => None,
                s => Some(s.to_string()),
            };

            if !trips.contains_key(&trip_id) {
                order.push(trip_id.clone());
            }
            trips.insert(trip_id.clone(), Trip::new(trip_id, route_id, shape_id));
        }
    }
    info!(trips = trips.len(), "trips loaded");

    let mut stop_time_count = 0usize;
    if let Some(mut reader) = open_reader(stop_times_path) {
        for record in reader.records() {
            let Ok(record) = record else {
                continue;
            };
            if record.len() < 4 {
                debug!(fields = record.len(), "skipping short stop-time row");
                continue;
            }

            let trip_id = record[0].trim();
            let arrival_time = record[1].trim();
            let stop_id = record[3].trim();

            if let Some(trip) = trips.get_mut(trip_id) {
                trip.add_stop_time(StopTime::new(trip_id, stop_id, arrival_time));
                stop_time_count += 1;
            }
        }
    }
    info!(stop_times = stop_time_count, "stop-times attached to trips");

    order
        .into_iter()
        .filter_map(|id| trips.remove(&id))
        .collect()
}

/// shapes.txt: shape_id(0), lat(1), lon(2), sequence(3).
///
/// Points are grouped by shape id and sorted by sequence once after the
/// full load.
fn load_shapes(path: &Path) -> HashMap<String, Vec<ShapePoint>> {
    let mut shapes: HashMap<String, Vec<ShapePoint>> = HashMap::new();
    let Some(mut reader) = open_reader(path) else {
        return shapes;
    };

    for record in reader.records() {
        let Ok(record) = record else {
            continue;
        };
        if record.len() < 4 {
            debug!(fields = record.len(), "skipping short shape row");
            continue;
        }

        let shape_id = record[0].trim().to_string();
        let (Ok(lat), Ok(lon)) = (record[1].trim().parse(), record[2].trim().parse()) else {
            continue;
        };
        let Ok(sequence) = record[3].trim().parse() else {
            continue;
        };

        shapes
            .entry(shape_id.clone())
            .or_default()
            .push(ShapePoint::new(shape_id, lat, lon, sequence));
    }

    for points in shapes.values_mut() {
        points.sort_by_key(|p| p.sequence);
    }

    info!(shapes = shapes.len(), "shapes loaded");
    shapes
}
