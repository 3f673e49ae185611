//! HTTP route handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Local};

use crate::arrivals::{DEFAULT_ARRIVAL_LIMIT, StopArrivals};

use super::dto::*;
use super::state::AppState;

/// Maximum number of search results per request.
const MAX_SEARCH_RESULTS: usize = 50;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/connectivity", get(connectivity))
        .route("/stops/search", get(search_stops))
        .route("/stops/:id", get(get_stop))
        .route("/stops/:id/arrivals", get(stop_arrivals))
        .route("/stops/:id/schedule", get(stop_schedule))
        .route("/stops/:id/routes", get(stop_routes))
        .route("/routes/search", get(search_routes))
        .route("/routes/:id", get(get_route))
        .route("/routes/:id/stops", get(route_stops))
        .route("/routes/:id/path", get(route_path))
        .route("/vehicles", get(live_vehicles))
        .route("/vehicles/simulated", get(simulated_vehicles))
        .with_state(state)
}

/// Health check with load counts.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        stops: state.index.stop_count(),
        routes: state.index.route_count(),
        trips: state.index.trip_count(),
        shapes: state.index.shape_count(),
        online: state.monitor.is_online(),
    })
}

/// Current connectivity state.
async fn connectivity(State(state): State<AppState>) -> Json<ConnectivityResponse> {
    Json(ConnectivityResponse {
        online: state.monitor.is_online(),
    })
}

/// Search stops by name substring or exact id.
async fn search_stops(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<StopResult>> {
    let limit = query.limit.unwrap_or(10).min(MAX_SEARCH_RESULTS);
    let results = state
        .index
        .search_stops(&query.q)
        .into_iter()
        .take(limit)
        .map(StopResult::from)
        .collect();
    Json(results)
}

/// Search routes by name substring or exact id.
async fn search_routes(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<RouteResult>> {
    let limit = query.limit.unwrap_or(10).min(MAX_SEARCH_RESULTS);
    let results = state
        .index
        .search_routes(&query.q)
        .into_iter()
        .take(limit)
        .map(RouteResult::from)
        .collect();
    Json(results)
}

/// Look up one stop.
async fn get_stop(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StopResult>, StatusCode> {
    state
        .index
        .stop(&id)
        .map(|stop| Json(stop.into()))
        .ok_or(StatusCode::NOT_FOUND)
}

/// Look up one route.
async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RouteResult>, StatusCode> {
    state
        .index
        .route(&id)
        .map(|route| Json(route.into()))
        .ok_or(StatusCode::NOT_FOUND)
}

/// Live-or-scheduled arrivals for a stop.
async fn stop_arrivals(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ArrivalsQuery>,
) -> Json<ArrivalsResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_ARRIVAL_LIMIT);

    let response = match state.board.arrivals_for(&id, limit).await {
        StopArrivals::Live(arrivals) => ArrivalsResponse {
            source: "live",
            arrivals: arrivals
                .into_iter()
                .map(|a| ArrivalResult {
                    route_id: a.route_id,
                    route_name: a.route_name,
                    time: format_epoch(a.arrival_time),
                    status: Some(a.delay.to_string()),
                    trip_id: None,
                })
                .collect(),
        },
        StopArrivals::Scheduled(arrivals) => ArrivalsResponse {
            source: "scheduled",
            arrivals: arrivals
                .into_iter()
                .map(|a| ArrivalResult {
                    route_id: a.route_id,
                    route_name: a.route_name,
                    time: a.arrival_time,
                    status: None,
                    trip_id: Some(a.trip_id),
                })
                .collect(),
        },
    };

    Json(response)
}

/// Scheduled arrivals for a stop, regardless of connectivity.
async fn stop_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ArrivalsQuery>,
) -> Json<ArrivalsResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_ARRIVAL_LIMIT);

    let arrivals = state
        .index
        .next_arrivals(&id, limit)
        .into_iter()
        .map(|stop_time| {
            let route_id = state
                .index
                .trip(&stop_time.trip_id)
                .map(|trip| trip.route_id.clone())
                .unwrap_or_default();
            let route_name = state
                .index
                .route(&route_id)
                .map(|route| route.name.clone())
                .unwrap_or_else(|| route_id.clone());
            ArrivalResult {
                route_id,
                route_name,
                time: stop_time.arrival_time.clone(),
                status: None,
                trip_id: Some(stop_time.trip_id.clone()),
            }
        })
        .collect();

    Json(ArrivalsResponse {
        source: "scheduled",
        arrivals,
    })
}

/// Routes whose trips call at a stop.
async fn stop_routes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<RouteResult>> {
    Json(
        state
            .index
            .routes_for_stop(&id)
            .into_iter()
            .map(RouteResult::from)
            .collect(),
    )
}

/// Stops served by a route.
async fn route_stops(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<StopResult>> {
    Json(
        state
            .index
            .stops_for_route(&id)
            .into_iter()
            .map(StopResult::from)
            .collect(),
    )
}

/// A route's physical path, shape or stop-polyline fallback.
async fn route_path(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RoutePathResponse>, StatusCode> {
    state
        .index
        .route_path(&id)
        .map(|path| Json(path.into()))
        .ok_or(StatusCode::NOT_FOUND)
}

/// Live vehicle positions, whole system.
async fn live_vehicles(State(state): State<AppState>) -> Json<Vec<VehicleResult>> {
    let vehicles = state.poller.vehicle_positions().await;
    Json(vehicles.iter().map(VehicleResult::from).collect())
}

/// Simulated vehicle positions, whole system.
async fn simulated_vehicles(State(state): State<AppState>) -> Json<Vec<VehicleResult>> {
    let vehicles = state.simulator.positions().await;
    Json(vehicles.iter().map(VehicleResult::from).collect())
}

/// Format a unix timestamp as a local wall-clock time.
fn format_epoch(epoch_secs: i64) -> String {
    DateTime::from_timestamp(epoch_secs, 0)
        .map(|dt| dt.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_default()
}
