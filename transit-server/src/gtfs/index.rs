//! In-memory schedule index.

use std::collections::{HashMap, HashSet};

use tracing::info;

use crate::domain::{Route, ShapePoint, Stop, StopTime, Trip};

use super::loader::Schedule;

/// The physical path of a route, tagged by where it came from.
///
/// Routes without shape data fall back to a straight polyline through
/// their stop sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutePath {
    /// Points from the route's shape polyline, in sequence order.
    Shape(Vec<(f64, f64)>),
    /// Straight lines between the route's stops, in served order.
    StopPolyline(Vec<(f64, f64)>),
}

impl RoutePath {
    pub fn points(&self) -> &[(f64, f64)] {
        match self {
            RoutePath::Shape(points) | RoutePath::StopPolyline(points) => points,
        }
    }
}

/// Read-mostly owner of the canonical entity graph.
///
/// Built once from a loaded [`Schedule`]; the linking pass runs here, after
/// which the graph is immutable. All lookups by id are O(1); name search
/// and `routes_for_stop` are deliberate linear scans at this data scale.
pub struct ScheduleIndex {
    stops: HashMap<String, Stop>,
    routes: HashMap<String, Route>,
    trips: HashMap<String, Trip>,
    shapes: HashMap<String, Vec<ShapePoint>>,
}

impl ScheduleIndex {
    /// Run the linking pass over a loaded schedule and take ownership of
    /// the result.
    ///
    /// Links established: trip to route by route id; each route's served
    /// stop-id set as the union of its trips' stop-times (insertion
    /// ordered, duplicates dropped); each stop's serving-route ids.
    pub fn build(schedule: Schedule) -> Self {
        let Schedule {
            mut stops,
            mut routes,
            trips,
            shapes,
        } = schedule;

        for trip in &trips {
            if let Some(route) = routes.get_mut(&trip.route_id) {
                route.add_trip_id(&trip.id);
            }
        }

        let trips: HashMap<String, Trip> =
            trips.into_iter().map(|t| (t.id.clone(), t)).collect();

        for route in routes.values_mut() {
            for trip_id in route.trip_ids().to_vec() {
                let Some(trip) = trips.get(&trip_id) else {
                    continue;
                };
                for stop_time in trip.stop_times() {
                    route.add_stop_id(&stop_time.stop_id);
                }
            }
        }

        for route in routes.values() {
            for stop_id in route.stop_ids() {
                if let Some(stop) = stops.get_mut(stop_id) {
                    stop.add_route_id(&route.id);
                }
            }
        }

        info!(
            stops = stops.len(),
            routes = routes.len(),
            trips = trips.len(),
            shapes = shapes.len(),
            "schedule indexed"
        );

        Self {
            stops,
            routes,
            trips,
            shapes,
        }
    }

    pub fn stop(&self, id: &str) -> Option<&Stop> {
        self.stops.get(id)
    }

    pub fn route(&self, id: &str) -> Option<&Route> {
        self.routes.get(id)
    }

    pub fn trip(&self, id: &str) -> Option<&Trip> {
        self.trips.get(id)
    }

    pub fn trips(&self) -> impl Iterator<Item = &Trip> {
        self.trips.values()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Stops whose name contains `query` (case-insensitive), or whose id
    /// matches it exactly ignoring case.
    pub fn search_stops(&self, query: &str) -> Vec<&Stop> {
        let q = query.to_lowercase();
        self.stops
            .values()
            .filter(|s| s.name.to_lowercase().contains(&q) || s.id.eq_ignore_ascii_case(query))
            .collect()
    }

    /// Routes whose name contains `query` (case-insensitive), or whose id
    /// matches it exactly ignoring case.
    pub fn search_routes(&self, query: &str) -> Vec<&Route> {
        let q = query.to_lowercase();
        self.routes
            .values()
            .filter(|r| r.name.to_lowercase().contains(&q) || r.id.eq_ignore_ascii_case(query))
            .collect()
    }

    /// The first `limit` scheduled arrivals at a stop, earliest first.
    ///
    /// Scans every trip's stop-times and sorts on the verbatim time
    /// strings; zero-padded `HH:MM:SS` makes lexicographic order correct.
    pub fn next_arrivals(&self, stop_id: &str, limit: usize) -> Vec<&StopTime> {
        let mut arrivals: Vec<&StopTime> = self
            .trips
            .values()
            .flat_map(|trip| trip.stop_times())
            .filter(|st| st.stop_id == stop_id)
            .collect();

        arrivals.sort_by(|a, b| a.arrival_time.cmp(&b.arrival_time));
        arrivals.truncate(limit);
        arrivals
    }

    /// One display line for a scheduled arrival: route name and time.
    pub fn arrival_info(&self, stop_time: &StopTime) -> String {
        let route_name = self
            .trip(&stop_time.trip_id)
            .and_then(|trip| self.route(&trip.route_id))
            .map(|route| route.name.as_str())
            .unwrap_or("N/A");
        format!("{} - {}", route_name, stop_time.arrival_time)
    }

    /// The stops served by a route, in the route's stop-id set order.
    ///
    /// Ids without a matching stop record are skipped.
    pub fn stops_for_route(&self, route_id: &str) -> Vec<&Stop> {
        let Some(route) = self.routes.get(route_id) else {
            return Vec::new();
        };
        route
            .stop_ids()
            .iter()
            .filter_map(|id| self.stops.get(id))
            .collect()
    }

    /// The routes whose trips call at a stop, sorted by display name.
    ///
    /// Scans all trips rather than keeping a derived stop-to-route index;
    /// a one-time scan is cheaper than the memory at this data scale.
    pub fn routes_for_stop(&self, stop_id: &str) -> Vec<&Route> {
        let mut route_ids = HashSet::new();
        for trip in self.trips.values() {
            if trip.stop_times().iter().any(|st| st.stop_id == stop_id) {
                route_ids.insert(trip.route_id.as_str());
            }
        }

        let mut routes: Vec<&Route> = route_ids
            .into_iter()
            .filter_map(|id| self.routes.get(id))
            .collect();
        routes.sort_by(|a, b| a.name.cmp(&b.name));
        routes
    }

    /// Shape points for a shape id, in sequence order.
    pub fn shape(&self, shape_id: &str) -> Option<&[ShapePoint]> {
        self.shapes.get(shape_id).map(Vec::as_slice)
    }

    /// The physical path of a route.
    ///
    /// Uses the shape of the first trip carrying a shape id; when no trip
    /// has one (or the shape has no points), falls back to a straight
    /// polyline through the route's stops. `None` only for unknown routes.
    pub fn route_path(&self, route_id: &str) -> Option<RoutePath> {
        let route = self.routes.get(route_id)?;

        let shape_points = route
            .trip_ids()
            .iter()
            .filter_map(|id| self.trips.get(id))
            .find_map(|trip| trip.shape_id.as_deref())
            .and_then(|shape_id| self.shapes.get(shape_id));

        if let Some(points) = shape_points
            && !points.is_empty()
        {
            return Some(RoutePath::Shape(
                points.iter().map(|p| (p.lat, p.lon)).collect(),
            ));
        }

        Some(RoutePath::StopPolyline(
            self.stops_for_route(route_id)
                .iter()
                .map(|s| (s.lat, s.lon))
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::StopTime;

    use super::*;

    fn sample_schedule() -> Schedule {
        let mut schedule = Schedule::default();

        for (id, name, lat, lon) in [
            ("S1", "Termini", 41.901, 12.501),
            ("S2", "Colosseo", 41.890, 12.492),
            ("S3", "Piazza Venezia", 41.896, 12.482),
        ] {
            schedule
                .stops
                .insert(id.to_string(), Stop::new(id, name, lat, lon));
        }

        schedule
            .routes
            .insert("64".into(), Route::new("64", "64 Termini-S.Pietro", "3"));
        schedule
            .routes
            .insert("40".into(), Route::new("40", "40 Express", "3"));

        let mut t1 = Trip::new("T1", "64", Some("SH1".into()));
        t1.add_stop_time(StopTime::new("T1", "S1", "08:00:00"));
        t1.add_stop_time(StopTime::new("T1", "S2", "08:05:00"));

        let mut t2 = Trip::new("T2", "64", None);
        t2.add_stop_time(StopTime::new("T2", "S2", "09:00:00"));
        t2.add_stop_time(StopTime::new("T2", "S3", "09:04:00"));

        let mut t3 = Trip::new("T3", "40", None);
        t3.add_stop_time(StopTime::new("T3", "S1", "07:30:00"));
        t3.add_stop_time(StopTime::new("T3", "S3", "07:45:00"));

        schedule.trips = vec![t1, t2, t3];

        schedule.shapes.insert(
            "SH1".into(),
            vec![
                ShapePoint::new("SH1", 41.901, 12.501, 1),
                ShapePoint::new("SH1", 41.890, 12.492, 2),
            ],
        );

        schedule
    }

    #[test]
    fn linking_attaches_trips_and_derives_stop_sets() {
        let index = ScheduleIndex::build(sample_schedule());

        let route = index.route("64").unwrap();
        assert_eq!(route.trip_ids(), ["T1", "T2"]);
        // Union across T1 and T2 stop-times, first occurrence order, no
        // duplicate for the shared stop S2.
        assert_eq!(route.stop_ids(), ["S1", "S2", "S3"]);

        let stop = index.stop("S1").unwrap();
        let mut serving = stop.route_ids().to_vec();
        serving.sort();
        assert_eq!(serving, ["40", "64"]);
    }

    #[test]
    fn lookup_miss_returns_none() {
        let index = ScheduleIndex::build(sample_schedule());

        assert!(index.stop("missing").is_none());
        assert!(index.route("missing").is_none());
        assert!(index.trip("missing").is_none());
        assert!(index.route_path("missing").is_none());
        assert!(index.stops_for_route("missing").is_empty());
        assert!(index.routes_for_stop("missing").is_empty());
    }

    #[test]
    fn search_matches_name_substring_and_exact_id() {
        let index = ScheduleIndex::build(sample_schedule());

        let by_name = index.search_stops("venez");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, "S3");

        let by_id = index.search_stops("s1");
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].id, "S1");

        assert_eq!(index.search_routes("express").len(), 1);
        assert!(index.search_stops("nowhere").is_empty());
    }

    #[test]
    fn next_arrivals_sorted_by_time_string_and_limited() {
        let index = ScheduleIndex::build(sample_schedule());

        let arrivals = index.next_arrivals("S1", 10);
        let times: Vec<&str> = arrivals.iter().map(|st| st.arrival_time.as_str()).collect();
        assert_eq!(times, ["07:30:00", "08:00:00"]);

        assert_eq!(index.next_arrivals("S1", 1).len(), 1);
        assert!(index.next_arrivals("missing", 5).is_empty());
    }

    #[test]
    fn arrival_info_resolves_route_name() {
        let index = ScheduleIndex::build(sample_schedule());

        let arrivals = index.next_arrivals("S2", 1);
        assert_eq!(index.arrival_info(arrivals[0]), "64 Termini-S.Pietro - 08:05:00");

        let orphan = StopTime::new("GHOST", "S1", "10:00:00");
        assert_eq!(index.arrival_info(&orphan), "N/A - 10:00:00");
    }

    #[test]
    fn stops_for_route_matches_stop_time_union_without_duplicates() {
        let index = ScheduleIndex::build(sample_schedule());

        let stops = index.stops_for_route("64");
        let ids: Vec<&str> = stops.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["S1", "S2", "S3"]);
    }

    #[test]
    fn routes_for_stop_scans_trips_and_sorts_by_name() {
        let index = ScheduleIndex::build(sample_schedule());

        let routes = index.routes_for_stop("S1");
        let names: Vec<&str> = routes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["40 Express", "64 Termini-S.Pietro"]);

        let only_64 = index.routes_for_stop("S2");
        assert_eq!(only_64.len(), 1);
        assert_eq!(only_64[0].id, "64");
    }

    #[test]
    fn route_path_prefers_shape_and_falls_back_to_stops() {
        let index = ScheduleIndex::build(sample_schedule());

        match index.route_path("64").unwrap() {
            RoutePath::Shape(points) => assert_eq!(points.len(), 2),
            other => panic!("expected shape path, got {other:?}"),
        }

        match index.route_path("40").unwrap() {
            RoutePath::StopPolyline(points) => {
                assert_eq!(points, [(41.901, 12.501), (41.896, 12.482)]);
            }
            other => panic!("expected stop polyline, got {other:?}"),
        }
    }
}
