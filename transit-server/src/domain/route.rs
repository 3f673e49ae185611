//! Transit route (line).

/// A route, with its trips and the derived set of stops it serves.
///
/// `stop_ids` is a cache of the union of stop ids across the route's
/// trips' stop-times. It is rebuilt by the linking pass after a schedule
/// load and is never mutated independently.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub id: String,
    pub name: String,
    /// GTFS route type code, stored verbatim (`3` is bus, `0` tram, ...).
    pub route_type: String,
    trip_ids: Vec<String>,
    stop_ids: Vec<String>,
}

impl Route {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        route_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            route_type: route_type.into(),
            trip_ids: Vec::new(),
            stop_ids: Vec::new(),
        }
    }

    pub(crate) fn add_trip_id(&mut self, trip_id: &str) {
        self.trip_ids.push(trip_id.to_string());
    }

    /// Record a served stop. Duplicates are ignored, insertion order kept.
    pub(crate) fn add_stop_id(&mut self, stop_id: &str) {
        if !self.stop_ids.iter().any(|s| s == stop_id) {
            self.stop_ids.push(stop_id.to_string());
        }
    }

    /// Ids of this route's trips, in schedule-file order.
    pub fn trip_ids(&self) -> &[String] {
        &self.trip_ids
    }

    /// Ids of every stop served by at least one of this route's trips.
    pub fn stop_ids(&self) -> &[String] {
        &self.stop_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_stop_id_keeps_first_occurrence_order() {
        let mut route = Route::new("64", "64 Termini-S.Pietro", "3");
        route.add_stop_id("S2");
        route.add_stop_id("S1");
        route.add_stop_id("S2");

        assert_eq!(route.stop_ids(), ["S2", "S1"]);
    }
}
