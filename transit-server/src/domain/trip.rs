//! Scheduled trip and its stop-times.

use super::time::{InvalidServiceTime, ServiceTime};

/// One scheduled run of a vehicle along a route.
///
/// Stop-times are appended in schedule-file order, which for valid GTFS
/// data is non-decreasing scheduled-time order. The simulator relies on
/// that ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub id: String,
    pub route_id: String,
    /// Id of the polyline describing the trip's physical path, if any.
    pub shape_id: Option<String>,
    stop_times: Vec<StopTime>,
}

impl Trip {
    pub fn new(
        id: impl Into<String>,
        route_id: impl Into<String>,
        shape_id: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            route_id: route_id.into(),
            shape_id,
            stop_times: Vec::new(),
        }
    }

    pub(crate) fn add_stop_time(&mut self, stop_time: StopTime) {
        self.stop_times.push(stop_time);
    }

    pub fn stop_times(&self) -> &[StopTime] {
        &self.stop_times
    }
}

/// A scheduled arrival of a trip at a stop.
///
/// The arrival time is kept verbatim as read from the schedule; it is
/// zero-padded `HH:MM:SS` and may use hours past 24 for service running
/// beyond midnight. It is only converted to seconds when consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct StopTime {
    pub trip_id: String,
    pub stop_id: String,
    pub arrival_time: String,
}

impl StopTime {
    pub fn new(
        trip_id: impl Into<String>,
        stop_id: impl Into<String>,
        arrival_time: impl Into<String>,
    ) -> Self {
        Self {
            trip_id: trip_id.into(),
            stop_id: stop_id.into(),
            arrival_time: arrival_time.into(),
        }
    }

    /// Parse the verbatim arrival time.
    pub fn service_time(&self) -> Result<ServiceTime, InvalidServiceTime> {
        ServiceTime::parse(&self.arrival_time)
    }
}
