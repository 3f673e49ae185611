//! Live-or-scheduled arrival aggregation.
//!
//! The engine's most important contract: a stop's arrivals come from the
//! realtime poller only while the connectivity monitor reports online and
//! the poller actually holds predictions for that stop. In every other
//! case the static timetable answers. The decision is re-evaluated on
//! every call; connectivity can change between calls, and a cached
//! decision would happily serve stale live data offline.

use std::sync::Arc;

use crate::connectivity::ConnectivityMonitor;
use crate::domain::DelayStatus;
use crate::gtfs::ScheduleIndex;
use crate::realtime::RealtimePoller;

/// Default number of arrivals returned for a stop.
pub const DEFAULT_ARRIVAL_LIMIT: usize = 15;

/// A live prediction annotated for display.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveArrival {
    pub route_id: String,
    pub route_name: String,
    /// Predicted arrival as a unix timestamp in seconds.
    pub arrival_time: i64,
    pub delay: DelayStatus,
}

/// A scheduled arrival from the static timetable.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledArrival {
    pub trip_id: String,
    pub route_id: String,
    pub route_name: String,
    /// Verbatim `HH:MM:SS` schedule time.
    pub arrival_time: String,
}

/// Arrivals for a stop, tagged by the source that produced them.
#[derive(Debug, Clone, PartialEq)]
pub enum StopArrivals {
    Live(Vec<LiveArrival>),
    Scheduled(Vec<ScheduledArrival>),
}

/// Answers "when does something arrive at this stop" from the best
/// currently-available source.
pub struct ArrivalBoard {
    index: Arc<ScheduleIndex>,
    monitor: Arc<ConnectivityMonitor>,
    poller: Arc<RealtimePoller>,
}

impl ArrivalBoard {
    pub fn new(
        index: Arc<ScheduleIndex>,
        monitor: Arc<ConnectivityMonitor>,
        poller: Arc<RealtimePoller>,
    ) -> Self {
        Self {
            index,
            monitor,
            poller,
        }
    }

    /// Up to `limit` arrivals for a stop, live when possible.
    pub async fn arrivals_for(&self, stop_id: &str, limit: usize) -> StopArrivals {
        if self.monitor.is_online() {
            let live = self.poller.arrivals_for_stop(stop_id).await;
            if !live.is_empty() {
                let arrivals = live
                    .into_iter()
                    .take(limit)
                    .map(|prediction| {
                        let route_name = self.route_name(&prediction.route_id);
                        LiveArrival {
                            route_name,
                            delay: prediction.delay_status(),
                            route_id: prediction.route_id,
                            arrival_time: prediction.arrival_time,
                        }
                    })
                    .collect();
                return StopArrivals::Live(arrivals);
            }
        }

        let scheduled = self
            .index
            .next_arrivals(stop_id, limit)
            .into_iter()
            .map(|stop_time| {
                let route_id = self
                    .index
                    .trip(&stop_time.trip_id)
                    .map(|trip| trip.route_id.clone())
                    .unwrap_or_default();
                ScheduledArrival {
                    route_name: self.route_name(&route_id),
                    trip_id: stop_time.trip_id.clone(),
                    route_id,
                    arrival_time: stop_time.arrival_time.clone(),
                }
            })
            .collect();
        StopArrivals::Scheduled(scheduled)
    }

    /// Display name for a route id, falling back to the id itself.
    fn route_name(&self, route_id: &str) -> String {
        self.index
            .route(route_id)
            .map(|route| route.name.clone())
            .unwrap_or_else(|| route_id.to_string())
    }
}
