//! Application state for the web layer.

use std::sync::Arc;

use crate::arrivals::ArrivalBoard;
use crate::connectivity::ConnectivityMonitor;
use crate::gtfs::ScheduleIndex;
use crate::realtime::RealtimePoller;
use crate::simulator::SimulatedPositions;

/// Shared application state.
///
/// Every service is constructed once by the composition root and shared
/// by handle; handlers never construct services themselves.
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<ScheduleIndex>,
    pub monitor: Arc<ConnectivityMonitor>,
    pub poller: Arc<RealtimePoller>,
    pub simulator: Arc<SimulatedPositions>,
    pub board: Arc<ArrivalBoard>,
}

impl AppState {
    pub fn new(
        index: Arc<ScheduleIndex>,
        monitor: Arc<ConnectivityMonitor>,
        poller: Arc<RealtimePoller>,
        simulator: Arc<SimulatedPositions>,
        board: Arc<ArrivalBoard>,
    ) -> Self {
        Self {
            index,
            monitor,
            poller,
            simulator,
            board,
        }
    }
}
