//! Realtime feed polling.
//!
//! Two GTFS-RT resources are fetched on a fixed period while the poller is
//! running: vehicle positions and trip updates. Each cycle fully replaces
//! the corresponding live map on success and leaves it untouched on
//! failure, so consumers always read a complete cycle's data. The two
//! resources fail independently.

mod client;
mod error;
mod poller;

pub use client::FeedClient;
pub use error::FeedError;
pub use poller::{
    DEFAULT_TRIP_UPDATES_URL, DEFAULT_VEHICLE_POSITIONS_URL, PollerConfig, RealtimePoller,
};
