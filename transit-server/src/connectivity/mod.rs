//! Network reachability monitoring.
//!
//! A two-state (online/offline) machine driven by an active probe. The
//! state starts offline so nothing trusts the network before the first
//! real check completes. Listeners are told about state transitions, and
//! once about the very first completed check regardless of its outcome.

mod monitor;
mod probe;
#[cfg(test)]
pub(crate) mod testing;

pub use monitor::{ConnectivityMonitor, MonitorConfig};
pub use probe::{Probe, ProbeFuture, TcpProbe};
