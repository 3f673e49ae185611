//! Transit schedule and realtime reconciliation engine.
//!
//! Loads a static GTFS schedule into an in-memory index, polls the agency's
//! GTFS-RT feeds for live vehicle positions and arrival predictions while
//! the network is reachable, and falls back to a schedule-driven position
//! simulation when it is not. The web layer exposes the query surface a map
//! or departure-board UI consumes.

pub mod arrivals;
pub mod config;
pub mod connectivity;
pub mod domain;
pub mod gtfs;
pub mod realtime;
pub mod simulator;
pub mod web;
