//! Runtime configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::realtime::{DEFAULT_TRIP_UPDATES_URL, DEFAULT_VEHICLE_POSITIONS_URL};

/// Application configuration.
///
/// Defaults target the Rome open-data feeds; every value can be overridden
/// from the environment. Bad overrides warn and keep the default so a
/// misconfigured deployment still starts.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the static schedule files.
    pub data_dir: PathBuf,
    pub vehicle_positions_url: String,
    pub trip_updates_url: String,
    /// Reachability target, probed over plain TCP.
    pub probe_host: String,
    pub probe_port: u16,
    pub check_period: Duration,
    pub poll_period: Duration,
    pub listen_addr: SocketAddr,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/gtfs"),
            vehicle_positions_url: DEFAULT_VEHICLE_POSITIONS_URL.to_string(),
            trip_updates_url: DEFAULT_TRIP_UPDATES_URL.to_string(),
            probe_host: "romamobilita.it".to_string(),
            probe_port: 80,
            check_period: Duration::from_secs(15),
            poll_period: Duration::from_secs(30),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

impl AppConfig {
    /// Build a config from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("TRANSIT_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(url) = std::env::var("TRANSIT_VEHICLE_POSITIONS_URL") {
            config.vehicle_positions_url = url;
        }
        if let Ok(url) = std::env::var("TRANSIT_TRIP_UPDATES_URL") {
            config.trip_updates_url = url;
        }
        if let Ok(target) = std::env::var("TRANSIT_PROBE_TARGET") {
            match parse_probe_target(&target) {
                Some((host, port)) => {
                    config.probe_host = host;
                    config.probe_port = port;
                }
                None => warn!(probe_target = %target, "ignoring malformed TRANSIT_PROBE_TARGET"),
            }
        }
        if let Ok(addr) = std::env::var("TRANSIT_LISTEN_ADDR") {
            match addr.parse() {
                Ok(addr) => config.listen_addr = addr,
                Err(_) => warn!(listen_addr = %addr, "ignoring malformed TRANSIT_LISTEN_ADDR"),
            }
        }

        config
    }
}

/// Parse a `host:port` pair.
fn parse_probe_target(target: &str) -> Option<(String, u16)> {
    let (host, port) = target.rsplit_once(':')?;
    if host.is_empty() {
        return None;
    }
    Some((host.to_string(), port.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_public_feeds() {
        let config = AppConfig::default();

        assert!(config.vehicle_positions_url.ends_with(".pb"));
        assert_eq!(config.probe_port, 80);
        assert_eq!(config.check_period, Duration::from_secs(15));
        assert_eq!(config.poll_period, Duration::from_secs(30));
    }

    #[test]
    fn probe_target_parsing() {
        assert_eq!(
            parse_probe_target("example.org:443"),
            Some(("example.org".to_string(), 443))
        );
        assert_eq!(parse_probe_target("no-port"), None);
        assert_eq!(parse_probe_target(":80"), None);
        assert_eq!(parse_probe_target("host:not-a-port"), None);
    }
}
