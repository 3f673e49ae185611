//! Reachability probes.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::net::TcpStream;
use tracing::debug;

/// Default bound on one connection attempt.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Future returned by [`Probe::check`].
pub type ProbeFuture = Pin<Box<dyn Future<Output = bool> + Send>>;

/// An active reachability check. Resolves to `true` when the target is
/// reachable.
///
/// Object-safe so the monitor can be driven by scripted outcomes in tests.
pub trait Probe: Send + Sync + 'static {
    fn check(&self) -> ProbeFuture;
}

/// Probe that attempts a plain TCP connection to a fixed host and port,
/// bounded by a connect timeout.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Set a custom connect timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Probe for TcpProbe {
    fn check(&self) -> ProbeFuture {
        let host = self.host.clone();
        let port = self.port;
        let timeout = self.timeout;

        Box::pin(async move {
            let attempt = tokio::time::timeout(timeout, TcpStream::connect((host.as_str(), port)));
            match attempt.await {
                Ok(Ok(_stream)) => true,
                Ok(Err(e)) => {
                    debug!(host = %host, port, error = %e, "reachability probe failed");
                    false
                }
                Err(_) => {
                    debug!(host = %host, port, "reachability probe timed out");
                    false
                }
            }
        })
    }
}
