//! HTTP client for GTFS-RT feed resources.

use std::time::Duration;

use gtfs_realtime::FeedMessage;
use prost::Message;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use super::error::FeedError;

/// Identifying header sent with every feed request.
const CLIENT_USER_AGENT: &str = concat!("transit-server/", env!("CARGO_PKG_VERSION"));

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for fetching and decoding binary GTFS-RT feed messages.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
}

impl FeedClient {
    /// Create a client with the default request timeout.
    pub fn new() -> Result<Self, FeedError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FeedError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { http })
    }

    /// Fetch one feed resource and decode it.
    ///
    /// Any non-success status aborts the fetch before the body is read.
    pub async fn fetch_feed(&self, url: &str) -> Result<FeedMessage, FeedError> {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(FeedMessage::decode(bytes.as_ref())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        assert!(FeedClient::new().is_ok());
        assert!(FeedClient::with_timeout(Duration::from_secs(5)).is_ok());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_http_error() {
        let client = FeedClient::with_timeout(Duration::from_millis(500)).unwrap();

        let result = client.fetch_feed("http://127.0.0.1:9/feed.pb").await;

        assert!(matches!(result, Err(FeedError::Http(_))));
    }
}
