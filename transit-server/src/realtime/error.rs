//! Realtime feed error types.

/// Errors from fetching or decoding a GTFS-RT resource.
///
/// These never cross the poller boundary: a failed resource is logged and
/// its previous cycle's data kept, so consumers only ever observe absence
/// or staleness.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Feed endpoint answered with a non-success status
    #[error("feed returned HTTP {status}")]
    Status { status: u16 },

    /// Payload was not a valid feed message
    #[error("feed decode error: {0}")]
    Decode(#[from] prost::DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FeedError::Status { status: 503 };
        assert_eq!(err.to_string(), "feed returned HTTP 503");
    }
}
