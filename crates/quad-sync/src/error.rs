//! Sync error types.

use thiserror::Error;

/// Errors that can occur while fetching or applying a location batch.
///
/// `Clone` because one coalesced fetch hands the same result to every
/// waiting caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The request never produced a response (DNS, connect, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status code.
    #[error("server error ({status}): {message}")]
    Status {
        /// HTTP status code returned by the maps service.
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// The server returned 429 Too Many Requests.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// The response body was not a valid location batch.
    #[error("malformed payload: {0}")]
    Payload(String),

    /// No maps service origin is configured.
    #[error("sync is not configured: set sync.base_url")]
    NotConfigured,
}

impl SyncError {
    /// Whether the failure came from transport or the server rather than
    /// from the payload contents.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Status { .. } | Self::RateLimited { .. }
        )
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Payload(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}
