//! Location sync configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Requests with the same `since` inside this window share one fetch.
const fn default_dedupe_interval_secs() -> u64 {
    30
}

/// Periodic background refresh.
const fn default_refresh_interval_secs() -> u64 {
    300
}

const fn default_request_timeout_secs() -> u64 {
    10
}

fn default_endpoint_path() -> String {
    "/api/maps/locations/incremental".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Maps service origin (e.g., `https://maps.campus.example`).
    #[serde(default)]
    pub base_url: String,

    /// Path of the incremental locations endpoint on `base_url`.
    #[serde(default = "default_endpoint_path")]
    pub endpoint_path: String,

    /// Optional bearer token sent with every fetch.
    #[serde(default)]
    pub auth_token: String,

    #[serde(default = "default_dedupe_interval_secs")]
    pub dedupe_interval_secs: u64,

    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            endpoint_path: default_endpoint_path(),
            auth_token: String::new(),
            dedupe_interval_secs: default_dedupe_interval_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl SyncConfig {
    /// A server origin is required before any fetch can be made.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
    }

    /// Full URL of the incremental endpoint, without query string.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint_path.trim_start_matches('/')
        )
    }

    #[must_use]
    pub const fn dedupe_interval(&self) -> Duration {
        Duration::from_secs(self.dedupe_interval_secs)
    }

    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
