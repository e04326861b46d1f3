//! HTTP response checks and the reqwest-backed [`LocationSource`].

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use quad_config::SyncConfig;

use crate::error::SyncError;
use crate::payload::{self, Batch};
use crate::source::LocationSource;

/// Check an HTTP response for common error conditions.
///
/// Returns the response unchanged on success. Handles:
/// - **429 Too Many Requests** → [`SyncError::RateLimited`] with
///   `Retry-After` header parsing (falls back to 60 s if absent or
///   unparseable).
/// - **Non-success status** → [`SyncError::Status`] with status code and
///   response body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, SyncError> {
    if resp.status() == 429 {
        let retry_after = parse_retry_after(&resp);
        return Err(SyncError::RateLimited {
            retry_after_secs: retry_after,
        });
    }
    if !resp.status().is_success() {
        return Err(SyncError::Status {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}

/// Fetches batches from `GET {base_url}/api/maps/locations/incremental`.
pub struct HttpSource {
    http: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl HttpSource {
    /// Build a client from the `[sync]` config section.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotConfigured`] without a `base_url`, or
    /// [`SyncError::Network`] if the HTTP client cannot be built.
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        if !config.is_configured() {
            return Err(SyncError::NotConfigured);
        }
        Self::with_timeout(
            config.endpoint_url(),
            (!config.auth_token.is_empty()).then(|| config.auth_token.clone()),
            config.request_timeout(),
        )
    }

    /// Build a client for an explicit endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Network`] if the HTTP client cannot be built.
    pub fn with_timeout(
        endpoint: String,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("quad/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            endpoint,
            auth_token,
        })
    }

    /// Request URL for a given watermark. `None` asks for everything.
    #[must_use]
    pub fn url(&self, since: Option<DateTime<Utc>>) -> String {
        match since {
            Some(since) => format!(
                "{}?since={}",
                self.endpoint,
                urlencoding::encode(&since.to_rfc3339_opts(SecondsFormat::Millis, true))
            ),
            None => self.endpoint.clone(),
        }
    }
}

impl LocationSource for HttpSource {
    async fn fetch(&self, since: Option<DateTime<Utc>>) -> Result<Batch, SyncError> {
        let url = self.url(since);
        tracing::debug!(%url, "fetching locations");

        let mut request = self.http.get(&url);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        let resp = check_response(request.send().await?).await?;
        let body = resp.bytes().await?;
        payload::decode(&body)
    }
}
