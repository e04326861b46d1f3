//! Versioned envelope for persisted values.
//!
//! Every value is stored as
//!
//! ```json
//! { "v": 1, "saved_at": "2025-03-01T09:30:00Z", "data": { ... } }
//! ```
//!
//! `v` defaults to 1 when absent. Older versions are migrated forward one step
//! at a time through [`MIGRATIONS`]; newer versions are refused with
//! [`StorageError::UnsupportedVersion`] so this build never decodes (and later
//! overwrites) a format it does not understand.

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::StorageError;

/// Current schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// Storage key for the location set and watermark.
pub const LOCATIONS_KEY: &str = "locations";
/// Storage key for the last camera position.
pub const VIEWPORT_KEY: &str = "viewport";
/// Storage key for the pending "place a new location here" coordinate.
pub const PENDING_PLACEMENT_KEY: &str = "pending_placement";

/// A migration upgrades `data` written at version `from` to `from + 1`.
type Migration = fn(key: &str, data: Value) -> Result<Value, StorageError>;

/// Ordered by source version. Empty while only v1 exists.
const MIGRATIONS: &[(u32, Migration)] = &[];

const fn default_version() -> u32 {
    1
}

#[derive(Serialize)]
struct EnvelopeOut<'a, T> {
    v: u32,
    saved_at: DateTime<Utc>,
    data: &'a T,
}

#[derive(serde::Deserialize)]
struct EnvelopeIn {
    #[serde(default = "default_version")]
    v: u32,
    #[serde(default)]
    #[allow(dead_code)]
    saved_at: Option<DateTime<Utc>>,
    data: Value,
}

/// Encode a value at the current schema version.
///
/// # Errors
///
/// Returns [`StorageError::Serialize`] if `value` cannot be encoded.
pub fn encode<T: Serialize>(key: &str, value: &T) -> Result<Vec<u8>, StorageError> {
    let envelope = EnvelopeOut {
        v: SCHEMA_VERSION,
        saved_at: Utc::now(),
        data: value,
    };
    serde_json::to_vec(&envelope).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })
}

/// Decode a stored value, migrating older versions forward.
///
/// # Errors
///
/// - [`StorageError::Corrupt`] if the bytes are not an envelope
/// - [`StorageError::UnsupportedVersion`] if the envelope is newer than
///   [`SCHEMA_VERSION`]
/// - [`StorageError::Serialize`] if `data` does not match `T`
pub fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T, StorageError> {
    let envelope: EnvelopeIn =
        serde_json::from_slice(bytes).map_err(|e| StorageError::Corrupt {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

    if envelope.v > SCHEMA_VERSION {
        return Err(StorageError::UnsupportedVersion {
            key: key.to_string(),
            found: envelope.v,
            supported: SCHEMA_VERSION,
        });
    }

    let data = migrate(key, envelope.v, envelope.data)?;
    serde_json::from_value(data).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })
}

fn migrate(key: &str, mut version: u32, mut data: Value) -> Result<Value, StorageError> {
    while version < SCHEMA_VERSION {
        let step = MIGRATIONS
            .iter()
            .find(|(from, _)| *from == version)
            .map(|(_, step)| *step)
            .ok_or_else(|| StorageError::Corrupt {
                key: key.to_string(),
                reason: format!("no migration from v{version}"),
            })?;
        data = step(key, data)?;
        version += 1;
        tracing::debug!(key, version, "migrated persisted value");
    }
    Ok(data)
}
