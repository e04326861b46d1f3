//! Wire format of the incremental locations endpoint.
//!
//! The maps service is not consistent about field names, so decoding accepts
//! every spelling it has been seen to send:
//!
//! | Field | Accepted keys |
//! |---|---|
//! | update list | `updated`, `locations` (full fetch) |
//! | location id | `locationId`, `id` |
//! | category | `locationType`, `location_type` |
//! | deletion id | `locationId`, `location_id` |
//!
//! A batch without `lastFetchTime` cannot be ordered against the cache and is
//! rejected as a whole.

use chrono::{DateTime, Utc};
use quad_core::{Category, Coordinates, DeletionRecord, Location};
use serde::Deserialize;

use crate::error::SyncError;

/// One decoded server response.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub updated: Vec<Location>,
    pub deleted: Vec<DeletionRecord>,
    pub watermark: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBatch {
    #[serde(default, alias = "locations")]
    updated: Vec<WireLocation>,
    #[serde(default)]
    deleted: Vec<WireDeletion>,
    last_fetch_time: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLocation {
    #[serde(alias = "id")]
    location_id: String,
    #[serde(default)]
    name: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default, alias = "location_type")]
    location_type: Option<String>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct WireDeletion {
    #[serde(rename = "locationId", alias = "location_id")]
    location_id: String,
    #[serde(rename = "deletedAt", default)]
    deleted_at: Option<DateTime<Utc>>,
}

/// Decode a response body into a [`Batch`].
///
/// Locations without both coordinates are skipped with a warning; they
/// could never get a marker and have no representable position.
///
/// # Errors
///
/// Returns [`SyncError::Payload`] if the body is not a batch object or lacks
/// `lastFetchTime`.
pub fn decode(body: &[u8]) -> Result<Batch, SyncError> {
    let wire: WireBatch =
        serde_json::from_slice(body).map_err(|e| SyncError::Payload(e.to_string()))?;
    let watermark = wire
        .last_fetch_time
        .ok_or_else(|| SyncError::Payload("missing lastFetchTime".to_string()))?;

    let updated = wire
        .updated
        .into_iter()
        .filter_map(|raw| raw.into_location(watermark))
        .collect();
    let deleted = wire
        .deleted
        .into_iter()
        .map(|d| DeletionRecord {
            id: d.location_id,
            deleted_at: d.deleted_at,
        })
        .collect();

    Ok(Batch {
        updated,
        deleted,
        watermark,
    })
}

impl WireLocation {
    fn into_location(self, watermark: DateTime<Utc>) -> Option<Location> {
        let (Some(lat), Some(lon)) = (self.latitude, self.longitude) else {
            tracing::warn!(id = %self.location_id, "skipping location without coordinates");
            return None;
        };
        Some(Location {
            id: self.location_id,
            name: self.name,
            coordinates: Coordinates { lat, lon },
            category: self
                .location_type
                .as_deref()
                .map_or(Category::Default, Category::from_wire),
            updated_at: self.updated_at.unwrap_or(watermark),
        })
    }
}
