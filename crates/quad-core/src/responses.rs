//! CLI response types returned as JSON by `quad` commands.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Category, SyncOutcome};
use crate::location::{Coordinates, Location};
use crate::viewport::ViewportState;

/// Response from `quad status`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct StatusResponse {
    pub locations: usize,
    pub renderable: usize,
    pub watermark: Option<DateTime<Utc>>,
    pub degraded: bool,
    pub viewport: Option<ViewportState>,
    pub pending_placement: Option<Coordinates>,
}

/// Response from `quad sync`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SyncResponse {
    pub outcome: SyncOutcome,
    pub full_snapshot: bool,
    pub updated: usize,
    pub deleted: usize,
    pub watermark: DateTime<Utc>,
    pub total_locations: usize,
}

/// One flattened row of `quad locations`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LocationRow {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub lat: f64,
    pub lon: f64,
    pub updated_at: DateTime<Utc>,
}

impl From<&Location> for LocationRow {
    fn from(location: &Location) -> Self {
        Self {
            id: location.id.clone(),
            name: location.name.clone(),
            category: location.category,
            lat: location.coordinates.lat,
            lon: location.coordinates.lon,
            updated_at: location.updated_at,
        }
    }
}
