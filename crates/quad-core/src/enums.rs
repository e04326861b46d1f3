//! Location categories and sync status.
//!
//! All enums serialize in `kebab-case`, matching the category names used by
//! the campus portal.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Point-of-interest category. Drives marker colour and icon.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Food,
    LectureHall,
    Hostel,
    Admin,
    Recreation,
    #[default]
    Default,
}

impl Category {
    pub const ALL: [Self; 6] = [
        Self::Food,
        Self::LectureHall,
        Self::Hostel,
        Self::Admin,
        Self::Recreation,
        Self::Default,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::LectureHall => "lecture-hall",
            Self::Hostel => "hostel",
            Self::Admin => "admin",
            Self::Recreation => "recreation",
            Self::Default => "default",
        }
    }

    /// Parse a server-provided category string.
    ///
    /// Case and surrounding whitespace are ignored, and `-`/`_` separators are
    /// optional (`lecturehall`, `lecture-hall` and `Lecture_Hall` are the same
    /// category). Anything unrecognised maps to [`Category::Default`].
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "food" => Self::Food,
            "lecturehall" => Self::LectureHall,
            "hostel" => Self::Hostel,
            "admin" => Self::Admin,
            "recreation" => Self::Recreation,
            _ => Self::Default,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SyncStatus
// ---------------------------------------------------------------------------

/// Freshness of the local cache as shown by the "syncing" indicator.
///
/// ```text
/// idle → syncing → idle
///                → stale → syncing
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Stale,
}

impl SyncStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Syncing => "syncing",
            Self::Stale => "stale",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SyncOutcome
// ---------------------------------------------------------------------------

/// What happened to a fetched batch when it reached the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SyncOutcome {
    /// Merged and committed; the watermark moved to the batch watermark.
    Applied,
    /// Discarded because a newer watermark was already committed.
    Superseded,
}

impl SyncOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Superseded => "superseded",
        }
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
