use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Category;
use crate::errors::CoreError;

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Build a validated coordinate pair.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinates`] if either component is not
    /// finite or lies outside `[-90, 90]` / `[-180, 180]`.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoreError> {
        let candidate = Self { lat, lon };
        if candidate.is_valid() {
            Ok(candidate)
        } else {
            Err(CoreError::InvalidCoordinates { lat, lon })
        }
    }

    /// Whether this point can be placed on a map.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Component-wise comparison within `epsilon` degrees.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.lat - other.lat).abs() <= epsilon && (self.lon - other.lon).abs() <= epsilon
    }
}

/// A campus point of interest. Identity is `id`; every other field may change
/// between syncs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub coordinates: Coordinates,
    pub category: Category,
    pub updated_at: DateTime<Utc>,
}

impl Location {
    /// Renderable locations get exactly one map marker.
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        self.coordinates.is_valid()
    }
}

/// A server-side deletion of a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DeletionRecord {
    pub id: String,
    pub deleted_at: Option<DateTime<Utc>>,
}
