use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::location::Coordinates;

/// Map camera position. Persisted independently of location data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ViewportState {
    pub center: Coordinates,
    pub zoom: f64,
}

impl ViewportState {
    #[must_use]
    pub const fn new(center: Coordinates, zoom: f64) -> Self {
        Self { center, zoom }
    }

    /// Compare two viewports within `epsilon` on every component.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.center.approx_eq(&other.center, epsilon) && (self.zoom - other.zoom).abs() <= epsilon
    }
}
