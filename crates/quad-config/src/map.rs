//! Map controller configuration.

use std::time::Duration;

use quad_core::{Coordinates, ViewportState};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_center_lat() -> f64 {
    12.9716
}

const fn default_center_lon() -> f64 {
    77.5946
}

const fn default_zoom() -> f64 {
    14.0
}

const fn default_select_min_zoom() -> f64 {
    16.0
}

const fn default_navigate_delay_ms() -> u64 {
    400
}

const fn default_pulse_ms() -> u64 {
    300
}

const fn default_geolocation_timeout_secs() -> u64 {
    5
}

const fn default_drawer_settle_ms() -> u64 {
    350
}

const fn default_min_zoom() -> f64 {
    0.0
}

const fn default_max_zoom() -> f64 {
    22.0
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MapConfig {
    /// Fallback center when neither a saved viewport nor a device fix exists.
    #[serde(default = "default_center_lat")]
    pub default_center_lat: f64,

    #[serde(default = "default_center_lon")]
    pub default_center_lon: f64,

    /// Zoom used for the fallback center, locate-me and background clicks.
    #[serde(default = "default_zoom")]
    pub default_zoom: f64,

    /// Clicking a marker never leaves the camera below this zoom.
    #[serde(default = "default_select_min_zoom")]
    pub select_min_zoom: f64,

    /// Delay between a marker click and navigation to its detail view.
    #[serde(default = "default_navigate_delay_ms")]
    pub navigate_delay_ms: u64,

    #[serde(default = "default_pulse_ms")]
    pub pulse_ms: u64,

    #[serde(default = "default_geolocation_timeout_secs")]
    pub geolocation_timeout_secs: u64,

    /// Wait after the add-location drawer closes before re-reconciling.
    #[serde(default = "default_drawer_settle_ms")]
    pub drawer_settle_ms: u64,

    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,

    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_center_lat: default_center_lat(),
            default_center_lon: default_center_lon(),
            default_zoom: default_zoom(),
            select_min_zoom: default_select_min_zoom(),
            navigate_delay_ms: default_navigate_delay_ms(),
            pulse_ms: default_pulse_ms(),
            geolocation_timeout_secs: default_geolocation_timeout_secs(),
            drawer_settle_ms: default_drawer_settle_ms(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
        }
    }
}

impl MapConfig {
    /// Viewport used when nothing better is known.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the configured center is not a
    /// valid coordinate.
    pub fn default_viewport(&self) -> Result<ViewportState, ConfigError> {
        let center = Coordinates::new(self.default_center_lat, self.default_center_lon)
            .map_err(|e| ConfigError::InvalidValue {
                field: "map.default_center".into(),
                reason: e.to_string(),
            })?;
        Ok(ViewportState::new(center, self.default_zoom))
    }

    #[must_use]
    pub const fn navigate_delay(&self) -> Duration {
        Duration::from_millis(self.navigate_delay_ms)
    }

    #[must_use]
    pub const fn pulse_duration(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }

    #[must_use]
    pub const fn geolocation_timeout(&self) -> Duration {
        Duration::from_secs(self.geolocation_timeout_secs)
    }

    #[must_use]
    pub const fn drawer_settle(&self) -> Duration {
        Duration::from_millis(self.drawer_settle_ms)
    }
}
