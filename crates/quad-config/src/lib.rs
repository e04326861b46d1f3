//! # quad-config
//!
//! Layered configuration loading for Quad using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`QUAD_*` prefix, `__` as separator)
//! 2. Project-level `.quad/config.toml`
//! 3. User-level `~/.config/quad/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `QUAD_SYNC__BASE_URL` -> `sync.base_url`,
//! `QUAD_MAP__DEFAULT_ZOOM` -> `map.default_zoom`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use quad_config::QuadConfig;
//!
//! let config = QuadConfig::load_with_dotenv().expect("config");
//! if config.sync.is_configured() {
//!     println!("Syncing from {}", config.sync.endpoint_url());
//! }
//! ```

mod cache;
mod error;
mod map;
mod sync;

pub use cache::CacheConfig;
pub use error::ConfigError;
pub use map::MapConfig;
pub use sync::SyncConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QuadConfig {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl QuadConfig {
    /// Load configuration from all sources, using the current directory as
    /// the project root.
    ///
    /// Does NOT call `dotenvy` -- use [`QuadConfig::load_with_dotenv`] if you
    /// need `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a provider fails or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."))
    }

    /// Load configuration for a specific project root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a provider fails or a value is invalid.
    pub fn load_from(project_root: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(project_root).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a provider fails or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain for `project_root`.
    ///
    /// Public so tests can inspect the figment directly or add providers.
    #[must_use]
    pub fn figment(project_root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = project_root.join(".quad").join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("QUAD_").split("__"))
    }

    /// Reject values that would make the runtime misbehave rather than fail.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.map.default_viewport()?;
        if self.map.min_zoom > self.map.max_zoom {
            return Err(ConfigError::InvalidValue {
                field: "map.min_zoom".into(),
                reason: format!(
                    "min_zoom {} is above max_zoom {}",
                    self.map.min_zoom, self.map.max_zoom
                ),
            });
        }
        if self.sync.refresh_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sync.refresh_interval_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("quad").join("config.toml"))
    }
}
