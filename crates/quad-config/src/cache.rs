//! Local cache location.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Directory holding the persisted cache files. Empty means
    /// `<project>/.quad/cache`.
    #[serde(default)]
    pub dir: String,

    /// Keep the cache in memory only (nothing survives restart).
    #[serde(default)]
    pub in_memory: bool,
}

impl CacheConfig {
    /// Resolve the cache directory against the project root.
    #[must_use]
    pub fn resolve_dir(&self, project_root: &Path) -> PathBuf {
        if self.dir.is_empty() {
            project_root.join(".quad").join("cache")
        } else {
            let dir = PathBuf::from(&self.dir);
            if dir.is_absolute() {
                dir
            } else {
                project_root.join(dir)
            }
        }
    }
}
