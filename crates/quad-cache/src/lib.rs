//! # quad-cache
//!
//! Offline-first local cache for the campus location set.
//!
//! [`LocalCache`] keeps three independent persisted entries:
//! - the [`CacheState`] (locations + watermark) under [`LOCATIONS_KEY`]
//! - the [`ViewportState`] under [`VIEWPORT_KEY`]
//! - the pending placement coordinate under [`PENDING_PLACEMENT_KEY`]
//!
//! Locations and watermark share one key, so one atomic `put` commits both.
//! A missing or corrupt entry reads as empty instead of failing the caller.
//! If a write fails, the cache keeps serving from memory for the rest of the
//! session.

mod error;
mod lock;
pub mod schema;
mod storage;

pub use error::StorageError;
pub use lock::{CacheLock, LOCK_FILE, LockHolder};
pub use schema::{LOCATIONS_KEY, PENDING_PLACEMENT_KEY, SCHEMA_VERSION, VIEWPORT_KEY};
pub use storage::{FileStorage, MemoryStorage, Storage};

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use quad_core::{CacheState, Coordinates, ViewportState};
use serde::{Serialize, de::DeserializeOwned};

/// Durable key/value cache shared by the sync engine and the map controller.
pub struct LocalCache {
    inner: Mutex<Inner>,
}

struct Inner {
    backend: Box<dyn Storage>,
    degraded: bool,
    state: CacheState,
    viewport: Option<ViewportState>,
    pending_placement: Option<Coordinates>,
}

impl LocalCache {
    /// Load every entry from `backend`.
    ///
    /// Absent or undecodable entries start empty. A read I/O failure, or an
    /// entry written by a newer schema, switches the cache to in-memory mode
    /// so nothing on disk is overwritten.
    pub fn open(backend: impl Storage + 'static) -> Self {
        let mut degraded = false;
        let state: CacheState = load(&backend, LOCATIONS_KEY, &mut degraded).unwrap_or_default();
        let viewport = load(&backend, VIEWPORT_KEY, &mut degraded);
        let pending_placement = load(&backend, PENDING_PLACEMENT_KEY, &mut degraded);

        tracing::debug!(
            backend = %backend.describe(),
            locations = state.len(),
            watermark = ?state.watermark,
            degraded,
            "local cache opened"
        );

        Self {
            inner: Mutex::new(Inner {
                backend: Box::new(backend),
                degraded,
                state,
                viewport,
                pending_placement,
            }),
        }
    }

    /// Open a file-backed cache, falling back to memory if the directory is
    /// unusable.
    pub fn open_dir(dir: &Path) -> Self {
        match FileStorage::open(dir) {
            Ok(storage) => Self::open(storage),
            Err(error) => {
                tracing::warn!(%error, "cache directory unavailable; using in-memory cache");
                let cache = Self::in_memory();
                cache.lock().degraded = true;
                cache
            }
        }
    }

    /// A cache that never touches disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(MemoryStorage::new())
    }

    /// Current location set and watermark.
    #[must_use]
    pub fn read(&self) -> CacheState {
        self.lock().state.clone()
    }

    /// Replace the location set and watermark in one atomic write.
    ///
    /// The new state is always kept in memory. On a persistence failure the
    /// cache degrades to memory-only and the error is returned for logging.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend write failed.
    pub fn write(&self, state: CacheState) -> Result<(), StorageError> {
        let mut inner = self.lock();
        let result = inner.persist(LOCATIONS_KEY, &state);
        inner.state = state;
        result
    }

    /// Read-modify-write under a single lock.
    ///
    /// `f` sees the committed state and returns the replacement, or `None` to
    /// leave the cache untouched. Returns the committed state, if any.
    /// Persistence failures are logged and degrade the cache; they never undo
    /// the in-memory commit.
    pub fn update<F>(&self, f: F) -> Option<CacheState>
    where
        F: FnOnce(&CacheState) -> Option<CacheState>,
    {
        let mut inner = self.lock();
        let next = f(&inner.state)?;
        if let Err(error) = inner.persist(LOCATIONS_KEY, &next) {
            tracing::warn!(%error, "failed to persist location cache");
        }
        inner.state = next.clone();
        Some(next)
    }

    /// Forget all locations and the watermark so the next sync is a full
    /// snapshot. The viewport is kept.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend write failed.
    pub fn invalidate(&self) -> Result<(), StorageError> {
        tracing::info!("invalidating location cache");
        self.write(CacheState::default())
    }

    #[must_use]
    pub fn viewport(&self) -> Option<ViewportState> {
        self.lock().viewport
    }

    /// Persist the camera position.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend write failed.
    pub fn write_viewport(&self, viewport: ViewportState) -> Result<(), StorageError> {
        let mut inner = self.lock();
        let result = inner.persist(VIEWPORT_KEY, &viewport);
        inner.viewport = Some(viewport);
        result
    }

    #[must_use]
    pub fn pending_placement(&self) -> Option<Coordinates> {
        self.lock().pending_placement
    }

    /// Persist the coordinate the add-location form should use.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend write failed.
    pub fn write_pending_placement(&self, coordinates: Coordinates) -> Result<(), StorageError> {
        let mut inner = self.lock();
        let result = inner.persist(PENDING_PLACEMENT_KEY, &coordinates);
        inner.pending_placement = Some(coordinates);
        result
    }

    /// Whether the cache stopped persisting for this session.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.lock().degraded
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Inner {
    fn persist<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        if self.degraded {
            return Ok(());
        }
        let result = schema::encode(key, value).and_then(|bytes| self.backend.put(key, &bytes));
        if let Err(error) = &result {
            tracing::warn!(%error, key, "cache write failed; continuing in memory only");
            self.degraded = true;
        }
        result
    }
}

fn load<T: DeserializeOwned>(backend: &dyn Storage, key: &str, degraded: &mut bool) -> Option<T> {
    let bytes = match backend.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(error) => {
            tracing::warn!(%error, key, "cache read failed; continuing in memory only");
            *degraded = true;
            return None;
        }
    };

    match schema::decode(key, &bytes) {
        Ok(value) => Some(value),
        Err(error @ StorageError::UnsupportedVersion { .. }) => {
            tracing::warn!(%error, key, "cache written by a newer version; not overwriting it");
            *degraded = true;
            None
        }
        Err(error) => {
            tracing::warn!(%error, key, "discarding unreadable cache entry");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use quad_core::{Category, Location};

    use super::*;

    fn state_with(ids: &[&str]) -> CacheState {
        let locations = ids.iter().map(|id| Location {
            id: (*id).to_string(),
            name: (*id).to_string(),
            coordinates: Coordinates { lat: 1.0, lon: 2.0 },
            category: Category::Food,
            updated_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        });
        CacheState::from_locations(locations, Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()))
    }

    /// Backend whose writes always fail.
    struct ReadOnlyStorage;

    impl Storage for ReadOnlyStorage {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Ok(None)
        }

        fn put(&self, key: &str, _value: &[u8]) -> Result<(), StorageError> {
            Err(StorageError::Io {
                target: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }

        fn describe(&self) -> String {
            "read-only".to_string()
        }
    }

    #[test]
    fn empty_backend_reads_empty_state() {
        let cache = LocalCache::in_memory();
        assert!(cache.read().is_empty());
        assert!(cache.viewport().is_none());
        assert!(cache.pending_placement().is_none());
        assert!(!cache.is_degraded());
    }

    #[test]
    fn update_returning_none_leaves_state() {
        let cache = LocalCache::in_memory();
        cache.write(state_with(&["a"])).unwrap();

        assert!(cache.update(|_| None).is_none());
        assert_eq!(cache.read(), state_with(&["a"]));
    }

    #[test]
    fn failed_write_degrades_but_keeps_state_in_memory() {
        let cache = LocalCache::open(ReadOnlyStorage);

        let err = cache.write(state_with(&["a", "b"])).unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
        assert!(cache.is_degraded());
        assert_eq!(cache.read().len(), 2);

        // Later writes succeed against memory.
        cache.write(state_with(&["c"])).unwrap();
        assert!(cache.read().contains("c"));
    }

    #[test]
    fn invalidate_clears_locations_but_keeps_viewport() {
        let cache = LocalCache::in_memory();
        cache.write(state_with(&["a"])).unwrap();
        let viewport = ViewportState::new(Coordinates { lat: 5.0, lon: 6.0 }, 13.0);
        cache.write_viewport(viewport).unwrap();

        cache.invalidate().unwrap();
        assert!(cache.read().is_empty());
        assert!(cache.read().watermark.is_none());
        assert_eq!(cache.viewport(), Some(viewport));
    }
}
