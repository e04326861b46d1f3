use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use quad_cache::{CacheLock, LocalCache};
use quad_config::QuadConfig;
use quad_events::EventBus;
use quad_sync::{HttpSource, SyncEngine};

use super::cache_lock::wait_for_cache_lock;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: QuadConfig,
    pub cache: Arc<LocalCache>,
    pub bus: EventBus,
    /// Held for the whole command when it writes the cache.
    cache_lock: Option<CacheLock>,
}

impl AppContext {
    /// Like [`AppContext::init`], but when `writer` names a command that
    /// writes the cache, first claim the cache directory for it so no other
    /// `quad` process commits over its changes.
    pub async fn open(
        project_root: &Path,
        config: QuadConfig,
        writer: Option<&str>,
    ) -> anyhow::Result<Self> {
        let cache_lock = match writer {
            Some(command) if !config.cache.in_memory => Some(
                wait_for_cache_lock(&config.cache.resolve_dir(project_root), command).await?,
            ),
            _ => None,
        };
        let mut ctx = Self::init(project_root, config);
        ctx.cache_lock = cache_lock;
        Ok(ctx)
    }

    /// Open the project cache. An unusable cache directory degrades to an
    /// in-memory cache instead of failing.
    #[must_use]
    pub fn init(project_root: &Path, config: QuadConfig) -> Self {
        let cache = if config.cache.in_memory {
            LocalCache::in_memory()
        } else {
            let dir = config.cache.resolve_dir(project_root);
            tracing::debug!(dir = %dir.display(), "opening local cache");
            LocalCache::open_dir(&dir)
        };

        if cache.is_degraded() {
            tracing::warn!("local cache is memory-only for this run; changes will not be saved");
        }

        Self {
            config,
            cache: Arc::new(cache),
            bus: EventBus::new(),
            cache_lock: None,
        }
    }

    /// A sync engine over the configured HTTP source, sharing this
    /// context's cache and bus.
    pub fn sync_engine(&self) -> anyhow::Result<SyncEngine<HttpSource>> {
        let source = HttpSource::new(&self.config.sync)
            .context("sync is not available (set sync.base_url or QUAD_SYNC__BASE_URL)")?;
        Ok(SyncEngine::new(
            source,
            Arc::clone(&self.cache),
            self.bus.clone(),
            self.config.sync.dedupe_interval(),
        ))
    }
}
