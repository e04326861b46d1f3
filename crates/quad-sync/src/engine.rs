//! The sync engine: coalesced fetch, ordered commit, status publishing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use quad_cache::LocalCache;
use quad_core::responses::SyncResponse;
use quad_core::{CacheState, DeletionRecord, Location, SyncOutcome, SyncStatus};
use quad_events::{Event, EventBus};
use tokio::time::Instant;

use crate::error::SyncError;
use crate::merge::merge;
use crate::payload::Batch;
use crate::source::LocationSource;

/// Result of one sync, shared by every coalesced caller.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub updated: Vec<Location>,
    pub deleted: Vec<DeletionRecord>,
    pub new_watermark: DateTime<Utc>,
    /// `Superseded` when a newer batch had already been committed.
    pub outcome: SyncOutcome,
    pub full_snapshot: bool,
    /// Cache size after this sync.
    pub total_locations: usize,
}

impl SyncReport {
    #[must_use]
    pub fn to_response(&self) -> SyncResponse {
        SyncResponse {
            outcome: self.outcome,
            full_snapshot: self.full_snapshot,
            updated: self.updated.len(),
            deleted: self.deleted.len(),
            watermark: self.new_watermark,
            total_locations: self.total_locations,
        }
    }
}

type SharedSync = Shared<BoxFuture<'static, Result<SyncReport, SyncError>>>;

struct Flight {
    id: u64,
    started: Instant,
    future: SharedSync,
}

/// Drives [`LocationSource`] fetches into a [`LocalCache`].
///
/// - Calls with the same `since` inside the dedupe interval share one fetch
///   and all observe its result. Failed fetches are not reused, and neither
///   is a finished fetch whose watermark the cache no longer holds (after
///   [`LocalCache::invalidate`]).
/// - A batch is committed only if its watermark is not older than the
///   committed one, so completion order never moves the watermark back.
/// - `since = None` is a full snapshot and replaces the cached set.
/// - Progress is published as [`Event::SyncStatusChanged`]; committed changes
///   as [`Event::LocationsChanged`], in commit order.
pub struct SyncEngine<S> {
    source: Arc<S>,
    cache: Arc<LocalCache>,
    status: Arc<StatusCell>,
    dedupe_interval: Duration,
    flights: Mutex<HashMap<Option<DateTime<Utc>>, Flight>>,
    next_flight: AtomicU64,
}

impl<S: LocationSource> SyncEngine<S> {
    pub fn new(source: S, cache: Arc<LocalCache>, bus: EventBus, dedupe_interval: Duration) -> Self {
        Self {
            source: Arc::new(source),
            cache,
            status: Arc::new(StatusCell {
                current: Mutex::new(SyncStatus::Idle),
                commits: Mutex::new(()),
                bus,
            }),
            dedupe_interval,
            flights: Mutex::new(HashMap::new()),
            next_flight: AtomicU64::new(0),
        }
    }

    /// Fetch changes after `since` (everything when `None`) and merge them.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if the fetch failed or the payload was
    /// malformed. The cache is untouched in both cases.
    pub async fn sync(&self, since: Option<DateTime<Utc>>) -> Result<SyncReport, SyncError> {
        let (id, flight) = self.join_or_start(since);
        let result = flight.await;
        if result.is_err() {
            self.forget(since, id);
        }
        result
    }

    /// Incremental sync from the cached watermark; a full snapshot when the
    /// cache is empty or invalidated.
    ///
    /// # Errors
    ///
    /// See [`SyncEngine::sync`].
    pub async fn refresh(&self) -> Result<SyncReport, SyncError> {
        let since = self.cache.read().watermark;
        self.sync(since).await
    }

    #[must_use]
    pub fn status(&self) -> SyncStatus {
        self.status.get()
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<LocalCache> {
        &self.cache
    }

    fn join_or_start(&self, since: Option<DateTime<Utc>>) -> (u64, SharedSync) {
        let now = Instant::now();
        let mut flights = self.flights();
        flights.retain(|_, flight| now.duration_since(flight.started) < self.dedupe_interval);

        let cached = self.cache.read().watermark;
        flights.retain(|_, flight| match flight.future.peek() {
            Some(Ok(report)) => cached >= Some(report.new_watermark),
            _ => true,
        });

        if let Some(flight) = flights.get(&since) {
            tracing::debug!(?since, "coalescing with recent sync");
            return (flight.id, flight.future.clone());
        }

        let id = self.next_flight.fetch_add(1, Ordering::Relaxed);
        let future = run(
            Arc::clone(&self.source),
            Arc::clone(&self.cache),
            Arc::clone(&self.status),
            since,
        )
        .boxed()
        .shared();
        flights.insert(
            since,
            Flight {
                id,
                started: now,
                future: future.clone(),
            },
        );
        (id, future)
    }

    fn forget(&self, since: Option<DateTime<Utc>>, id: u64) {
        let mut flights = self.flights();
        if flights.get(&since).is_some_and(|flight| flight.id == id) {
            flights.remove(&since);
        }
    }

    fn flights(&self) -> MutexGuard<'_, HashMap<Option<DateTime<Utc>>, Flight>> {
        self.flights.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn run<S: LocationSource>(
    source: Arc<S>,
    cache: Arc<LocalCache>,
    status: Arc<StatusCell>,
    since: Option<DateTime<Utc>>,
) -> Result<SyncReport, SyncError> {
    status.set(SyncStatus::Syncing, None);

    let batch = match source.fetch(since).await {
        Ok(batch) => batch,
        Err(error) => {
            tracing::warn!(%error, ?since, "location sync failed; keeping cached data");
            status.set(SyncStatus::Stale, Some(error.to_string()));
            return Err(error);
        }
    };

    let full_snapshot = since.is_none();
    let (outcome, total_locations) = commit(&cache, &status, &batch, full_snapshot);
    status.set(SyncStatus::Idle, None);

    Ok(SyncReport {
        updated: batch.updated,
        deleted: batch.deleted,
        new_watermark: batch.watermark,
        outcome,
        full_snapshot,
        total_locations,
    })
}

/// Merge `batch` into the cache and publish the result.
///
/// Commit and publish happen under one lock, so listeners see committed
/// states in the order they were committed.
fn commit(
    cache: &LocalCache,
    status: &StatusCell,
    batch: &Batch,
    full_snapshot: bool,
) -> (SyncOutcome, usize) {
    let _order = status.commits.lock().unwrap_or_else(PoisonError::into_inner);
    let mut changed = false;
    let committed = cache.update(|current| {
        if !current.accepts(batch.watermark) {
            return None;
        }
        let next = if full_snapshot {
            merge(&CacheState::default(), batch)
        } else {
            merge(current, batch)
        };
        changed = next.locations != current.locations;
        Some(next)
    });

    match committed {
        Some(state) => {
            tracing::info!(
                updated = batch.updated.len(),
                deleted = batch.deleted.len(),
                watermark = %batch.watermark,
                total = state.len(),
                full_snapshot,
                "location batch applied"
            );
            let total = state.len();
            if changed {
                status.bus.publish(&Event::LocationsChanged {
                    state: Arc::new(state),
                });
            }
            (SyncOutcome::Applied, total)
        }
        None => {
            tracing::debug!(
                watermark = %batch.watermark,
                "discarding batch older than committed watermark"
            );
            (SyncOutcome::Superseded, cache.read().len())
        }
    }
}

struct StatusCell {
    current: Mutex<SyncStatus>,
    commits: Mutex<()>,
    bus: EventBus,
}

impl StatusCell {
    fn get(&self) -> SyncStatus {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, status: SyncStatus, reason: Option<String>) {
        {
            let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            if *current == status && reason.is_none() {
                return;
            }
            *current = status;
        }
        tracing::debug!(%status, ?reason, "sync status changed");
        self.bus.publish(&Event::SyncStatusChanged { status, reason });
    }
}
