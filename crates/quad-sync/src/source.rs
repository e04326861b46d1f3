//! Where batches come from.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::error::SyncError;
use crate::payload::Batch;

/// A remote source of location batches.
///
/// `since = None` requests a full snapshot; otherwise only changes after
/// `since` are returned.
pub trait LocationSource: Send + Sync + 'static {
    fn fetch(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> impl Future<Output = Result<Batch, SyncError>> + Send;
}
