//! Applying a [`Batch`] to a [`CacheState`].

use std::cmp::Ordering;
use std::collections::BTreeMap;

use quad_core::{CacheState, Location};

use crate::payload::Batch;

/// Merge `batch` into `base` and stamp the result with the batch watermark.
///
/// Deletions are applied first, then every updated record replaces any
/// existing copy. An id that is both deleted and updated in the same batch is
/// therefore kept with the updated contents. The merge is idempotent:
/// applying the same batch twice gives the same state as applying it once.
///
/// If the batch carries several records for one id, the most recently
/// updated one is kept regardless of list order (see [`newest_first`]).
#[must_use]
pub fn merge(base: &CacheState, batch: &Batch) -> CacheState {
    let mut winners: BTreeMap<&str, &Location> = BTreeMap::new();
    for location in &batch.updated {
        winners
            .entry(location.id.as_str())
            .and_modify(|kept| {
                if newest_first(location, *kept) == Ordering::Less {
                    *kept = location;
                }
            })
            .or_insert(location);
    }

    let mut locations = base.locations.clone();
    for deletion in &batch.deleted {
        locations.remove(&deletion.id);
    }
    for location in winners.into_values() {
        locations.insert(location.id.clone(), location.clone());
    }

    CacheState {
        locations,
        watermark: Some(batch.watermark),
    }
}

/// Total order over records sharing an id: newest `updated_at` first, then
/// name, category and coordinates. Records equal under it are identical.
fn newest_first(a: &Location, b: &Location) -> Ordering {
    b.updated_at
        .cmp(&a.updated_at)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.category.as_str().cmp(b.category.as_str()))
        .then_with(|| a.coordinates.lat.total_cmp(&b.coordinates.lat))
        .then_with(|| a.coordinates.lon.total_cmp(&b.coordinates.lon))
}
