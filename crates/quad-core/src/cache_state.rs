//! The reconciled location set and its watermark.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::location::Location;

/// Last known location set plus the newest server state it has absorbed.
///
/// Locations are keyed by id, so an id can never appear twice. The watermark
/// is `None` until the first successful sync; after that it only moves
/// forward (see [`CacheState::accepts`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CacheState {
    #[serde(default)]
    pub locations: BTreeMap<String, Location>,
    #[serde(default)]
    pub watermark: Option<DateTime<Utc>>,
}

impl CacheState {
    /// Build a state from a list of locations. Later duplicates win.
    pub fn from_locations<I>(locations: I, watermark: Option<DateTime<Utc>>) -> Self
    where
        I: IntoIterator<Item = Location>,
    {
        Self {
            locations: locations
                .into_iter()
                .map(|location| (location.id.clone(), location))
                .collect(),
            watermark,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Location> {
        self.locations.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.locations.contains_key(id)
    }

    /// Locations in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    /// Locations that have valid coordinates and therefore a marker.
    pub fn renderable(&self) -> impl Iterator<Item = &Location> {
        self.locations.values().filter(|l| l.is_renderable())
    }

    /// Whether a batch stamped `candidate` may be committed on top of this
    /// state without moving the watermark backwards.
    #[must_use]
    pub fn accepts(&self, candidate: DateTime<Utc>) -> bool {
        self.watermark.is_none_or(|current| candidate >= current)
    }
}
