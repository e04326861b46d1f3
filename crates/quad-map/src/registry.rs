//! The marker registry and its reconcile pass.

use std::collections::BTreeMap;

use quad_core::{CacheState, Category, Coordinates};

use crate::lifecycle::MarkerState;
use crate::style::{MarkerSpec, MarkerStyle, appear_delay};
use crate::surface::MapSurface;

/// Ownership record tying one surface marker to one location id.
#[derive(Debug)]
pub struct MarkerEntry<H> {
    pub handle: H,
    pub coordinates: Coordinates,
    pub category: Category,
    pub state: MarkerState,
}

/// What one reconcile pass changed, as location ids in id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerDiff {
    pub created: Vec<String>,
    pub moved: Vec<String>,
    pub restyled: Vec<String>,
    pub destroyed: Vec<String>,
}

impl MarkerDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.moved.is_empty()
            && self.restyled.is_empty()
            && self.destroyed.is_empty()
    }
}

/// Live data markers keyed by location id.
#[derive(Debug)]
pub struct MarkerRegistry<H> {
    entries: BTreeMap<String, MarkerEntry<H>>,
}

impl<H> Default for MarkerRegistry<H> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<H> MarkerRegistry<H> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&MarkerEntry<H>> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut MarkerEntry<H>> {
        self.entries.get_mut(id)
    }

    /// Location ids with a live marker, in id order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut MarkerEntry<H>> {
        self.entries.values_mut()
    }

    /// Bring the registry in line with the renderable locations of `state`.
    ///
    /// With `P` the ids currently registered and `N` the renderable ids in
    /// `state`:
    /// - `P \ N` are removed from the surface
    /// - `N \ P` are created with `scale`, popping in one after another
    /// - `P ∩ N` are moved and/or restyled in place when their coordinates
    ///   or category changed, and left alone otherwise
    pub fn reconcile<S>(&mut self, surface: &mut S, state: &CacheState, scale: f64) -> MarkerDiff
    where
        S: MapSurface<Marker = H>,
    {
        let mut diff = MarkerDiff::default();

        let gone: Vec<String> = self
            .entries
            .keys()
            .filter(|id| !state.get(id).is_some_and(|l| l.is_renderable()))
            .cloned()
            .collect();
        for id in gone {
            if let Some(entry) = self.entries.remove(&id) {
                if let Err(error) = entry.state.transition(&id, MarkerState::Destroyed) {
                    tracing::warn!(%error, "destroying marker from unexpected state");
                }
                surface.remove_marker(entry.handle);
                diff.destroyed.push(id);
            }
        }

        for location in state.renderable() {
            if let Some(entry) = self.entries.get_mut(&location.id) {
                if entry.coordinates != location.coordinates {
                    surface.move_marker(&mut entry.handle, location.coordinates);
                    entry.coordinates = location.coordinates;
                    diff.moved.push(location.id.clone());
                }
                if entry.category != location.category {
                    surface.restyle_marker(
                        &mut entry.handle,
                        MarkerStyle::for_category(location.category),
                    );
                    entry.category = location.category;
                    diff.restyled.push(location.id.clone());
                }
                continue;
            }

            let spec = MarkerSpec {
                style: MarkerStyle::for_category(location.category),
                scale,
                appear_delay: appear_delay(diff.created.len()),
            };
            let handle = surface.create_marker(location, spec);
            self.entries.insert(
                location.id.clone(),
                MarkerEntry {
                    handle,
                    coordinates: location.coordinates,
                    category: location.category,
                    state: MarkerState::Created,
                },
            );
            diff.created.push(location.id.clone());
        }

        diff
    }

    /// Record that the surface finished drawing the marker for `id`.
    /// Returns `false` if no marker exists for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`quad_core::CoreError::InvalidTransition`] if the marker was
    /// already rendered.
    pub fn mark_rendered(&mut self, id: &str) -> Result<bool, quad_core::CoreError> {
        let Some(entry) = self.entries.get_mut(id) else {
            return Ok(false);
        };
        entry.state = entry.state.transition(id, MarkerState::Rendered)?;
        Ok(true)
    }

    /// Remove every marker from the surface.
    pub fn clear<S>(&mut self, surface: &mut S) -> usize
    where
        S: MapSurface<Marker = H>,
    {
        let count = self.entries.len();
        for (_, entry) in std::mem::take(&mut self.entries) {
            surface.remove_marker(entry.handle);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use quad_core::{CacheState, Category, Coordinates, Location};

    use super::*;
    use crate::testing::{Op, RecordingSurface};

    fn loc(id: &str, lat: f64, category: Category) -> Location {
        Location {
            id: id.into(),
            name: id.to_uppercase(),
            coordinates: Coordinates { lat, lon: 77.6 },
            category,
            updated_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
        }
    }

    fn state(locations: Vec<Location>) -> CacheState {
        CacheState::from_locations(locations, None)
    }

    fn ids(diff: &[String]) -> Vec<&str> {
        diff.iter().map(String::as_str).collect()
    }

    #[test]
    fn diff_counts_follow_set_difference() {
        let mut surface = RecordingSurface::default();
        let mut registry = MarkerRegistry::default();
        registry.reconcile(
            &mut surface,
            &state(vec![
                loc("a", 12.0, Category::Food),
                loc("b", 12.1, Category::Food),
                loc("c", 12.2, Category::Food),
            ]),
            1.0,
        );
        surface.take_ops();

        let diff = registry.reconcile(
            &mut surface,
            &state(vec![
                loc("b", 12.1, Category::Food),
                loc("c", 12.2, Category::Food),
                loc("d", 12.3, Category::Food),
            ]),
            1.0,
        );

        assert_eq!(ids(&diff.destroyed), vec!["a"]);
        assert_eq!(ids(&diff.created), vec!["d"]);
        assert!(diff.moved.is_empty());
        assert!(diff.restyled.is_empty());
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["b", "c", "d"]);
    }

    #[test]
    fn changed_coordinates_move_in_place() {
        let mut surface = RecordingSurface::default();
        let mut registry = MarkerRegistry::default();
        registry.reconcile(&mut surface, &state(vec![loc("a", 12.0, Category::Food)]), 1.0);
        surface.take_ops();

        let diff = registry.reconcile(&mut surface, &state(vec![loc("a", 13.0, Category::Food)]), 1.0);

        assert_eq!(ids(&diff.moved), vec!["a"]);
        assert!(diff.created.is_empty());
        assert!(diff.destroyed.is_empty());
        assert_eq!(
            surface.take_ops(),
            vec![Op::Move {
                id: "a".into(),
                to: Coordinates { lat: 13.0, lon: 77.6 },
            }]
        );
    }

    #[test]
    fn category_change_restyles_without_recreate() {
        let mut surface = RecordingSurface::default();
        let mut registry = MarkerRegistry::default();
        registry.reconcile(&mut surface, &state(vec![loc("a", 12.0, Category::Food)]), 1.0);
        surface.take_ops();

        let diff = registry.reconcile(&mut surface, &state(vec![loc("a", 12.0, Category::Admin)]), 1.0);

        assert_eq!(ids(&diff.restyled), vec!["a"]);
        assert_eq!(
            surface.take_ops(),
            vec![Op::Restyle {
                id: "a".into(),
                style: MarkerStyle::for_category(Category::Admin),
            }]
        );
    }

    #[test]
    fn unchanged_set_is_a_no_op() {
        let mut surface = RecordingSurface::default();
        let mut registry = MarkerRegistry::default();
        let current = state(vec![loc("a", 12.0, Category::Food), loc("b", 12.5, Category::Hostel)]);
        registry.reconcile(&mut surface, &current, 1.0);
        surface.take_ops();

        assert!(registry.reconcile(&mut surface, &current, 1.0).is_empty());
        assert!(surface.take_ops().is_empty());
    }

    #[test]
    fn unrenderable_locations_get_no_marker() {
        let mut surface = RecordingSurface::default();
        let mut registry = MarkerRegistry::default();
        let diff = registry.reconcile(
            &mut surface,
            &state(vec![loc("ok", 12.0, Category::Food), loc("bad", 95.0, Category::Food)]),
            1.0,
        );
        assert_eq!(ids(&diff.created), vec!["ok"]);
        assert!(registry.get("bad").is_none());

        // A location whose coordinates become invalid loses its marker.
        let diff = registry.reconcile(&mut surface, &state(vec![loc("ok", 120.0, Category::Food)]), 1.0);
        assert_eq!(ids(&diff.destroyed), vec!["ok"]);
        assert!(registry.is_empty());
    }

    #[test]
    fn created_markers_pop_in_staggered() {
        let mut surface = RecordingSurface::default();
        let mut registry = MarkerRegistry::default();
        registry.reconcile(
            &mut surface,
            &state(vec![loc("a", 12.0, Category::Food), loc("b", 12.1, Category::Food)]),
            1.2,
        );

        let delays: Vec<(String, Duration, f64)> = surface
            .take_ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Create { id, spec } => Some((id, spec.appear_delay, spec.scale)),
                _ => None,
            })
            .collect();
        assert_eq!(
            delays,
            vec![
                ("a".to_string(), appear_delay(0), 1.2),
                ("b".to_string(), appear_delay(1), 1.2),
            ]
        );
    }

    #[test]
    fn reappearing_location_is_a_fresh_marker() {
        let mut surface = RecordingSurface::default();
        let mut registry = MarkerRegistry::default();
        let with_a = state(vec![loc("a", 12.0, Category::Food)]);
        registry.reconcile(&mut surface, &with_a, 1.0);
        assert_eq!(registry.mark_rendered("a"), Ok(true));

        registry.reconcile(&mut surface, &state(Vec::new()), 1.0);
        let diff = registry.reconcile(&mut surface, &with_a, 1.0);

        assert_eq!(ids(&diff.created), vec!["a"]);
        assert_eq!(registry.get("a").map(|e| e.state), Some(MarkerState::Created));
    }

    #[test]
    fn mark_rendered_twice_is_rejected() {
        let mut surface = RecordingSurface::default();
        let mut registry = MarkerRegistry::default();
        registry.reconcile(&mut surface, &state(vec![loc("a", 12.0, Category::Food)]), 1.0);

        assert_eq!(registry.mark_rendered("a"), Ok(true));
        assert!(registry.mark_rendered("a").is_err());
        assert_eq!(registry.mark_rendered("missing"), Ok(false));
    }

    #[test]
    fn clear_removes_every_marker() {
        let mut surface = RecordingSurface::default();
        let mut registry = MarkerRegistry::default();
        registry.reconcile(
            &mut surface,
            &state(vec![loc("a", 12.0, Category::Food), loc("b", 12.1, Category::Food)]),
            1.0,
        );
        surface.take_ops();

        assert_eq!(registry.clear(&mut surface), 2);
        assert!(registry.is_empty());
        assert_eq!(
            surface.take_ops(),
            vec![Op::Remove { id: "a".into() }, Op::Remove { id: "b".into() }]
        );
    }
}
