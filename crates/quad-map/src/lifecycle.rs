//! Marker lifecycle.

use std::fmt;

use quad_core::CoreError;

/// Lifecycle of one data marker.
///
/// ```text
/// absent → created → rendered → destroyed
///                  → destroyed
/// ```
///
/// `Destroyed` is terminal. If the location comes back, it gets a new
/// marker that starts again from `Absent`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MarkerState {
    #[default]
    Absent,
    Created,
    Rendered,
    Destroyed,
}

impl MarkerState {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Absent => &[Self::Created],
            Self::Created => &[Self::Rendered, Self::Destroyed],
            Self::Rendered => &[Self::Destroyed],
            Self::Destroyed => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Check a transition for the marker of `location_id`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransition`] if `next` is not reachable.
    pub fn transition(self, location_id: &str, next: Self) -> Result<Self, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidTransition {
                entity: "marker".to_string(),
                id: location_id.to_string(),
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    /// Whether a marker in this state is on the map.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Created | Self::Rendered)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Created => "created",
            Self::Rendered => "rendered",
            Self::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for MarkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
