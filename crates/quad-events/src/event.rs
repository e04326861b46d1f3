//! Topic names and payload shapes.

use std::fmt;
use std::sync::Arc;

use quad_core::{CacheState, Coordinates, SyncStatus};

/// Every topic a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// The bottom navigation "add" button was pressed.
    AddLocationRequested,
    /// The add-location drawer closed.
    DrawerClosed,
    /// Something outside the map changed marker data (e.g. a location was
    /// created) and markers should be reconciled again.
    MarkersShouldRefresh,
    /// The pending placement pin moved to a new coordinate.
    MarkerSelected,
    /// The map finished initializing.
    MapReady,
    /// A sync committed a new location set.
    LocationsChanged,
    /// The syncing/stale indicator changed.
    SyncStatusChanged,
    /// The app regained foreground focus.
    FocusRegained,
    /// An authenticated user asked to add a location at a coordinate.
    AddFlowOpened,
    /// An unauthenticated user tried to add a location.
    LoginRequired,
}

impl Topic {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AddLocationRequested => "add-location-requested",
            Self::DrawerClosed => "drawer-closed",
            Self::MarkersShouldRefresh => "markers-should-refresh",
            Self::MarkerSelected => "marker-selected",
            Self::MapReady => "map-ready",
            Self::LocationsChanged => "locations-changed",
            Self::SyncStatusChanged => "sync-status-changed",
            Self::FocusRegained => "focus-regained",
            Self::AddFlowOpened => "add-flow-opened",
            Self::LoginRequired => "login-required",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A published event with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    AddLocationRequested,
    DrawerClosed,
    MarkersShouldRefresh,
    MarkerSelected { coordinates: Coordinates },
    MapReady,
    LocationsChanged { state: Arc<CacheState> },
    SyncStatusChanged {
        status: SyncStatus,
        reason: Option<String>,
    },
    FocusRegained,
    AddFlowOpened { coordinates: Coordinates },
    LoginRequired,
}

impl Event {
    #[must_use]
    pub const fn topic(&self) -> Topic {
        match self {
            Self::AddLocationRequested => Topic::AddLocationRequested,
            Self::DrawerClosed => Topic::DrawerClosed,
            Self::MarkersShouldRefresh => Topic::MarkersShouldRefresh,
            Self::MarkerSelected { .. } => Topic::MarkerSelected,
            Self::MapReady => Topic::MapReady,
            Self::LocationsChanged { .. } => Topic::LocationsChanged,
            Self::SyncStatusChanged { .. } => Topic::SyncStatusChanged,
            Self::FocusRegained => Topic::FocusRegained,
            Self::AddFlowOpened { .. } => Topic::AddFlowOpened,
            Self::LoginRequired => Topic::LoginRequired,
        }
    }
}
