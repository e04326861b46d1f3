//! Map controller error types.

use std::time::Duration;

use quad_core::CoreError;
use thiserror::Error;

/// Why a device location fix could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    Denied,

    #[error("location unavailable: {0}")]
    Unavailable(String),

    #[error("no location fix within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum MapError {
    /// No rendered marker exists for the location id.
    #[error("no marker for location {0}")]
    UnknownMarker(String),

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
