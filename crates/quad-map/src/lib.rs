//! # quad-map
//!
//! Projects the cached location set onto a map as a managed set of markers.
//!
//! [`MapController`] owns the camera, the single pending-placement pin and a
//! [`MarkerRegistry`] of data markers keyed by location id. Every cache
//! change is applied as a minimal diff: markers are created, moved, restyled
//! or destroyed, never rebuilt wholesale.
//!
//! The map widget itself sits behind [`MapSurface`]; routing, auth,
//! geolocation and geocoding are injected through the traits in [`collab`].

pub mod collab;
mod controller;
mod error;
mod lifecycle;
mod registry;
pub mod style;
mod surface;

#[cfg(test)]
mod testing;

pub use collab::{AuthContext, Geocoder, Geolocator, Router, parse_coordinate_query};
pub use controller::MapController;
pub use error::{GeolocationError, MapError};
pub use lifecycle::MarkerState;
pub use registry::{MarkerDiff, MarkerEntry, MarkerRegistry};
pub use style::{MarkerSpec, MarkerStyle, scale_for_zoom};
pub use surface::MapSurface;
