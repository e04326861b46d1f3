//! Cross-cutting error types for Quad.
//!
//! Domain-specific errors (`StorageError`, `SyncError`, `MapError`) live in
//! their own crates. The binary converges them through `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any Quad crate.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// Latitude/longitude outside the WGS84 range or not finite.
    #[error("Invalid coordinates: lat={lat}, lon={lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    /// A lifecycle transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity} {id} from {from} to {to}")]
    InvalidTransition {
        entity: String,
        id: String,
        from: String,
        to: String,
    },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),
}
