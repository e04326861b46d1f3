//! # quad-core
//!
//! Core types shared by every Quad crate.
//!
//! - [`Location`], [`Coordinates`] and [`DeletionRecord`] as they exist after
//!   wire decoding
//! - [`CacheState`]: the reconciled location set plus its watermark
//! - [`ViewportState`]: the last camera position
//! - Category and sync status enums
//! - Cross-cutting error types
//! - CLI response types

pub mod cache_state;
pub mod enums;
pub mod errors;
pub mod location;
pub mod responses;
pub mod viewport;

pub use cache_state::CacheState;
pub use enums::{Category, SyncOutcome, SyncStatus};
pub use errors::CoreError;
pub use location::{Coordinates, DeletionRecord, Location};
pub use viewport::ViewportState;
