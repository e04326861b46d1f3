//! # quad-sync
//!
//! Keeps the local location cache in step with the campus maps service.
//!
//! - [`payload`]: tolerant decoding of the incremental endpoint's JSON
//! - [`merge`]: the pure merge of a batch into a [`quad_core::CacheState`]
//! - [`SyncEngine`]: coalesced fetches, watermark-ordered commits, status
//!   events
//! - [`SyncScheduler`]: periodic and focus-driven refresh
//! - [`HttpSource`]: the reqwest-backed [`LocationSource`]

mod engine;
mod error;
mod http;
pub mod merge;
pub mod payload;
mod scheduler;
mod source;

pub use engine::{SyncEngine, SyncReport};
pub use error::SyncError;
pub use http::{HttpSource, check_response};
pub use payload::Batch;
pub use scheduler::SyncScheduler;
pub use source::LocationSource;
