//! Storage error types for quad-cache.

use thiserror::Error;

/// Errors from reading or writing the persisted cache.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing file or directory could not be read or written.
    #[error("I/O error on {target}: {source}")]
    Io {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be encoded or decoded as JSON.
    #[error("Serialization error for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The stored value was written by a newer schema than this build reads.
    #[error("Unsupported schema version for '{key}': found v{found}, supported up to v{supported}")]
    UnsupportedVersion { key: String, found: u32, supported: u32 },

    /// The stored value is not a valid envelope.
    #[error("Corrupt value for '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    /// Another live process holds the cache directory for writing.
    #[error("Cache at {dir} is locked by pid {pid} ({command})")]
    Locked { dir: String, pid: u32, command: String },
}
