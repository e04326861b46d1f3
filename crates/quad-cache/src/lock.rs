//! Cross-process writer exclusion for one cache directory.
//!
//! Two `quad` processes writing the same directory would each commit from
//! their own in-memory state and overwrite the other's merges. A writer
//! therefore holds a [`CacheLock`] before it opens the cache.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// File created inside the cache directory while a writer holds it.
pub const LOCK_FILE: &str = "write.lock";

/// Who holds a cache directory, as recorded in the lock file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockHolder {
    pub pid: u32,
    pub command: String,
    pub since: DateTime<Utc>,
}

/// Exclusive write access to a cache directory. Dropping it releases the
/// directory.
#[derive(Debug)]
pub struct CacheLock {
    path: PathBuf,
    holder: LockHolder,
}

impl CacheLock {
    /// Claim `dir` for `command` without waiting.
    ///
    /// A lock file left behind by a process that no longer runs is replaced.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Locked`] if a live process holds the directory
    /// - [`StorageError::Corrupt`] if the existing lock file is unreadable,
    ///   so its holder cannot be checked
    /// - [`StorageError::Io`] if the directory or lock file cannot be written
    pub fn try_acquire(dir: &Path, command: &str) -> Result<Self, StorageError> {
        let io_error = |source| StorageError::Io {
            target: dir.display().to_string(),
            source,
        };
        fs::create_dir_all(dir).map_err(io_error)?;

        let path = dir.join(LOCK_FILE);
        let holder = LockHolder {
            pid: std::process::id(),
            command: command.to_string(),
            since: Utc::now(),
        };

        // Second attempt only after clearing a lock whose holder is gone.
        for _ in 0..2 {
            match OpenOptions::new().create_new(true).write(true).open(&path) {
                Ok(mut file) => {
                    let body = serde_json::to_vec(&holder).map_err(|source| {
                        StorageError::Serialize {
                            key: LOCK_FILE.to_string(),
                            source,
                        }
                    })?;
                    file.write_all(&body).map_err(io_error)?;
                    tracing::debug!(dir = %dir.display(), command, "cache write lock acquired");
                    return Ok(Self { path, holder });
                }
                Err(error) if error.kind() == ErrorKind::AlreadyExists => {
                    let existing = read_holder(&path)?;
                    if is_running(existing.pid) {
                        return Err(StorageError::Locked {
                            dir: dir.display().to_string(),
                            pid: existing.pid,
                            command: existing.command,
                        });
                    }
                    tracing::info!(
                        pid = existing.pid,
                        command = %existing.command,
                        "replacing cache lock left by an exited process"
                    );
                    match fs::remove_file(&path) {
                        Ok(()) => {}
                        Err(error) if error.kind() == ErrorKind::NotFound => {}
                        Err(error) => return Err(io_error(error)),
                    }
                }
                Err(error) => return Err(io_error(error)),
            }
        }

        let existing = read_holder(&path)?;
        Err(StorageError::Locked {
            dir: dir.display().to_string(),
            pid: existing.pid,
            command: existing.command,
        })
    }

    #[must_use]
    pub const fn holder(&self) -> &LockHolder {
        &self.holder
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        if let Err(error) = fs::remove_file(&self.path) {
            tracing::warn!(%error, path = %self.path.display(), "failed to release cache lock");
        }
    }
}

fn read_holder(path: &Path) -> Result<LockHolder, StorageError> {
    let raw = fs::read(path).map_err(|source| StorageError::Io {
        target: path.display().to_string(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|error| StorageError::Corrupt {
        key: LOCK_FILE.to_string(),
        reason: format!("{error}; delete {} if no quad process is running", path.display()),
    })
}

/// Whether `pid` names a live process. Without `/proc` every holder is
/// assumed alive.
fn is_running(pid: u32) -> bool {
    if pid == std::process::id() {
        return true;
    }
    let proc_root = Path::new("/proc");
    !proc_root.is_dir() || proc_root.join(pid.to_string()).exists()
}
