use std::path::Path;
use std::time::Duration;

use quad_cache::{CacheLock, StorageError};

const WAIT_LIMIT: Duration = Duration::from_secs(30);
const RETRY_EVERY: Duration = Duration::from_millis(250);

/// Claim the cache directory for `command`, waiting up to 30 s for another
/// writer to finish.
pub async fn wait_for_cache_lock(dir: &Path, command: &str) -> anyhow::Result<CacheLock> {
    wait_with_limit(dir, command, WAIT_LIMIT).await
}

async fn wait_with_limit(dir: &Path, command: &str, limit: Duration) -> anyhow::Result<CacheLock> {
    let deadline = tokio::time::Instant::now() + limit;
    loop {
        match CacheLock::try_acquire(dir, command) {
            Ok(lock) => return Ok(lock),
            Err(StorageError::Locked { pid, command: holder, .. }) => {
                if tokio::time::Instant::now() >= deadline {
                    anyhow::bail!(
                        "the cache is in use by `quad {holder}` (pid {pid}); stop it or try again later"
                    );
                }
                tracing::debug!(pid, %holder, "waiting for cache lock");
                tokio::time::sleep(RETRY_EVERY).await;
            }
            Err(error) => return Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use quad_cache::{CacheLock, LOCK_FILE};
    use tempfile::TempDir;

    use super::wait_with_limit;

    #[tokio::test]
    async fn free_directory_is_claimed_immediately() {
        let temp = TempDir::new().expect("tempdir should create");

        let lock = wait_with_limit(temp.path(), "sync", Duration::ZERO)
            .await
            .expect("lock should acquire");
        assert_eq!(lock.holder().command, "sync");
        assert!(temp.path().join(LOCK_FILE).is_file());
    }

    #[tokio::test(start_paused = true)]
    async fn busy_directory_times_out_naming_the_holder() {
        let temp = TempDir::new().expect("tempdir should create");
        let _held = CacheLock::try_acquire(temp.path(), "watch").expect("first lock");

        let err = wait_with_limit(temp.path(), "reset", Duration::from_secs(1))
            .await
            .expect_err("second writer should time out");
        assert!(err.to_string().contains("quad watch"));
    }

    #[tokio::test(start_paused = true)]
    async fn lock_released_while_waiting_is_taken() {
        let temp = TempDir::new().expect("tempdir should create");
        let held = CacheLock::try_acquire(temp.path(), "watch").expect("first lock");

        let dir = temp.path().to_path_buf();
        let waiter = tokio::spawn(async move {
            wait_with_limit(&dir, "sync", Duration::from_secs(5)).await
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(held);

        let lock = waiter.await.expect("task").expect("lock after release");
        assert_eq!(lock.holder().command, "sync");
    }
}
