//! Cross-process lock around debug keystore generation
//!
//! Two jobs that both find the debug keystore missing must not both run
//! `keytool` against the same file. The lock is a sibling file created
//! with `create_new`, so exactly one caller wins; the others poll until it
//! disappears or the timeout runs out.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use crate::error::ConvertError;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const CONTENTION_WARNING_AFTER: Duration = Duration::from_millis(500);

/// Held lock file; removed on drop
#[derive(Debug)]
pub struct KeystoreLock {
    lock_path: PathBuf,
}

impl KeystoreLock {
    /// Lock file path for a keystore (`debug.keystore` -> `debug.keystore.lock`)
    pub fn path_for(keystore: &Path) -> PathBuf {
        let mut name = keystore
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        keystore.with_file_name(name)
    }

    /// Wait up to `timeout` for the lock
    ///
    /// A lock file older than `stale_after` is assumed to belong to a
    /// process that died mid-generation and is removed.
    pub async fn acquire(
        lock_path: &Path,
        timeout: Duration,
        stale_after: Duration,
    ) -> Result<Self, ConvertError> {
        let start = Instant::now();
        let mut warned = false;

        loop {
            match try_create(lock_path) {
                Ok(()) => {
                    if warned {
                        log::info!(
                            "Acquired {} after {:.1}s",
                            lock_path.display(),
                            start.elapsed().as_secs_f64()
                        );
                    }
                    return Ok(Self {
                        lock_path: lock_path.to_path_buf(),
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if is_stale(lock_path, stale_after) {
                        log::warn!("Removing stale lock {}", lock_path.display());
                        // Another waiter may have removed it first
                        let _ = std::fs::remove_file(lock_path);
                        continue;
                    }
                    if !warned && start.elapsed() > CONTENTION_WARNING_AFTER {
                        log::warn!(
                            "Waiting for another job to finish generating the keystore ({})",
                            lock_path.display()
                        );
                        warned = true;
                    }
                }
                Err(e) => {
                    return Err(ConvertError::io(
                        format!("Failed to create lock file {}", lock_path.display()),
                        e,
                    ))
                }
            }

            if start.elapsed() >= timeout {
                return Err(ConvertError::TimedOut {
                    tool: format!("lock {}", lock_path.display()),
                    timeout,
                });
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for KeystoreLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.lock_path) {
            log::warn!("Failed to release {}: {}", self.lock_path.display(), e);
        }
    }
}

fn try_create(lock_path: &Path) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(lock_path)?;
    // Owner pid is informational only
    writeln!(file, "{}", std::process::id())
}

fn is_stale(lock_path: &Path, stale_after: Duration) -> bool {
    std::fs::metadata(lock_path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age > stale_after)
}
