// Exclusive session lock over a store directory

use crate::error::{TaskError, TaskResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use tracing::{debug, info};

/// Held for the life of a process so only one session writes the store
///
/// The lock is released when this value is dropped.
#[derive(Debug)]
pub struct SessionLock {
    file: File,
}

impl SessionLock {
    /// Lock `<dir>/lock`, waiting if another session holds it
    ///
    /// Callers that want to tell the user about the wait should try
    /// `try_acquire` first.
    pub fn acquire(dir: &Path) -> TaskResult<Self> {
        let file = open_lock_file(dir)?;

        if file.try_lock_exclusive().is_err() {
            info!(dir = ?dir, "Store is locked by another session, waiting");
            file.lock_exclusive()
                .map_err(|e| TaskError::Storage(format!("Failed to acquire file lock: {}", e)))?;
        }

        debug!(dir = ?dir, "Acquired session lock");
        Ok(Self { file })
    }

    /// Try once without waiting; None if another session holds the lock
    pub fn try_acquire(dir: &Path) -> TaskResult<Option<Self>> {
        let file = open_lock_file(dir)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { file })),
            Err(_) => Ok(None),
        }
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn open_lock_file(dir: &Path) -> TaskResult<File> {
    fs::create_dir_all(dir).map_err(|e| TaskError::Storage(format!("Failed to create store directory: {}", e)))?;

    OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(dir.join("lock"))
        .map_err(|e| TaskError::Storage(format!("Failed to open lock file: {}", e)))
}
