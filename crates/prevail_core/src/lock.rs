//! Process-level exclusive lock on a store path.
//!
//! The lock lives beside the data artifact:
//!
//! ```text
//! <path>          # data artifact
//! <path>.index    # index artifact
//! <path>.lock     # advisory lock, held while a handle is open
//! ```
//!
//! Two handles writing snapshots to the same path would overwrite each
//! other's state, so only one may hold the lock at a time.

use crate::error::{CoreError, CoreResult};
use fs2::FileExt;
use prevail_storage::with_suffix;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Suffix of the lock file.
pub const LOCK_SUFFIX: &str = ".lock";

/// Holds an exclusive advisory lock until dropped.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
    _file: File,
}

impl StoreLock {
    /// Acquires the lock for the store at `data_path`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseLocked` if another handle holds it, or an I/O
    /// error if the lock file cannot be opened.
    pub fn acquire(data_path: &Path) -> CoreResult<Self> {
        let path = with_suffix(data_path, LOCK_SUFFIX);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        if file.try_lock_exclusive().is_err() {
            return Err(CoreError::DatabaseLocked);
        }

        Ok(Self { path, _file: file })
    }

    /// Returns the lock file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn second_acquire_fails() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("store.db");

        let lock = StoreLock::acquire(&data).unwrap();
        assert!(lock.path().ends_with("store.db.lock"));
        assert!(matches!(
            StoreLock::acquire(&data),
            Err(CoreError::DatabaseLocked)
        ));
    }

    #[test]
    fn released_on_drop() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("store.db");

        drop(StoreLock::acquire(&data).unwrap());
        assert!(StoreLock::acquire(&data).is_ok());
    }
}
