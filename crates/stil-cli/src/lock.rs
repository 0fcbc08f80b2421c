//! Cross-process lock around read-modify-write of the session store.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

/// Returns the path to the lock file next to the database.
pub fn lock_path(database_path: &Path) -> PathBuf {
    database_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(".lock")
}

/// Exclusive lock held for as long as the guard is alive.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
}

impl StoreLock {
    /// Blocks until the lock beside `database_path` is acquired.
    pub fn acquire(database_path: &Path) -> Result<Self> {
        let path = lock_path(database_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
        let file = File::create(&path).context("failed to create lock file")?;
        file.lock_exclusive().context("failed to acquire lock")?;
        tracing::debug!(path = %path.display(), "acquired store lock");
        Ok(Self { file })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            tracing::warn!(error = %err, "failed to release store lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_file_lives_beside_database() {
        let path = lock_path(Path::new("/data/stil/stil.db"));
        assert_eq!(path, PathBuf::from("/data/stil/.lock"));
    }

    #[test]
    fn lock_is_exclusive_until_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("stil.db");

        let guard = StoreLock::acquire(&db_path).unwrap();
        let other = File::open(lock_path(&db_path)).unwrap();
        assert!(other.try_lock_exclusive().is_err());

        drop(guard);
        other.try_lock_exclusive().unwrap();
    }
}
