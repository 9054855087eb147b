//! PID-file lock manager.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{Result, SoloistError};

use super::liveness::process_alive;

/// Mutual exclusion between processes through a shared PID file.
///
/// A manager holds at most one lock at a time. Locks are not waited for:
/// acquisition either succeeds immediately or fails with
/// [`SoloistError::LockHeld`].
///
/// Known limitation: between the staleness check and the PID write another
/// process can acquire the same path, leaving both convinced they hold the
/// lock. Exclusive creation cannot close this window because reclaiming a
/// stale file requires overwriting it in place.
#[derive(Debug)]
pub struct LockManager {
    /// Path of the currently held lock, `None` when nothing is held.
    owned: Option<PathBuf>,
    /// This process's PID, written into lock files it acquires.
    pid: u32,
}

impl LockManager {
    pub fn new() -> Self {
        Self {
            owned: None,
            pid: std::process::id(),
        }
    }

    /// Acquires the lock at `path`.
    ///
    /// Fails with [`SoloistError::LockHeld`] when the file records the PID
    /// of a live process; the existing file is left untouched. A missing
    /// file, unparseable content, or a dead holder all mean the lock is
    /// free, and this process's PID is written in its place.
    pub fn lock(&mut self, path: &Path) -> Result<()> {
        if read_recorded_pid(path)?.is_some_and(process_alive) {
            return Err(SoloistError::LockHeld {
                path: path.to_path_buf(),
            });
        }
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|source| SoloistError::Lock {
                path: path.to_path_buf(),
                source,
            })?;
        write!(file, "{}", self.pid).map_err(|source| SoloistError::Lock {
            path: path.to_path_buf(),
            source,
        })?;
        file.sync_all().map_err(|source| SoloistError::Lock {
            path: path.to_path_buf(),
            source,
        })?;
        self.owned = Some(path.to_path_buf());
        Ok(())
    }

    /// Releases the held lock, if any.
    ///
    /// The file is deleted only while it still records this process's PID;
    /// a path since reclaimed by another process is left alone. Ownership
    /// is cleared either way. Safe to call repeatedly, and without a
    /// preceding [`lock`](Self::lock).
    pub fn unlock(&mut self) -> Result<()> {
        let Some(path) = self.owned.take() else {
            return Ok(());
        };
        match read_recorded_pid(&path)? {
            Some(pid) if pid == self.pid => match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(source) => Err(SoloistError::Lock { path, source }),
            },
            // Missing file, garbage content, or a foreign PID: nothing of
            // ours remains to delete.
            _ => Ok(()),
        }
    }

    /// Path of the currently held lock, if any.
    pub fn owned_path(&self) -> Option<&Path> {
        self.owned.as_deref()
    }
}

impl Default for LockManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LockManager {
    fn drop(&mut self) {
        if let Err(error) = self.unlock() {
            warn!(error = %error, "failed to release lock on drop");
        }
    }
}

/// Reads the PID recorded in a lock file.
///
/// A missing file and unparseable content both yield `None`; only an
/// actual read failure is an error.
fn read_recorded_pid(path: &Path) -> Result<Option<u32>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SoloistError::Lock {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    Ok(content.trim().parse::<u32>().ok())
}
