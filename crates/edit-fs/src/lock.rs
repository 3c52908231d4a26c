//! Per-file exclusive locking. The lock manager is stateless; each handle
//! owns an OS advisory lock (`flock` via `fs2`) on a sentinel file
//! sitting next to the file it protects.
//!
//! The sentinel is never unlinked on release. Unlinking would race: a
//! second process could create a fresh inode at the same path while this
//! process still holds the lock on the old (now unlinked) one, and the
//! two would no longer contend for the same lock at all.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Stateless: every call derives the sentinel path from the target path
/// and opens it fresh.
#[derive(Debug, Default, Clone, Copy)]
pub struct LockManager;

impl LockManager {
    pub fn new() -> Self {
        Self
    }

    /// Block (polling) until the exclusive lock on `path`'s sentinel file
    /// is acquired or `timeout` elapses.
    pub fn acquire(&self, path: &Path, timeout: Duration) -> Result<LockHandle> {
        let sentinel_path = sentinel_path(path);
        if let Some(parent) = sentinel_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&sentinel_path)
            .map_err(|e| Error::io(&sentinel_path, e))?;

        let deadline = Instant::now() + timeout;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "acquired file lock");
                    return Ok(LockHandle {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(_) if Instant::now() < deadline => {
                    thread::sleep(POLL_INTERVAL);
                }
                Err(_) => {
                    return Err(Error::LockTimeout {
                        path: path.to_path_buf(),
                    });
                }
            }
        }
    }
}

fn sentinel_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.lock"))
}

/// RAII guard: releases the advisory lock when dropped, on every exit
/// path including early returns and panics during unwind.
pub struct LockHandle {
    file: File,
    path: PathBuf,
}

impl Drop for LockHandle {
    fn drop(&mut self) {
        if let Err(e) = fs2::FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release file lock");
        }
    }
}
