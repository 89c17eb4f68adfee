//! Single-instance run lock

use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use nodectl_errors::{Error, OpsError, PlatformError};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Exclusive advisory lock held for the duration of a mutating run.
///
/// The lock file records the holder's PID. Dropping the guard releases the
/// lock; the file itself is left in place.
pub struct RunLock {
    path: PathBuf,
    _file: Flock<File>,
}

impl RunLock {
    /// Take the lock without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::AlreadyRunning`] when another process holds the
    /// lock, or [`PlatformError::LockFailed`] when the file cannot be opened
    /// or written.
    pub fn acquire(path: &Path) -> Result<Self, Error> {
        let lock_failed = |message: String| PlatformError::LockFailed {
            path: path.display().to_string(),
            message,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| lock_failed(e.to_string()))?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| lock_failed(e.to_string()))?;

        let mut file = match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(locked) => locked,
            Err((mut file, Errno::EWOULDBLOCK)) => {
                let mut holder = String::new();
                let _ = file.read_to_string(&mut holder);
                let holder_pid = match holder.trim() {
                    "" => "unknown".to_string(),
                    pid => pid.to_string(),
                };
                tracing::warn!(path = %path.display(), holder = %holder_pid, "run lock held");
                return Err(OpsError::AlreadyRunning { holder_pid }.into());
            }
            Err((_, errno)) => return Err(lock_failed(errno.to_string()).into()),
        };

        file.set_len(0)
            .and_then(|()| file.seek(SeekFrom::Start(0)))
            .and_then(|_| writeln!(file, "{}", std::process::id()))
            .and_then(|()| file.flush())
            .map_err(|e| lock_failed(e.to_string()))?;

        tracing::debug!(path = %path.display(), "run lock acquired");
        Ok(Self {
            path: path.to_path_buf(),
            _file: file,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for RunLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLock").field("path", &self.path).finish()
    }
}
