//! Daemon pid file guarded by an advisory lock
//!
//! The daemon holds an exclusive `flock` on its pid file for as long as it
//! runs. Admin tools only trust the recorded pid while that lock is held,
//! so a file left behind by a crashed daemon is never mistaken for a live
//! process.

use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum PidFileError {
    #[error("focusgated is already running (pid {})", display_pid(.0))]
    AlreadyRunning(Option<i32>),

    #[error("Failed to lock pid file: {0}")]
    Lock(Errno),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

fn display_pid(pid: &Option<i32>) -> String {
    pid.map_or_else(|| "unknown".to_string(), |pid| pid.to_string())
}

/// Pid file locked by the running daemon. Removed on drop.
pub struct PidFile {
    path: PathBuf,
    _lock: Flock<File>,
}

impl PidFile {
    /// Lock `path` and record the current pid in it.
    ///
    /// Fails with `AlreadyRunning` if another process holds the lock.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, PidFileError> {
        let path = path.into();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let mut lock = match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(lock) => lock,
            Err((mut file, errno)) if errno == Errno::EWOULDBLOCK => {
                return Err(PidFileError::AlreadyRunning(read_pid(&mut file)));
            }
            Err((_, errno)) => return Err(PidFileError::Lock(errno)),
        };

        lock.set_len(0)?;
        lock.write_all(std::process::id().to_string().as_bytes())?;
        lock.sync_all()?;

        debug!(path = %path.display(), "Pid file locked");
        Ok(Self { path, _lock: lock })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(error = %e, path = %self.path.display(), "Failed to remove pid file");
        }
    }
}

/// Pid of the daemon currently holding the lock on `path`.
///
/// `None` when the file is missing or nobody holds its lock (stale file).
pub fn running_pid(path: &Path) -> Result<Option<i32>, PidFileError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    match Flock::lock(file, FlockArg::LockSharedNonblock) {
        Ok(_unheld) => {
            debug!(path = %path.display(), "Pid file is not locked, ignoring it");
            Ok(None)
        }
        Err((mut file, errno)) if errno == Errno::EWOULDBLOCK => Ok(read_pid(&mut file)),
        Err((_, errno)) => Err(PidFileError::Lock(errno)),
    }
}

fn read_pid(file: &mut File) -> Option<i32> {
    let mut contents = String::new();
    file.read_to_string(&mut contents).ok()?;
    contents.trim().parse().ok()
}
