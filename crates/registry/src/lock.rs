//! Cross-process exclusive lock on `.treb/.lock` for the whole apply
//! sequence (§4.9, §5: "taken under a wall-clock timeout, default 30s;
//! `ErrRegistryBusy` on expiry").

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::time::{Duration, Instant};

use fs4::FileExt;

use crate::error::{RegistryError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct RegistryLock {
    file: File,
    path: String,
}

impl RegistryLock {
    /// Blocks (polling) until the lock is acquired or `timeout` elapses.
    pub fn acquire(lock_path: &Path, timeout: Duration) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).create(true).open(lock_path)?;
        let deadline = Instant::now() + timeout;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(Self { file, path: lock_path.display().to_string() }),
                Err(_) if Instant::now() < deadline => std::thread::sleep(POLL_INTERVAL),
                Err(_) => {
                    return Err(RegistryError::Busy { path: lock_path.display().to_string(), timeout_secs: timeout.as_secs() });
                }
            }
        }
    }
}

impl Drop for RegistryLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = &self.path;
    }
}
