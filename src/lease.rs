//! Exclusive leases over a cache directory.
//!
//! A [`CacheLease`] serializes every mutation of one cache directory.
//! In-process callers queue on a mutex; with [`LeaseMode::Advisory`] the
//! holder additionally takes an exclusive advisory lock on
//! `<dir>/.moon.lock`, so separate processes sharing the directory exclude
//! each other too.
//!
//! Waiting is bounded per call. A caller that gives up waiting never
//! touches the lease it was waiting for; the current holder finishes and
//! releases normally.

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::{MoonError, Result};

/// Name of the advisory lock file inside the cache directory.
pub const LOCK_FILE_NAME: &str = ".moon.lock";

const INITIAL_BACKOFF: Duration = Duration::from_millis(5);
const MAX_BACKOFF: Duration = Duration::from_millis(100);

/// How exclusivity is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseMode {
    /// Mutex only; correct when one process owns the directory.
    InProcess,
    /// Mutex plus an advisory file lock; correct across processes.
    #[default]
    Advisory,
}

/// Exclusive access to one cache directory.
#[derive(Debug)]
pub struct CacheLease {
    scope: PathBuf,
    mode: LeaseMode,
    local: Mutex<()>,
}

/// Held while the lease is owned. Dropping it releases the lease.
#[derive(Debug)]
pub struct LeaseGuard<'a> {
    file: Option<File>,
    _local: MutexGuard<'a, ()>,
}

impl Drop for LeaseGuard<'_> {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(e) = FileExt::unlock(&file) {
                warn!("Failed to release cache lock: {}", e);
            }
        }
    }
}

impl CacheLease {
    /// Create a lease scoped to `dir`.
    pub fn new(dir: impl Into<PathBuf>, mode: LeaseMode) -> Self {
        Self {
            scope: dir.into(),
            mode,
            local: Mutex::new(()),
        }
    }

    /// The directory this lease protects.
    pub fn scope(&self) -> &Path {
        &self.scope
    }

    /// How exclusivity is enforced.
    pub fn mode(&self) -> LeaseMode {
        self.mode
    }

    /// Path of the advisory lock file.
    pub fn lock_path(&self) -> PathBuf {
        self.scope.join(LOCK_FILE_NAME)
    }

    /// Block until the lease is acquired.
    pub fn acquire(&self) -> Result<LeaseGuard<'_>> {
        let local = self.local.lock().unwrap_or_else(PoisonError::into_inner);
        let file = match self.mode {
            LeaseMode::InProcess => None,
            LeaseMode::Advisory => {
                let file = self.open_lock_file()?;
                file.lock_exclusive()?;
                Some(file)
            }
        };
        debug!("Acquired cache lease on {:?}", self.scope);
        Ok(LeaseGuard {
            file,
            _local: local,
        })
    }

    /// Acquire the lease if nobody holds it right now.
    pub fn try_acquire(&self) -> Result<Option<LeaseGuard<'_>>> {
        let local = match self.local.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Ok(None),
        };
        let file = match self.mode {
            LeaseMode::InProcess => None,
            LeaseMode::Advisory => {
                let file = self.open_lock_file()?;
                match file.try_lock_exclusive() {
                    Ok(()) => {}
                    Err(e) if is_contended(&e) => return Ok(None),
                    Err(e) => return Err(e.into()),
                }
                Some(file)
            }
        };
        Ok(Some(LeaseGuard {
            file,
            _local: local,
        }))
    }

    /// Acquire the lease, waiting at most `wait` (forever when `None`).
    ///
    /// Polls with exponential backoff once the first attempt fails.
    pub fn acquire_within(&self, wait: Option<Duration>) -> Result<LeaseGuard<'_>> {
        let Some(wait) = wait else {
            return self.acquire();
        };

        let started = Instant::now();
        let mut backoff = INITIAL_BACKOFF;
        loop {
            if let Some(guard) = self.try_acquire()? {
                return Ok(guard);
            }
            let waited = started.elapsed();
            if waited >= wait {
                debug!("Gave up waiting for cache lease after {:.2?}", waited);
                return Err(MoonError::LeaseUnavailable { waited });
            }
            std::thread::sleep(backoff.min(wait - waited));
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    fn open_lock_file(&self) -> Result<File> {
        fs::create_dir_all(&self.scope)?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;
        Ok(file)
    }
}

/// Whether a failed `try_lock_exclusive` means another holder has the lock.
fn is_contended(err: &io::Error) -> bool {
    err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
        || err.kind() == io::ErrorKind::WouldBlock
}
