//! Thread-safe handle to one session's tracker.
//!
//! The registry and win evaluator are read together during classification
//! and win evaluation, so the whole controller sits behind a single lock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::TrackerConfig;
use crate::controller::PlatformTracker;
use crate::error::Result;

/// Cloneable handle; every clone locks the same tracker.
///
/// Event subscribers run while this lock is held, so a subscriber must not
/// call [`SharedTracker::lock`] or [`SharedTracker::with`] on a handle to the
/// same tracker. The lock is not re-entrant and such a call deadlocks.
/// Record into an [`EventLog`] instead and read it after the call returns.
///
/// [`EventLog`]: crate::tracking::EventLog
#[derive(Debug, Clone)]
pub struct SharedTracker {
    inner: Arc<Mutex<PlatformTracker>>,
}

impl SharedTracker {
    pub fn new(tracker: PlatformTracker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    pub fn from_config(config: TrackerConfig) -> Result<Self> {
        Ok(Self::new(PlatformTracker::new(config)?))
    }

    /// Lock the tracker. A panic in another holder does not poison it for good.
    pub fn lock(&self) -> MutexGuard<'_, PlatformTracker> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access.
    pub fn with<R>(&self, f: impl FnOnce(&mut PlatformTracker) -> R) -> R {
        f(&mut self.lock())
    }
}
