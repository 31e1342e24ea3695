//! Time source for lease expiry and creation stamps.
//!
//! Backends take a clock handle at construction instead of reading wall
//! time through a global, so expiry behavior is testable without sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Supplies the current time as milliseconds since the Unix epoch.
pub trait Clock: Send + Sync + 'static {
    fn epoch_millis(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn epoch_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// A clock that only moves when told to. Intended for tests.
#[derive(Debug)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    pub fn new(epoch_millis: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(epoch_millis),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now_ms
            .fetch_add(by.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn set(&self, epoch_millis: u64) {
        self.now_ms.store(epoch_millis, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn epoch_millis(&self) -> u64 {
        self.now_ms.load(Ordering::Relaxed)
    }
}
