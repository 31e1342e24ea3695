//! Per-engine counters with atomic updates for O(1) stats queries.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct QueueMetrics {
    sent: AtomicU64,
    claimed: AtomicU64,
    acknowledged: AtomicU64,
    reclaimed: AtomicU64,
    wait_timeouts: AtomicU64,
}

impl QueueMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_sent(&self, count: u64) {
        self.sent.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_claimed(&self) {
        self.claimed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_acknowledged(&self) {
        self.acknowledged.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_reclaimed(&self, count: u64) {
        self.reclaimed.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_wait_timeout(&self) {
        self.wait_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sent: self.sent.load(Ordering::Relaxed),
            claimed: self.claimed.load(Ordering::Relaxed),
            acknowledged: self.acknowledged.load(Ordering::Relaxed),
            reclaimed: self.reclaimed.load(Ordering::Relaxed),
            wait_timeouts: self.wait_timeouts.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of an engine's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Messages accepted by `send`/`send_batch`.
    pub sent: u64,
    /// Successful claims handed out by `receive`/`receive_batch`.
    pub claimed: u64,
    /// Leases removed through `remove`/`remove_batch`.
    pub acknowledged: u64,
    /// Expired leases returned to the ready store.
    pub reclaimed: u64,
    /// Single receives that waited out their full window.
    pub wait_timeouts: u64,
}
