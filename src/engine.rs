//! Queue façade: contract operations plus the polling loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::backend::fs::FileBackend;
use crate::backend::memory::MemoryBackend;
use crate::backend::Backend;
use crate::clock::{Clock, SystemClock};
use crate::contract::Queue;
use crate::error::QueueError;
use crate::metrics::{MetricsSnapshot, QueueMetrics};
use crate::receipt::Receipt;

/// Coarse polling cadence for blocking receives. Deliberately not a
/// tight loop: availability is checked once per tick.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Uniform queue façade over a storage substrate.
///
/// All real state lives in the backend; the engine contributes the
/// polling/backoff loop, wait-deadline bookkeeping, batch policies, and
/// counters.
pub struct QueueEngine<B> {
    backend: B,
    metrics: QueueMetrics,
}

/// In-process queue. Contents do not survive the process.
pub type MemoryQueue<T, C = SystemClock> = QueueEngine<MemoryBackend<T, C>>;

/// Durable queue over a directory. Ready messages and live leases both
/// survive process restart.
pub type FileQueue<T, C = SystemClock> = QueueEngine<FileBackend<T, C>>;

impl<B> QueueEngine<B> {
    /// Wrap a substrate in the contract façade. The provided
    /// constructors cover the built-in backends; this is the seam for
    /// composing a custom [`Backend`].
    pub fn from_backend(backend: B) -> Self {
        Self {
            backend,
            metrics: QueueMetrics::new(),
        }
    }

    /// Current counter values.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl<T> QueueEngine<MemoryBackend<T, SystemClock>> {
    pub fn new() -> Self {
        Self::from_backend(MemoryBackend::new())
    }
}

impl<T> Default for QueueEngine<MemoryBackend<T, SystemClock>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Clock> QueueEngine<MemoryBackend<T, C>> {
    pub fn with_clock(clock: Arc<C>) -> Self {
        Self::from_backend(MemoryBackend::with_clock(clock))
    }
}

impl<T> QueueEngine<FileBackend<T, SystemClock>> {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from_backend(FileBackend::new(root))
    }
}

impl<T, C: Clock> QueueEngine<FileBackend<T, C>> {
    pub fn with_clock(root: impl Into<PathBuf>, clock: Arc<C>) -> Self {
        Self::from_backend(FileBackend::with_clock(root, clock))
    }
}

impl<B> QueueEngine<B> {
    async fn run_reclaim<T>(&self) -> Result<(), QueueError>
    where
        B: Backend<T>,
        T: Send + Sync + 'static,
    {
        let reclaimed = self.backend.reclaim_expired().await?;
        if reclaimed > 0 {
            self.metrics.record_reclaimed(reclaimed);
        }
        Ok(())
    }
}

#[async_trait]
impl<T, B> Queue<T> for QueueEngine<B>
where
    T: Send + Sync + 'static,
    B: Backend<T>,
{
    async fn send(&self, message: T) -> Result<(), QueueError> {
        self.backend.enqueue(&message).await?;
        self.metrics.record_sent(1);
        Ok(())
    }

    async fn send_batch(&self, messages: Vec<T>) -> Vec<T> {
        let mut failed = Vec::new();
        for message in messages {
            match self.backend.enqueue(&message).await {
                Ok(()) => self.metrics.record_sent(1),
                Err(e) => {
                    warn!(error = %e, "batch enqueue failed for one message");
                    failed.push(message);
                }
            }
        }
        failed
    }

    async fn receive(
        &self,
        visibility_timeout_secs: u64,
        wait_timeout_secs: u64,
    ) -> Result<(Receipt, T), QueueError> {
        self.run_reclaim::<T>().await?;

        let visibility = Duration::from_secs(visibility_timeout_secs);
        let deadline = Instant::now() + Duration::from_secs(wait_timeout_secs);
        loop {
            if let Some((receipt, message)) = self.backend.claim_oldest(visibility).await? {
                self.metrics.record_claimed();
                debug!(receipt = %receipt, "message claimed");
                return Ok((receipt, message));
            }
            if Instant::now() >= deadline {
                self.metrics.record_wait_timeout();
                return Err(QueueError::TimeoutExceeded);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn receive_batch(
        &self,
        count: usize,
        visibility_timeout_secs: u64,
        wait_timeout_secs: u64,
    ) -> Result<Vec<(Receipt, T)>, QueueError> {
        let visibility = Duration::from_secs(visibility_timeout_secs);
        let deadline = Instant::now() + Duration::from_secs(wait_timeout_secs);
        let mut claimed = Vec::new();

        while claimed.len() < count {
            self.run_reclaim::<T>().await?;
            match self.backend.claim_oldest(visibility).await? {
                Some((receipt, message)) => {
                    self.metrics.record_claimed();
                    claimed.push((receipt, message));
                }
                // Empty store with something already in hand: hand back
                // the partial batch instead of waiting out the window.
                None if !claimed.is_empty() => break,
                None => {
                    if Instant::now() >= deadline {
                        break;
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            }
        }
        Ok(claimed)
    }

    async fn remove(&self, receipt: &Receipt) -> Result<(), QueueError> {
        if self.backend.acknowledge(receipt).await? {
            self.metrics.record_acknowledged();
        } else {
            // Already acknowledged, or the lease expired and was
            // reclaimed; removal is idempotent either way.
            debug!(receipt = %receipt, "remove found no live lease");
        }
        Ok(())
    }

    async fn remove_batch(&self, receipts: Vec<Receipt>) -> Vec<Receipt> {
        let mut failed = Vec::new();
        for receipt in receipts {
            match self.backend.acknowledge(&receipt).await {
                Ok(true) => self.metrics.record_acknowledged(),
                Ok(false) => failed.push(receipt),
                Err(e) => {
                    warn!(receipt = %receipt, error = %e, "batch acknowledge failed");
                    failed.push(receipt);
                }
            }
        }
        failed
    }
}
