//! In-process backend: concurrent ready FIFO plus a lease table.

mod lease;
mod ready;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use self::lease::LeaseTable;
use self::ready::ReadyQueue;
use crate::backend::Backend;
use crate::clock::{Clock, SystemClock};
use crate::error::QueueError;
use crate::receipt::Receipt;

/// Volatile backend holding messages in process memory.
///
/// `T: Clone` because the lease table keeps the payload for redelivery
/// while the caller receives its own copy.
pub struct MemoryBackend<T, C = SystemClock> {
    ready: ReadyQueue<T>,
    leases: LeaseTable<T>,
    clock: Arc<C>,
}

impl<T> MemoryBackend<T> {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }
}

impl<T> Default for MemoryBackend<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Clock> MemoryBackend<T, C> {
    pub fn with_clock(clock: Arc<C>) -> Self {
        Self {
            ready: ReadyQueue::new(),
            leases: LeaseTable::new(),
            clock,
        }
    }
}

#[async_trait]
impl<T, C> Backend<T> for MemoryBackend<T, C>
where
    T: Clone + Send + Sync + 'static,
    C: Clock,
{
    async fn enqueue(&self, message: &T) -> Result<(), QueueError> {
        self.ready.push(message.clone());
        Ok(())
    }

    async fn claim_oldest(
        &self,
        visibility: Duration,
    ) -> Result<Option<(Receipt, T)>, QueueError> {
        let Some(message) = self.ready.try_pop_oldest() else {
            return Ok(None);
        };
        let expires_at_ms = self
            .clock
            .epoch_millis()
            .saturating_add(visibility.as_millis() as u64);
        let delivered = message.clone();
        let receipt = self.leases.claim(message, expires_at_ms);
        Ok(Some((receipt, delivered)))
    }

    async fn acknowledge(&self, receipt: &Receipt) -> Result<bool, QueueError> {
        Ok(self.leases.acknowledge(receipt))
    }

    async fn reclaim_expired(&self) -> Result<u64, QueueError> {
        let now_ms = self.clock.epoch_millis();
        Ok(self.leases.reclaim_expired_into(now_ms, &self.ready))
    }
}
