//! Storage substrates behind the engine façade.
//!
//! Each backend provides one atomic "ownership transfer" primitive — a
//! map removal in memory, a filesystem rename on disk — and reports a
//! transfer already won by a concurrent caller as a non-error (`None` /
//! `false`), never as a failure.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::QueueError;
use crate::receipt::Receipt;

pub mod fs;
pub mod memory;

/// Substrate contract composed by [`QueueEngine`](crate::QueueEngine).
#[async_trait]
pub trait Backend<T>: Send + Sync {
    /// Append a message to the ready store.
    async fn enqueue(&self, message: &T) -> Result<(), QueueError>;

    /// Atomically move the oldest ready message in flight under a fresh
    /// receipt, or report the store empty. No two concurrent callers ever
    /// obtain the same message.
    async fn claim_oldest(
        &self,
        visibility: Duration,
    ) -> Result<Option<(Receipt, T)>, QueueError>;

    /// Remove a live lease. `false` means the receipt was not found,
    /// which legitimately happens when the lease already expired and was
    /// reclaimed, or a racer acknowledged it first.
    async fn acknowledge(&self, receipt: &Receipt) -> Result<bool, QueueError>;

    /// Return every currently-expired lease to the ready store (at the
    /// tail — redelivery does not keep the original arrival rank).
    /// Reports how many messages were reclaimed.
    async fn reclaim_expired(&self) -> Result<u64, QueueError>;
}
