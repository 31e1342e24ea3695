//! The uniform queue contract.
//!
//! Both local backends implement this trait through [`QueueEngine`], and
//! adapters to managed cloud queues are expected to implement the same
//! trait over their network protocol, so application code can swap a
//! hosted queue for a local one without changes.
//!
//! [`QueueEngine`]: crate::QueueEngine

use async_trait::async_trait;

use crate::error::QueueError;
use crate::receipt::Receipt;

/// At-least-once message queue with lease-based visibility timeouts.
///
/// Timeouts are whole seconds, matching the granularity managed queue
/// services expose. A claimed message stays hidden from other receivers
/// until its visibility timeout elapses or it is removed; an unremoved
/// claim is eventually redelivered under a fresh receipt.
#[async_trait]
pub trait Queue<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Enqueue one message.
    async fn send(&self, message: T) -> Result<(), QueueError>;

    /// Enqueue each message independently, returning the subset that
    /// failed to enqueue. Local backends do not partially fail under
    /// normal operation, so the result is usually empty.
    async fn send_batch(&self, messages: Vec<T>) -> Vec<T>;

    /// Claim the oldest available message, hiding it for
    /// `visibility_timeout_secs`. Polls until a message is available or
    /// `wait_timeout_secs` elapses, then fails with
    /// [`QueueError::TimeoutExceeded`].
    async fn receive(
        &self,
        visibility_timeout_secs: u64,
        wait_timeout_secs: u64,
    ) -> Result<(Receipt, T), QueueError>;

    /// Claim up to `count` messages. Returns as soon as the store runs
    /// empty with at least one message in hand; an empty store holds the
    /// call until something arrives or the wait window elapses. Unlike
    /// [`receive`](Queue::receive), an exhausted wait is not an error —
    /// the accumulated batch (possibly empty) is returned.
    async fn receive_batch(
        &self,
        count: usize,
        visibility_timeout_secs: u64,
        wait_timeout_secs: u64,
    ) -> Result<Vec<(Receipt, T)>, QueueError>;

    /// Acknowledge a claim, permanently removing its message. Idempotent:
    /// a receipt that is unknown (already removed, or reclaimed after its
    /// lease expired) is a silent no-op.
    async fn remove(&self, receipt: &Receipt) -> Result<(), QueueError>;

    /// Acknowledge each receipt independently, returning the subset that
    /// could not be acknowledged.
    async fn remove_batch(&self, receipts: Vec<Receipt>) -> Vec<Receipt>;
}
