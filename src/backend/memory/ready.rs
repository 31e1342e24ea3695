//! In-memory ready store.

use crossbeam::queue::SegQueue;

/// Unbounded concurrent FIFO of not-yet-claimed messages.
///
/// `pop` hands each message to exactly one caller, which is the mutual
/// exclusion the claim path relies on.
pub(crate) struct ReadyQueue<T> {
    inner: SegQueue<T>,
}

impl<T> ReadyQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: SegQueue::new(),
        }
    }

    /// Append at the tail. Never blocks, never fails.
    pub fn push(&self, message: T) {
        self.inner.push(message);
    }

    /// Remove and return the oldest message, if any.
    pub fn try_pop_oldest(&self) -> Option<T> {
        self.inner.pop()
    }
}
