//! deskq - locally-hosted message queue with visibility-timeout leases.
//!
//! Speaks the same contract as managed cloud queues (send/receive/remove,
//! single and batch, at-least-once delivery) for the environments where no
//! managed service exists: local development, embedded deployments,
//! offline testing.
//!
//! Two backends implement the [`Queue`] contract:
//!
//! - [`MemoryQueue`]: in-process concurrent structures, contents die with
//!   the process.
//! - [`FileQueue`]: one file per message under a directory, with atomic
//!   rename as the sole cross-process mutual-exclusion primitive; ready
//!   messages and live leases survive restart.
//!
//! ```no_run
//! use deskq::{MemoryQueue, Queue};
//!
//! # async fn demo() -> Result<(), deskq::QueueError> {
//! let queue = MemoryQueue::new();
//! queue.send("job".to_string()).await?;
//!
//! let (receipt, job) = queue.receive(30, 5).await?;
//! assert_eq!(job, "job");
//! queue.remove(&receipt).await?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod clock;
mod contract;
mod engine;
mod error;
mod metrics;
mod receipt;

#[cfg(test)]
mod tests;

pub use backend::fs::FileBackend;
pub use backend::memory::MemoryBackend;
pub use backend::Backend;
pub use clock::{Clock, ManualClock, SystemClock};
pub use contract::Queue;
pub use engine::{FileQueue, MemoryQueue, QueueEngine};
pub use error::QueueError;
pub use metrics::MetricsSnapshot;
pub use receipt::Receipt;
