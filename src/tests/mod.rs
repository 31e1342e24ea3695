//! Engine test suite.
//!
//! Shared setup helpers live here; scenarios are split into focused
//! modules:
//! - `core`: contract basics against the in-memory backend
//! - `batch`: batch send/receive/remove policies
//! - `visibility`: lease expiry and reclamation
//! - `races`: concurrent callers, mutual exclusion
//! - `durable`: filesystem backend, restart recovery, on-disk layout

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use crate::{FileQueue, ManualClock, MemoryQueue, Queue, QueueError, Receipt};

/// Arbitrary real-looking epoch base for manual clocks.
const T0_MS: u64 = 1_700_000_000_000;

fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(T0_MS))
}

fn memory() -> MemoryQueue<Value> {
    MemoryQueue::new()
}

fn memory_at(clock: Arc<ManualClock>) -> MemoryQueue<Value, ManualClock> {
    MemoryQueue::with_clock(clock)
}

fn durable(dir: &tempfile::TempDir) -> FileQueue<Value> {
    FileQueue::new(dir.path())
}

fn durable_at(dir: &tempfile::TempDir, clock: Arc<ManualClock>) -> FileQueue<Value, ManualClock> {
    FileQueue::with_clock(dir.path(), clock)
}

fn payload(n: i64) -> Value {
    json!({ "n": n })
}

fn n_of(message: &Value) -> i64 {
    message["n"].as_i64().unwrap()
}

mod races;
