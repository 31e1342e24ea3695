//! Error types for queue operations.

use std::fmt;
use std::io;

/// Errors surfaced by the queue contract.
///
/// Benign races (a receipt already acknowledged or reclaimed by a
/// concurrent caller) are absorbed internally and never appear here.
#[derive(Debug)]
pub enum QueueError {
    /// A single `receive` waited out its full wait timeout with nothing
    /// delivered. Batch receive never raises this; it returns a short
    /// (possibly empty) batch instead.
    TimeoutExceeded,
    /// A stored payload could not be decoded.
    InvalidPayload { detail: String },
    /// A receipt that cannot possibly name a claim (empty, or containing
    /// characters that are unsafe in a filename).
    InvalidReceipt { receipt: String },
    /// Underlying storage medium failure.
    Io(io::Error),
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::TimeoutExceeded => write!(f, "wait timeout exceeded"),
            QueueError::InvalidPayload { detail } => {
                write!(f, "invalid payload: {}", detail)
            }
            QueueError::InvalidReceipt { receipt } => {
                write!(f, "invalid receipt: {:?}", receipt)
            }
            QueueError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for QueueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueueError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for QueueError {
    fn from(e: io::Error) -> Self {
        QueueError::Io(e)
    }
}
