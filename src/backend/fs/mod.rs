//! Crash-recoverable backend over a plain directory.
//!
//! One file per ready message under `<root>`, one file per claimed
//! message under `<root>/inflight`. The only cross-process
//! mutual-exclusion primitive is atomic rename: a claim or reclamation
//! happens iff its rename succeeds, and a rename whose source vanished
//! means a concurrent caller won — a benign outcome, resolved by
//! re-listing. An advisory mutex additionally serializes renames issued
//! by this process so local callers don't contend through the filesystem.

mod names;

use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use self::names::{lease_file_name, parse_lease_name, parse_ready_stamp, ready_file_name};
use crate::backend::Backend;
use crate::clock::{Clock, SystemClock};
use crate::error::QueueError;
use crate::receipt::Receipt;

const INFLIGHT_DIR: &str = "inflight";

/// Durable backend rooted at a directory. Payloads are stored as JSON
/// bodies; lease metadata lives entirely in in-flight filenames, so a
/// restarted process picks up where the dead one left off.
pub struct FileBackend<T, C = SystemClock> {
    root: PathBuf,
    inflight: PathBuf,
    /// Serializes renames within this process; cross-process exclusion
    /// comes from rename atomicity alone.
    rename_lock: Mutex<()>,
    /// Last creation stamp handed out, in nanosecond scale. Advanced to
    /// max(now, last + 1) so stamps are strictly monotonic even when the
    /// clock stalls within a millisecond.
    last_stamp: AtomicU64,
    clock: Arc<C>,
    _payload: PhantomData<fn() -> T>,
}

impl<T> FileBackend<T> {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_clock(root, Arc::new(SystemClock))
    }
}

impl<T, C: Clock> FileBackend<T, C> {
    pub fn with_clock(root: impl Into<PathBuf>, clock: Arc<C>) -> Self {
        let root = root.into();
        let inflight = root.join(INFLIGHT_DIR);
        Self {
            root,
            inflight,
            rename_lock: Mutex::new(()),
            last_stamp: AtomicU64::new(0),
            clock,
            _payload: PhantomData,
        }
    }

    /// Directories are created lazily so constructing a handle over a
    /// not-yet-existing root is cheap and infallible.
    async fn ensure_dirs(&self) -> Result<(), QueueError> {
        tokio::fs::create_dir_all(&self.inflight).await?;
        Ok(())
    }

    fn next_stamp(&self) -> u64 {
        let now_ns = self.clock.epoch_millis().saturating_mul(1_000_000);
        let mut last = self.last_stamp.load(Ordering::Relaxed);
        loop {
            let next = now_ns.max(last + 1);
            match self.last_stamp.compare_exchange_weak(
                last,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(observed) => last = observed,
            }
        }
    }

    /// Rename under the advisory lock, treating a vanished source as the
    /// race it is. `Ok(false)` = a concurrent caller moved it first.
    fn try_rename(&self, from: &Path, to: &Path) -> Result<bool, QueueError> {
        let _guard = self.rename_lock.lock();
        match std::fs::rename(from, to) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Numerically smallest ready stamp and its path, or `None` if the
    /// ready area is empty.
    async fn oldest_ready(&self) -> Result<Option<PathBuf>, QueueError> {
        let mut dir = tokio::fs::read_dir(&self.root).await?;
        let mut oldest: Option<(u64, PathBuf)> = None;
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(stamp) = parse_ready_stamp(name) else {
                continue;
            };
            if oldest.as_ref().map_or(true, |(s, _)| stamp < *s) {
                oldest = Some((stamp, entry.path()));
            }
        }
        Ok(oldest.map(|(_, path)| path))
    }

    /// Earliest-expiring in-flight entry: (expiry, path).
    async fn earliest_lease(&self) -> Result<Option<(u64, PathBuf)>, QueueError> {
        let mut dir = tokio::fs::read_dir(&self.inflight).await?;
        let mut earliest: Option<(u64, PathBuf)> = None;
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some((expires_at_ms, _)) = parse_lease_name(name) else {
                continue;
            };
            if earliest.as_ref().map_or(true, |(e, _)| expires_at_ms < *e) {
                earliest = Some((expires_at_ms, entry.path()));
            }
        }
        Ok(earliest)
    }

    /// Find the in-flight file belonging to a receipt, if still present.
    async fn lease_path(&self, receipt: &Receipt) -> Result<Option<PathBuf>, QueueError> {
        let mut dir = tokio::fs::read_dir(&self.inflight).await?;
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some((_, parsed)) = parse_lease_name(name) {
                if parsed == *receipt {
                    return Ok(Some(entry.path()));
                }
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl<T, C> Backend<T> for FileBackend<T, C>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
    C: Clock,
{
    async fn enqueue(&self, message: &T) -> Result<(), QueueError> {
        self.ensure_dirs().await?;
        let body = serde_json::to_vec(message).map_err(|e| QueueError::InvalidPayload {
            detail: e.to_string(),
        })?;

        // Stage under a name the ready scan ignores, then publish with an
        // atomic rename so readers never observe a partial payload.
        let final_path = self.root.join(ready_file_name(self.next_stamp()));
        let tmp_path = final_path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, body).await?;
        {
            let _guard = self.rename_lock.lock();
            std::fs::rename(&tmp_path, &final_path)?;
        }
        Ok(())
    }

    async fn claim_oldest(
        &self,
        visibility: Duration,
    ) -> Result<Option<(Receipt, T)>, QueueError> {
        self.ensure_dirs().await?;
        loop {
            let Some(path) = self.oldest_ready().await? else {
                return Ok(None);
            };

            let receipt = Receipt::mint();
            let expires_at_ms = self
                .clock
                .epoch_millis()
                .saturating_add(visibility.as_millis() as u64);
            let target = self.inflight.join(lease_file_name(expires_at_ms, &receipt));

            if !self.try_rename(&path, &target)? {
                // Another claimer moved it between listing and renaming.
                debug!(path = %path.display(), "ready file vanished mid-claim, re-listing");
                continue;
            }

            let body = tokio::fs::read(&target).await?;
            let message =
                serde_json::from_slice(&body).map_err(|e| {
                    warn!(receipt = %receipt, error = %e, "claimed payload failed to decode");
                    QueueError::InvalidPayload {
                        detail: e.to_string(),
                    }
                })?;
            return Ok(Some((receipt, message)));
        }
    }

    async fn acknowledge(&self, receipt: &Receipt) -> Result<bool, QueueError> {
        if !receipt.is_filename_safe() {
            return Err(QueueError::InvalidReceipt {
                receipt: receipt.as_str().to_string(),
            });
        }
        self.ensure_dirs().await?;
        let Some(path) = self.lease_path(receipt).await? else {
            return Ok(false);
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            // Reclaimed or acknowledged by a racer after we listed it.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn reclaim_expired(&self) -> Result<u64, QueueError> {
        self.ensure_dirs().await?;
        let mut reclaimed = 0;
        loop {
            let Some((expires_at_ms, path)) = self.earliest_lease().await? else {
                return Ok(reclaimed);
            };
            if expires_at_ms > self.clock.epoch_millis() {
                return Ok(reclaimed);
            }

            // Back to the ready area under a fresh stamp: the message
            // re-enters at the tail, not at its original rank.
            let target = self.root.join(ready_file_name(self.next_stamp()));
            if self.try_rename(&path, &target)? {
                debug!(path = %path.display(), "expired lease returned to ready store");
                reclaimed += 1;
            }
        }
    }
}
