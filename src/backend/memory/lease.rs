//! In-memory lease tracker.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use super::ready::ReadyQueue;
use crate::receipt::Receipt;

struct Lease<T> {
    expires_at_ms: u64,
    message: T,
}

/// Expiry hint for a claim. Hints outlive their leases: a hint whose
/// receipt was already acknowledged is stale and is dropped at
/// reclamation time by checking live-map membership.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct ExpiryHint {
    expires_at_ms: u64,
    receipt: Receipt,
}

/// Claimed-but-unacknowledged messages, keyed by receipt.
///
/// The live map removal is the ownership-transfer primitive: whichever
/// caller removes a receipt first (acknowledge or reclaim) owns the
/// outcome, and the loser sees a plain miss.
pub(crate) struct LeaseTable<T> {
    live: DashMap<Receipt, Lease<T>>,
    expiry_hints: Mutex<BinaryHeap<Reverse<ExpiryHint>>>,
}

impl<T> LeaseTable<T> {
    pub fn new() -> Self {
        Self {
            live: DashMap::new(),
            expiry_hints: Mutex::new(BinaryHeap::new()),
        }
    }

    /// Record a claim under a freshly minted receipt. Always succeeds.
    pub fn claim(&self, message: T, expires_at_ms: u64) -> Receipt {
        let receipt = Receipt::mint();
        self.live.insert(
            receipt.clone(),
            Lease {
                expires_at_ms,
                message,
            },
        );
        self.expiry_hints.lock().push(Reverse(ExpiryHint {
            expires_at_ms,
            receipt: receipt.clone(),
        }));
        receipt
    }

    /// Remove a live lease. `false` when the receipt is unknown.
    pub fn acknowledge(&self, receipt: &Receipt) -> bool {
        self.live.remove(receipt).is_some()
    }

    /// Move every expired lease back into `ready` (tail append), dropping
    /// stale hints along the way. Returns the number reclaimed.
    pub fn reclaim_expired_into(&self, now_ms: u64, ready: &ReadyQueue<T>) -> u64 {
        let mut reclaimed = 0;
        loop {
            let hint = {
                let mut hints = self.expiry_hints.lock();
                match hints.peek() {
                    Some(Reverse(hint)) if hint.expires_at_ms <= now_ms => {
                        hints.pop().map(|Reverse(hint)| hint)
                    }
                    _ => break,
                }
            };
            let Some(hint) = hint else { break };

            // The record's own expiry is authoritative; the hint only says
            // where to look. Losing this removal to a concurrent
            // acknowledge (or another reclaimer) just means the hint was
            // stale.
            if let Some((receipt, lease)) = self
                .live
                .remove_if(&hint.receipt, |_, lease| lease.expires_at_ms <= now_ms)
            {
                debug!(receipt = %receipt, "lease expired, message returned to ready store");
                ready.push(lease.message);
                reclaimed += 1;
            }
        }
        reclaimed
    }
}
