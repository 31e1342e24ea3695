//! Claim receipts.

use std::fmt;

use uuid::Uuid;

/// Opaque token identifying one claim instance.
///
/// A fresh receipt is minted on every successful claim; the same message
/// claimed twice over its lifetime (lease expired, reclaimed, claimed
/// again) carries two different receipts. String-backed rather than a
/// uuid type so that managed-queue adapters can pass their native receipt
/// handles through the same contract.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Receipt(String);

impl Receipt {
    /// Mint a fresh receipt for a new claim.
    pub(crate) fn mint() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an externally issued receipt handle.
    pub fn from_handle(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this receipt can safely appear as a filename component.
    /// Locally minted receipts always pass; adapter handles and caller
    /// input may not.
    pub(crate) fn is_filename_safe(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
