//! On-disk name codec.
//!
//! Ready files: `{creation_stamp:020}.json`, stamp strictly increasing so
//! directory order is arrival order. In-flight files:
//! `{expiry_ms:020}-{receipt}.json` — the filename is the whole lease
//! record, which is what lets leases survive a process restart without a
//! separate index.

use crate::receipt::Receipt;

pub(crate) const PAYLOAD_EXT: &str = "json";

pub(crate) fn ready_file_name(stamp: u64) -> String {
    format!("{stamp:020}.{PAYLOAD_EXT}")
}

pub(crate) fn lease_file_name(expires_at_ms: u64, receipt: &Receipt) -> String {
    format!("{expires_at_ms:020}-{receipt}.{PAYLOAD_EXT}")
}

/// Parse a ready filename back to its creation stamp. Foreign files
/// (tmp staging files, editor droppings) parse to `None` and are skipped
/// by directory scans.
pub(crate) fn parse_ready_stamp(name: &str) -> Option<u64> {
    let stem = name.strip_suffix(".json")?;
    if stem.contains('-') {
        return None;
    }
    stem.parse().ok()
}

/// Parse an in-flight filename into its lease record.
pub(crate) fn parse_lease_name(name: &str) -> Option<(u64, Receipt)> {
    let stem = name.strip_suffix(".json")?;
    let (expiry, receipt) = stem.split_once('-')?;
    if receipt.is_empty() {
        return None;
    }
    Some((expiry.parse().ok()?, Receipt::from_handle(receipt)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_names_round_trip() {
        let name = ready_file_name(42);
        assert_eq!(name, "00000000000000000042.json");
        assert_eq!(parse_ready_stamp(&name), Some(42));
    }

    #[test]
    fn foreign_files_are_skipped() {
        assert_eq!(parse_ready_stamp("00000000000000000042.json.tmp"), None);
        assert_eq!(parse_ready_stamp("notes.txt"), None);
        assert_eq!(parse_ready_stamp("inflight"), None);
        assert_eq!(parse_lease_name("00000000000000000042.json"), None);
        assert_eq!(parse_lease_name("x-y.json"), None);
    }

    #[test]
    fn lease_names_round_trip() {
        let receipt = Receipt::from_handle("abc-def");
        let name = lease_file_name(1_000, &receipt);
        let (expiry, parsed) = parse_lease_name(&name).unwrap();
        assert_eq!(expiry, 1_000);
        // Receipts may themselves contain dashes; only the first one
        // separates expiry from receipt.
        assert_eq!(parsed, receipt);
    }
}
