//! Wire accounts and time-sliced wire fee schedules.

use serde::{Deserialize, Serialize};

use crate::{Amount, EddsaSignature, Timestamp, VerificationStatus};

/// Which fee of a wire fee entry applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireFeeKind {
    /// Charged per aggregated wire transfer to a merchant.
    Wire,
    /// Charged when a reserve is closed and wired back.
    Closing,
    /// Charged per wad transfer between exchanges.
    Wad,
}

/// One slice of a wire method's fee schedule, valid on `[start_stamp, end_stamp)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFeeEntry {
    /// Wire method this entry prices, e.g. `iban` or `x-taler-bank`.
    pub wire_method: String,
    pub start_stamp: Timestamp,
    pub end_stamp: Timestamp,
    pub wire_fee: Amount,
    pub closing_fee: Amount,
    pub wad_fee: Amount,
    pub sig: EddsaSignature,
    #[serde(default)]
    pub verification_status: VerificationStatus,
}

impl WireFeeEntry {
    /// The fee of the given kind.
    #[must_use]
    pub fn fee(&self, kind: WireFeeKind) -> &Amount {
        match kind {
            WireFeeKind::Wire => &self.wire_fee,
            WireFeeKind::Closing => &self.closing_fee,
            WireFeeKind::Wad => &self.wad_fee,
        }
    }

    /// Whether `t` falls inside `[start_stamp, end_stamp)`.
    #[must_use]
    pub fn covers(&self, t: Timestamp) -> bool {
        self.start_stamp <= t && t < self.end_stamp
    }

    /// Whether the two entries' windows intersect.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_stamp < other.end_stamp && other.start_stamp < self.end_stamp
    }
}

/// A bank account the exchange accepts wire transfers on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAccount {
    pub payto_uri: String,
    pub master_sig: EddsaSignature,
    #[serde(default)]
    pub verification_status: VerificationStatus,
}

impl WireAccount {
    /// The wire method encoded in the payto URI (`payto://iban/...` → `iban`).
    #[must_use]
    pub fn wire_method(&self) -> Option<&str> {
        let rest = self.payto_uri.strip_prefix("payto://")?;
        let method = rest.split('/').next()?;
        (!method.is_empty()).then_some(method)
    }
}

/// Dummy wire records for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl WireFeeEntry {
    /// A verified entry on `[start, end)` with every fee set to `fee`.
    pub fn dummy(method: &str, start: Timestamp, end: Timestamp, fee: &Amount) -> Self {
        Self {
            wire_method: method.to_string(),
            start_stamp: start,
            end_stamp: end,
            wire_fee: fee.clone(),
            closing_fee: fee.clone(),
            wad_fee: fee.clone(),
            sig: EddsaSignature([0u8; 64]),
            verification_status: VerificationStatus::Verified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(start: u64, end: u64) -> WireFeeEntry {
        WireFeeEntry::dummy(
            "iban",
            Timestamp::from_secs(start),
            Timestamp::from_secs(end),
            &Amount::parse("KUDOS:0.01").unwrap(),
        )
    }

    #[test]
    fn covers_is_half_open() {
        let e = entry(10, 20);
        assert!(!e.covers(Timestamp::from_secs(9)));
        assert!(e.covers(Timestamp::from_secs(10)));
        assert!(e.covers(Timestamp::from_secs(19)));
        assert!(!e.covers(Timestamp::from_secs(20)));
    }

    #[test]
    fn adjacent_entries_do_not_overlap() {
        assert!(!entry(10, 20).overlaps(&entry(20, 30)));
        assert!(entry(10, 21).overlaps(&entry(20, 30)));
    }

    #[test]
    fn fee_kind_selects_field() {
        let mut e = entry(0, 1);
        e.closing_fee = Amount::parse("KUDOS:0.5").unwrap();
        assert_eq!(e.fee(WireFeeKind::Closing).to_string(), "KUDOS:0.5");
        assert_eq!(e.fee(WireFeeKind::Wad).to_string(), "KUDOS:0.01");
    }

    #[test]
    fn payto_wire_method() {
        let acc = WireAccount {
            payto_uri: "payto://iban/DE89370400440532013000".into(),
            master_sig: EddsaSignature([0; 64]),
            verification_status: VerificationStatus::Unverified,
        };
        assert_eq!(acc.wire_method(), Some("iban"));
        let bad = WireAccount {
            payto_uri: "mailto:x".into(),
            ..acc
        };
        assert_eq!(bad.wire_method(), None);
    }
}
