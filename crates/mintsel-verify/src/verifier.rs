//! Master signature verification.
//!
//! Each `verify_*` function rebuilds the canonical signed message for a
//! record, runs the structural checks from [`crate::sanity`], checks the
//! Ed25519 signature against the exchange master key, and writes the outcome
//! back into the record's `verification_status`.
//!
//! `Failed` is sticky: a record that failed once is never re-checked within
//! the same snapshot. Only a freshly fetched snapshot can clear it.

use ed25519_dalek::Verifier;
use mintsel_types::{
    Denomination, EddsaSignature, Exchange, MasterPublicKey, MintselError, Result,
    VerificationStatus, WireAccount, WireFeeEntry,
};
use tracing::{debug, info, warn};

use crate::payload::{denomination_payload, wire_account_payload, wire_fee_payload};
use crate::sanity;

/// Check `signature` over `message` against the master key.
///
/// # Errors
/// `InvalidKey` if the master key is not a curve point, `VerificationFailed`
/// if the signature does not verify.
pub fn verify_master_signature(
    record: &str,
    message: &[u8],
    signature: &EddsaSignature,
    master_pub: &MasterPublicKey,
) -> Result<()> {
    let key = master_pub.to_verifying_key()?;
    key.verify(message, &signature.to_dalek())
        .map_err(|e| MintselError::VerificationFailed {
            record: record.to_string(),
            reason: e.to_string(),
        })
}

/// Run the structural check, then the signature check, logging whichever fails.
fn settle(
    record: &str,
    structure: Result<()>,
    signature: impl FnOnce() -> Result<()>,
) -> VerificationStatus {
    if let Err(e) = structure {
        debug!(record, error = %e, "record failed structural check");
        return VerificationStatus::Failed;
    }
    match signature() {
        Ok(()) => VerificationStatus::Verified,
        Err(e) => {
            warn!(record, error = %e, "master signature rejected");
            VerificationStatus::Failed
        }
    }
}

/// Verify a denomination's master signature and structure.
pub fn verify_denomination(d: &mut Denomination, master_pub: &MasterPublicKey) -> VerificationStatus {
    if d.verification_status == VerificationStatus::Failed {
        return VerificationStatus::Failed;
    }
    let record = sanity::denomination_label(d);
    d.verification_status = settle(&record, sanity::check_denomination(d, master_pub), || {
        verify_master_signature(&record, &denomination_payload(d), &d.master_sig, master_pub)
    });
    d.verification_status
}

/// Verify a wire fee entry's master signature and structure.
pub fn verify_wire_fee_entry(e: &mut WireFeeEntry, master_pub: &MasterPublicKey) -> VerificationStatus {
    if e.verification_status == VerificationStatus::Failed {
        return VerificationStatus::Failed;
    }
    let record = sanity::wire_fee_label(e);
    e.verification_status = settle(&record, sanity::check_wire_fee_entry(e), || {
        verify_master_signature(&record, &wire_fee_payload(e), &e.sig, master_pub)
    });
    e.verification_status
}

/// Verify a wire account's master signature.
pub fn verify_wire_account(a: &mut WireAccount, master_pub: &MasterPublicKey) -> VerificationStatus {
    if a.verification_status == VerificationStatus::Failed {
        return VerificationStatus::Failed;
    }
    let record = sanity::wire_account_label(a);
    a.verification_status = settle(&record, sanity::check_wire_account(a), || {
        verify_master_signature(&record, &wire_account_payload(&a.payto_uri), &a.master_sig, master_pub)
    });
    a.verification_status
}

/// Verified/failed counts for one kind of record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub verified: usize,
    pub failed: usize,
}

impl Tally {
    fn record(&mut self, status: VerificationStatus) {
        match status {
            VerificationStatus::Verified => self.verified += 1,
            VerificationStatus::Failed => self.failed += 1,
            VerificationStatus::Unverified => {}
        }
    }
}

/// Summary of verifying a whole exchange snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    pub exchange_base_url: String,
    pub denominations: Tally,
    pub wire_fees: Tally,
    pub wire_accounts: Tally,
}

impl VerificationReport {
    /// Total number of failed records.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.denominations.failed + self.wire_fees.failed + self.wire_accounts.failed
    }

    /// Whether every record verified.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }
}

/// Verify every record of an exchange snapshot against its master key.
///
/// Denominations and wire fee entries in a currency other than the
/// exchange's, and wire fee entries filed under a method other than their
/// own, are marked `Failed`.
pub fn verify_exchange(exchange: &mut Exchange) -> VerificationReport {
    let master_pub = exchange.master_public_key;
    let currency = exchange.currency.clone();
    let mut report = VerificationReport {
        exchange_base_url: exchange.base_url.clone(),
        ..VerificationReport::default()
    };

    for d in &mut exchange.denominations {
        if !d.value.currency().eq_ignore_ascii_case(&currency) {
            debug!(
                denom = %d.public_key_hash.short(),
                currency = d.value.currency(),
                expected = %currency,
                "denomination currency differs from exchange"
            );
            d.verification_status = VerificationStatus::Failed;
        }
        report.denominations.record(verify_denomination(d, &master_pub));
    }

    for (method, entries) in &mut exchange.wire_fees {
        for e in entries.iter_mut() {
            if e.wire_method != *method {
                debug!(listed = %method, actual = %e.wire_method, "wire fee filed under wrong method");
                e.verification_status = VerificationStatus::Failed;
            }
            if !e.wire_fee.currency().eq_ignore_ascii_case(&currency) {
                debug!(
                    method = %method,
                    currency = e.wire_fee.currency(),
                    expected = %currency,
                    "wire fee currency differs from exchange"
                );
                e.verification_status = VerificationStatus::Failed;
            }
            report.wire_fees.record(verify_wire_fee_entry(e, &master_pub));
        }
    }

    for a in &mut exchange.wire_accounts {
        report.wire_accounts.record(verify_wire_account(a, &master_pub));
    }

    info!(
        exchange = %report.exchange_base_url,
        denoms_ok = report.denominations.verified,
        denoms_failed = report.denominations.failed,
        fees_ok = report.wire_fees.verified,
        fees_failed = report.wire_fees.failed,
        accounts_ok = report.wire_accounts.verified,
        accounts_failed = report.wire_accounts.failed,
        "exchange verified"
    );
    report
}

#[cfg(test)]
mod tests {
    use mintsel_types::{Amount, Timestamp};

    use super::*;
    use crate::signer::MasterSigner;

    fn kudos(s: &str) -> Amount {
        Amount::parse(&format!("KUDOS:{s}")).unwrap()
    }

    fn signer() -> MasterSigner {
        MasterSigner::from_seed([7; 32])
    }

    #[test]
    fn signed_denomination_verifies() {
        let s = signer();
        let mut d = s.denomination("https://ex.test/", kudos("1"));
        assert_eq!(d.verification_status, VerificationStatus::Unverified);
        assert_eq!(verify_denomination(&mut d, &s.public_key()), VerificationStatus::Verified);
        assert_eq!(d.verification_status, VerificationStatus::Verified);
    }

    #[test]
    fn tampered_value_fails() {
        let s = signer();
        let mut d = s.denomination("https://ex.test/", kudos("1"));
        d.value = kudos("100");
        assert_eq!(verify_denomination(&mut d, &s.public_key()), VerificationStatus::Failed);
    }

    #[test]
    fn tampered_fee_fails() {
        let s = signer();
        let mut d = s.denomination("https://ex.test/", kudos("1"));
        d.fee_withdraw = kudos("0.5");
        assert_eq!(verify_denomination(&mut d, &s.public_key()), VerificationStatus::Failed);
    }

    #[test]
    fn wrong_master_key_fails() {
        let s = signer();
        let other = MasterSigner::from_seed([8; 32]);
        let mut d = s.denomination("https://ex.test/", kudos("1"));
        assert_eq!(verify_denomination(&mut d, &other.public_key()), VerificationStatus::Failed);
    }

    #[test]
    fn signature_from_other_key_fails() {
        let s = signer();
        let other = MasterSigner::from_seed([8; 32]);
        let mut d = s.denomination("https://ex.test/", kudos("1"));
        d.master_sig = other.sign(&denomination_payload(&d));
        assert_eq!(verify_denomination(&mut d, &s.public_key()), VerificationStatus::Failed);
    }

    #[test]
    fn failed_is_sticky() {
        let s = signer();
        let mut d = s.denomination("https://ex.test/", kudos("1"));
        let good_value = d.value.clone();
        d.value = kudos("3");
        assert_eq!(verify_denomination(&mut d, &s.public_key()), VerificationStatus::Failed);
        d.value = good_value;
        assert_eq!(verify_denomination(&mut d, &s.public_key()), VerificationStatus::Failed);
    }

    #[test]
    fn revocation_does_not_affect_signature() {
        let s = signer();
        let mut d = s.denomination("https://ex.test/", kudos("1"));
        d.is_revoked = true;
        assert_eq!(verify_denomination(&mut d, &s.public_key()), VerificationStatus::Verified);
    }

    #[test]
    fn invalid_master_point_fails_without_panic() {
        let s = signer();
        let mut d = s.denomination("https://ex.test/", kudos("1"));
        // Force the sanity check to pass so the key decode is reached.
        let bogus = MasterPublicKey::from_bytes([0xFF; 32]);
        d.exchange_master_pub = bogus;
        assert_eq!(verify_denomination(&mut d, &bogus), VerificationStatus::Failed);
    }

    #[test]
    fn wire_fee_entry_roundtrip() {
        let s = signer();
        let mut e = s.wire_fee("iban", Timestamp::from_secs(0), Timestamp::from_secs(100), &kudos("0.2"));
        assert_eq!(verify_wire_fee_entry(&mut e, &s.public_key()), VerificationStatus::Verified);

        let mut tampered = s.wire_fee("iban", Timestamp::from_secs(0), Timestamp::from_secs(100), &kudos("0.2"));
        tampered.end_stamp = Timestamp::from_secs(200);
        assert_eq!(verify_wire_fee_entry(&mut tampered, &s.public_key()), VerificationStatus::Failed);
    }

    #[test]
    fn wire_account_roundtrip() {
        let s = signer();
        let mut a = s.wire_account("payto://iban/DE89370400440532013000");
        assert_eq!(verify_wire_account(&mut a, &s.public_key()), VerificationStatus::Verified);
        a.payto_uri = "payto://iban/DE00000000000000000000".into();
        a.verification_status = VerificationStatus::Unverified;
        assert_eq!(verify_wire_account(&mut a, &s.public_key()), VerificationStatus::Failed);
    }

    #[test]
    fn exchange_report_counts() {
        let s = signer();
        let mut ex = s.exchange("https://ex.test/", "KUDOS");
        ex.denominations.push(s.denomination("https://ex.test/", kudos("1")));
        ex.denominations.push(s.denomination("https://ex.test/", kudos("2")));
        let mut bad = s.denomination("https://ex.test/", kudos("4"));
        bad.master_sig = EddsaSignature([1; 64]);
        ex.denominations.push(bad);
        ex.wire_fees.insert(
            "iban".into(),
            vec![s.wire_fee("iban", Timestamp::from_secs(0), Timestamp::from_secs(10), &kudos("0.1"))],
        );
        ex.wire_accounts.push(s.wire_account("payto://iban/DE1"));

        let report = verify_exchange(&mut ex);
        assert_eq!(report.denominations, Tally { verified: 2, failed: 1 });
        assert_eq!(report.wire_fees, Tally { verified: 1, failed: 0 });
        assert_eq!(report.wire_accounts, Tally { verified: 1, failed: 0 });
        assert_eq!(report.failed(), 1);
        assert!(!report.is_clean());
        assert_eq!(ex.denominations[2].verification_status, VerificationStatus::Failed);
    }

    #[test]
    fn foreign_currency_denomination_fails() {
        let s = signer();
        let mut ex = s.exchange("https://ex.test/", "KUDOS");
        ex.denominations.push(s.denomination("https://ex.test/", Amount::parse("EUR:1").unwrap()));
        let report = verify_exchange(&mut ex);
        assert_eq!(report.denominations.failed, 1);
    }

    #[test]
    fn misfiled_wire_fee_fails() {
        let s = signer();
        let mut ex = s.exchange("https://ex.test/", "KUDOS");
        ex.wire_fees.insert(
            "x-taler-bank".into(),
            vec![s.wire_fee("iban", Timestamp::from_secs(0), Timestamp::from_secs(10), &kudos("0.1"))],
        );
        let report = verify_exchange(&mut ex);
        assert_eq!(report.wire_fees.failed, 1);
    }

    #[test]
    fn foreign_currency_wire_fee_fails() {
        let s = signer();
        let mut ex = s.exchange("https://ex.test/", "KUDOS");
        let eur = Amount::parse("EUR:0.1").unwrap();
        ex.wire_fees.insert(
            "iban".into(),
            vec![
                s.wire_fee("iban", Timestamp::from_secs(0), Timestamp::from_secs(10), &eur),
                s.wire_fee("iban", Timestamp::from_secs(10), Timestamp::from_secs(20), &kudos("0.1")),
            ],
        );
        let report = verify_exchange(&mut ex);
        assert_eq!(report.wire_fees, Tally { verified: 1, failed: 1 });
        assert_eq!(ex.wire_fees["iban"][0].verification_status, VerificationStatus::Failed);
    }

    #[test]
    fn lower_case_exchange_currency_verifies() {
        let s = signer();
        let mut ex = s.exchange("https://ex.test/", "KUDOS");
        ex.denominations.push(s.denomination("https://ex.test/", kudos("1")));
        ex.wire_fees.insert(
            "iban".into(),
            vec![s.wire_fee("iban", Timestamp::from_secs(0), Timestamp::from_secs(10), &kudos("0.1"))],
        );
        let json = serde_json::to_string(&ex).unwrap().replace("\"currency\":\"KUDOS\"", "\"currency\":\"kudos\"");
        assert!(json.contains("\"kudos\""));
        let mut reloaded = Exchange::from_json(&json).unwrap();
        assert!(verify_exchange(&mut reloaded).is_clean());

        ex.currency = "kudos".to_string();
        assert!(verify_exchange(&mut ex).is_clean());
    }

    #[test]
    fn snapshot_json_survives_verification() {
        let s = signer();
        let mut ex = s.exchange("https://ex.test/", "KUDOS");
        ex.denominations.push(s.denomination("https://ex.test/", kudos("1")));
        let json = serde_json::to_string(&ex).unwrap();
        let mut reloaded = Exchange::from_json(&json).unwrap();
        assert!(verify_exchange(&mut reloaded).is_clean());
    }
}
