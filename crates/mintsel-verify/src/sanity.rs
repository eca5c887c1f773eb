//! Structural checks that run before any signature is verified.
//!
//! A record that fails here is marked `Failed` without touching the
//! signature: it cannot be valid no matter who signed it.

use mintsel_types::{
    Denomination, MasterPublicKey, MintselError, Result, Timestamp, WireAccount, WireFeeEntry,
};

/// Label used in `VerificationFailed.record` for a denomination.
pub(crate) fn denomination_label(d: &Denomination) -> String {
    format!("denomination {}", d.public_key_hash.short())
}

/// Label used in `VerificationFailed.record` for a wire fee entry.
pub(crate) fn wire_fee_label(e: &WireFeeEntry) -> String {
    format!("wire fee {}@{}", e.wire_method, e.start_stamp)
}

/// Label used in `VerificationFailed.record` for a wire account.
pub(crate) fn wire_account_label(a: &WireAccount) -> String {
    format!("wire account {}", a.payto_uri)
}

fn fail(record: String, reason: impl Into<String>) -> MintselError {
    MintselError::VerificationFailed {
        record,
        reason: reason.into(),
    }
}

/// Validate a denomination's structure against the key that must have signed it.
///
/// # Errors
/// `VerificationFailed` naming the first violated rule.
pub fn check_denomination(d: &Denomination, master_pub: &MasterPublicKey) -> Result<()> {
    if d.exchange_master_pub != *master_pub {
        return Err(fail(denomination_label(d), "master key differs from the exchange's"));
    }
    if !d.has_ordered_validity() {
        return Err(fail(denomination_label(d), "validity stamps out of order"));
    }
    let stamps = [
        d.stamp_start,
        d.stamp_expire_withdraw,
        d.stamp_expire_deposit,
        d.stamp_expire_legal,
    ];
    if !stamps.into_iter().all(Timestamp::is_signable) {
        return Err(fail(denomination_label(d), "validity stamp beyond the signable range"));
    }
    if d.fees().iter().any(|fee| !fee.same_currency(&d.value)) {
        return Err(fail(denomination_label(d), "fee currency differs from value currency"));
    }
    if d.value.is_zero() {
        return Err(fail(denomination_label(d), "zero face value"));
    }
    if d.denom_pub.hash() != d.public_key_hash {
        return Err(fail(denomination_label(d), "public key hash does not match key"));
    }
    Ok(())
}

/// Validate a wire fee entry's structure.
///
/// # Errors
/// `VerificationFailed` naming the first violated rule.
pub fn check_wire_fee_entry(e: &WireFeeEntry) -> Result<()> {
    if e.start_stamp >= e.end_stamp {
        return Err(fail(wire_fee_label(e), "empty or inverted validity interval"));
    }
    if !e.start_stamp.is_signable() || !e.end_stamp.is_signable() {
        return Err(fail(wire_fee_label(e), "validity stamp beyond the signable range"));
    }
    if !e.closing_fee.same_currency(&e.wire_fee) || !e.wad_fee.same_currency(&e.wire_fee) {
        return Err(fail(wire_fee_label(e), "fee amounts use different currencies"));
    }
    Ok(())
}

/// Validate a wire account's structure.
///
/// # Errors
/// `VerificationFailed` if the payto URI carries no wire method.
pub fn check_wire_account(a: &WireAccount) -> Result<()> {
    if a.wire_method().is_none() {
        return Err(fail(wire_account_label(a), "malformed payto URI"));
    }
    Ok(())
}
