//! Selection fingerprints.
//!
//! Two wallets (or a wallet and its replay log) that run the same selection
//! over the same snapshot must arrive at the same coins. The digest is a
//! SHA-256 over the picks in order, cheap to store and compare.

use mintsel_types::SelectionResult;
use sha2::{Digest, Sha256};

/// Compute the fingerprint of a selection.
///
/// Depends on, in order: each pick's public key hash and count, the target,
/// the total value, the total fee and the coin count.
#[must_use]
pub fn selection_digest(result: &SelectionResult) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"mintsel:selection:v1:");
    hasher.update((result.picks.len() as u64).to_le_bytes());

    for pick in &result.picks {
        hasher.update(pick.denomination.public_key_hash.as_bytes());
        hasher.update(pick.count.to_le_bytes());
    }
    hasher.update(result.target.to_string().as_bytes());
    hasher.update(result.total_value.to_string().as_bytes());
    hasher.update(result.total_fee.to_string().as_bytes());
    hasher.update(result.coin_count.to_le_bytes());

    let out = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&out);
    digest
}

/// Hex form of [`selection_digest`], for logs and persisted records.
#[must_use]
pub fn selection_digest_hex(result: &SelectionResult) -> String {
    hex::encode(selection_digest(result))
}

/// Whether `expected` is the fingerprint of `result`.
#[must_use]
pub fn verify_selection_digest(result: &SelectionResult, expected: &[u8; 32]) -> bool {
    selection_digest(result) == *expected
}
