//! Canonical signed byte layouts.
//!
//! Every master-signed record is verified over the same shape of message:
//!
//! ```text
//! ┌──────────────┬──────────────┬───────────────────────────┐
//! │ size: u32 BE │ purpose: u32 │ fields (fixed order)      │
//! └──────────────┴──────────────┴───────────────────────────┘
//! ```
//!
//! `size` counts the whole message including the 8-byte header. Amounts are
//! `value u64 BE || fraction u32 BE || currency (12 bytes, zero padded)`;
//! timestamps are big-endian microseconds.

use mintsel_types::constants::{
    PURPOSE_MASTER_DENOMINATION_KEY_VALIDITY, PURPOSE_MASTER_WIRE_DETAILS,
    PURPOSE_MASTER_WIRE_FEES,
};
use mintsel_types::{Amount, Denomination, HashCode, Timestamp, WireFeeEntry};

/// Byte width of the encoded currency field.
const CURRENCY_FIELD_LEN: usize = 12;

/// Accumulates the fields of a signed message.
#[derive(Debug)]
pub struct SignaturePurposeBuilder {
    purpose: u32,
    body: Vec<u8>,
}

impl SignaturePurposeBuilder {
    #[must_use]
    pub fn new(purpose: u32) -> Self {
        Self {
            purpose,
            body: Vec::with_capacity(256),
        }
    }

    #[must_use]
    pub fn put(mut self, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(bytes);
        self
    }

    #[must_use]
    pub fn put_timestamp(self, ts: Timestamp) -> Self {
        self.put(&ts.to_signed_bytes())
    }

    #[must_use]
    pub fn put_amount(self, amount: &Amount) -> Self {
        self.put(&encode_amount(amount))
    }

    /// Prepend the header and return the message.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let total = self.body.len() + 8;
        let mut out = Vec::with_capacity(total);
        // Records are a few hundred bytes; the length always fits.
        #[allow(clippy::cast_possible_truncation)]
        out.extend_from_slice(&(total as u32).to_be_bytes());
        out.extend_from_slice(&self.purpose.to_be_bytes());
        out.extend_from_slice(&self.body);
        out
    }
}

/// Encode an amount into its 24-byte signed form.
#[must_use]
pub fn encode_amount(amount: &Amount) -> [u8; 24] {
    let mut out = [0u8; 24];
    out[..8].copy_from_slice(&amount.value().to_be_bytes());
    out[8..12].copy_from_slice(&amount.fraction().to_be_bytes());
    let currency = amount.currency().as_bytes();
    // Currency codes are at most 11 bytes, leaving a terminating zero.
    let len = currency.len().min(CURRENCY_FIELD_LEN - 1);
    out[12..12 + len].copy_from_slice(&currency[..len]);
    out
}

/// Message signed by the master key for a denomination.
#[must_use]
pub fn denomination_payload(d: &Denomination) -> Vec<u8> {
    SignaturePurposeBuilder::new(PURPOSE_MASTER_DENOMINATION_KEY_VALIDITY)
        .put(d.exchange_master_pub.as_bytes())
        .put_timestamp(d.stamp_start)
        .put_timestamp(d.stamp_expire_withdraw)
        .put_timestamp(d.stamp_expire_deposit)
        .put_timestamp(d.stamp_expire_legal)
        .put_amount(&d.value)
        .put_amount(&d.fee_withdraw)
        .put_amount(&d.fee_deposit)
        .put_amount(&d.fee_refresh)
        .put_amount(&d.fee_refund)
        .put(d.public_key_hash.as_bytes())
        .build()
}

/// Message signed by the master key for a wire fee entry.
#[must_use]
pub fn wire_fee_payload(e: &WireFeeEntry) -> Vec<u8> {
    SignaturePurposeBuilder::new(PURPOSE_MASTER_WIRE_FEES)
        .put(HashCode::digest_zero_terminated(&e.wire_method).as_bytes())
        .put_timestamp(e.start_stamp)
        .put_timestamp(e.end_stamp)
        .put_amount(&e.wire_fee)
        .put_amount(&e.closing_fee)
        .put_amount(&e.wad_fee)
        .build()
}

/// Message signed by the master key for a wire account.
#[must_use]
pub fn wire_account_payload(payto_uri: &str) -> Vec<u8> {
    SignaturePurposeBuilder::new(PURPOSE_MASTER_WIRE_DETAILS)
        .put(&HashCode::digest_zero_terminated(payto_uri).truncated())
        .build()
}
