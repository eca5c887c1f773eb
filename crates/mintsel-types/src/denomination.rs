//! Denominations: the coin values an exchange is willing to mint.
//!
//! ## Lifecycle
//!
//! ```text
//!   published ──▶ Unverified ──verify──▶ Verified ──(key rotation)──▶ superseded
//!                     │
//!                     └──verify──▶ Failed   (sticky for the snapshot)
//! ```
//!
//! Revocation flips `is_revoked`; revoked denominations stay in the history
//! because already-withdrawn coins may still need to be refunded before
//! `stamp_expire_legal`.

use serde::{Deserialize, Serialize};

use crate::keys::hex_vec;
use crate::{Amount, EddsaSignature, HashCode, MasterPublicKey, Operation, Timestamp};

/// Outcome of checking a record's master signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VerificationStatus {
    /// Not checked yet.
    #[default]
    Unverified,
    /// Signature and structure check out.
    Verified,
    /// Signature or structure is bad. Never retried within a snapshot.
    Failed,
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unverified => write!(f, "UNVERIFIED"),
            Self::Verified => write!(f, "VERIFIED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Which per-coin fee of a denomination applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeeKind {
    Withdraw,
    Deposit,
    Refresh,
    Refund,
}

/// The blind-signature public key of a denomination, tagged by cipher.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "cipher", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenominationPublicKey {
    /// RSA blind signatures; `public_key` is the DER-encoded key.
    Rsa {
        age_mask: u32,
        #[serde(with = "hex_vec")]
        public_key: Vec<u8>,
    },
    /// Clause-Schnorr blind signatures over Curve25519.
    ClauseSchnorr {
        age_mask: u32,
        #[serde(with = "hex_vec")]
        public_key: Vec<u8>,
    },
}

impl DenominationPublicKey {
    /// Numeric cipher tag used in the key hash.
    #[must_use]
    pub fn cipher_tag(&self) -> u32 {
        match self {
            Self::Rsa { .. } => 1,
            Self::ClauseSchnorr { .. } => 2,
        }
    }

    /// `SHA-512(cipher_tag || age_mask || key_bytes)`, big-endian integers.
    #[must_use]
    pub fn hash(&self) -> HashCode {
        let (age_mask, key) = match self {
            Self::Rsa {
                age_mask,
                public_key,
            }
            | Self::ClauseSchnorr {
                age_mask,
                public_key,
            } => (*age_mask, public_key),
        };
        let mut buf = Vec::with_capacity(8 + key.len());
        buf.extend_from_slice(&self.cipher_tag().to_be_bytes());
        buf.extend_from_slice(&age_mask.to_be_bytes());
        buf.extend_from_slice(key);
        HashCode::digest(&buf)
    }
}

/// A coin denomination published by an exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Denomination {
    /// Hash of `denom_pub`; the denomination's identity.
    pub public_key_hash: HashCode,
    /// The blind-signature key itself.
    pub denom_pub: DenominationPublicKey,
    pub exchange_base_url: String,
    /// Master key the exchange claims signed this record.
    pub exchange_master_pub: MasterPublicKey,
    /// Face value of one coin.
    pub value: Amount,
    pub fee_withdraw: Amount,
    pub fee_deposit: Amount,
    pub fee_refresh: Amount,
    pub fee_refund: Amount,
    pub stamp_start: Timestamp,
    pub stamp_expire_withdraw: Timestamp,
    pub stamp_expire_deposit: Timestamp,
    pub stamp_expire_legal: Timestamp,
    pub is_offered: bool,
    pub is_revoked: bool,
    pub master_sig: EddsaSignature,
    #[serde(default)]
    pub verification_status: VerificationStatus,
}

impl Denomination {
    /// The fee of the given kind.
    #[must_use]
    pub fn fee(&self, kind: FeeKind) -> &Amount {
        match kind {
            FeeKind::Withdraw => &self.fee_withdraw,
            FeeKind::Deposit => &self.fee_deposit,
            FeeKind::Refresh => &self.fee_refresh,
            FeeKind::Refund => &self.fee_refund,
        }
    }

    /// All four fees, in signing order.
    #[must_use]
    pub fn fees(&self) -> [&Amount; 4] {
        [
            &self.fee_withdraw,
            &self.fee_deposit,
            &self.fee_refresh,
            &self.fee_refund,
        ]
    }

    /// `start <= expire_withdraw <= expire_deposit <= expire_legal`.
    #[must_use]
    pub fn has_ordered_validity(&self) -> bool {
        self.stamp_start <= self.stamp_expire_withdraw
            && self.stamp_expire_withdraw <= self.stamp_expire_deposit
            && self.stamp_expire_deposit <= self.stamp_expire_legal
    }

    /// The last instant at which a coin of this denomination may be used
    /// for `operation`.
    #[must_use]
    pub fn window_end(&self, operation: Operation) -> Timestamp {
        match operation {
            Operation::Withdraw => self.stamp_expire_withdraw,
            Operation::Spend | Operation::Refresh => self.stamp_expire_deposit,
        }
    }

    /// Usability predicate:
    /// `offered ∧ ¬revoked ∧ verified ∧ start <= t <= window_end(operation)`.
    #[must_use]
    pub fn is_usable_at(&self, t: Timestamp, operation: Operation) -> bool {
        self.is_offered
            && !self.is_revoked
            && self.verification_status == VerificationStatus::Verified
            && self.stamp_start <= t
            && t <= self.window_end(operation)
    }
}

/// Dummy denomination for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Denomination {
    /// A verified, offered RSA denomination with zero fees that is valid
    /// from the epoch until `NEVER`. The key material is random.
    pub fn dummy(exchange_base_url: &str, master_pub: MasterPublicKey, value: Amount) -> Self {
        let denom_pub = DenominationPublicKey::Rsa {
            age_mask: 0,
            public_key: rand::random::<[u8; 32]>().to_vec(),
        };
        let zero = value.zero_like();
        Self {
            public_key_hash: denom_pub.hash(),
            denom_pub,
            exchange_base_url: exchange_base_url.to_string(),
            exchange_master_pub: master_pub,
            fee_withdraw: zero.clone(),
            fee_deposit: zero.clone(),
            fee_refresh: zero.clone(),
            fee_refund: zero,
            value,
            stamp_start: Timestamp::from_secs(0),
            stamp_expire_withdraw: Timestamp::NEVER,
            stamp_expire_deposit: Timestamp::NEVER,
            stamp_expire_legal: Timestamp::NEVER,
            is_offered: true,
            is_revoked: false,
            master_sig: EddsaSignature([0u8; 64]),
            verification_status: VerificationStatus::Verified,
        }
    }

    /// Set all four fees to `fee`.
    #[must_use]
    pub fn with_uniform_fee(mut self, fee: &Amount) -> Self {
        self.fee_withdraw = fee.clone();
        self.fee_deposit = fee.clone();
        self.fee_refresh = fee.clone();
        self.fee_refund = fee.clone();
        self
    }

    /// Set the validity window.
    #[must_use]
    pub fn with_window(
        mut self,
        start: Timestamp,
        expire_withdraw: Timestamp,
        expire_deposit: Timestamp,
        expire_legal: Timestamp,
    ) -> Self {
        self.stamp_start = start;
        self.stamp_expire_withdraw = expire_withdraw;
        self.stamp_expire_deposit = expire_deposit;
        self.stamp_expire_legal = expire_legal;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kudos(s: &str) -> Amount {
        Amount::parse(&format!("KUDOS:{s}")).unwrap()
    }

    fn make_denom() -> Denomination {
        Denomination::dummy("https://exchange.test/", MasterPublicKey::from_bytes([1; 32]), kudos("4"))
            .with_window(
                Timestamp::from_secs(100),
                Timestamp::from_secs(200),
                Timestamp::from_secs(300),
                Timestamp::from_secs(400),
            )
    }

    #[test]
    fn usable_inside_withdraw_window() {
        let d = make_denom();
        assert!(!d.is_usable_at(Timestamp::from_secs(99), Operation::Withdraw));
        assert!(d.is_usable_at(Timestamp::from_secs(100), Operation::Withdraw));
        assert!(d.is_usable_at(Timestamp::from_secs(200), Operation::Withdraw));
        assert!(!d.is_usable_at(Timestamp::from_secs(201), Operation::Withdraw));
    }

    #[test]
    fn spend_uses_deposit_window() {
        let d = make_denom();
        assert!(d.is_usable_at(Timestamp::from_secs(250), Operation::Spend));
        assert!(d.is_usable_at(Timestamp::from_secs(300), Operation::Refresh));
        assert!(!d.is_usable_at(Timestamp::from_secs(301), Operation::Spend));
    }

    #[test]
    fn usability_is_monotone_back_to_start() {
        let d = make_denom();
        for op in [Operation::Withdraw, Operation::Spend] {
            for t in 100..=300 {
                let t = Timestamp::from_secs(t);
                if d.is_usable_at(t, op) {
                    for earlier in 100..=t.as_secs() {
                        assert!(d.is_usable_at(Timestamp::from_secs(earlier), op));
                    }
                }
            }
        }
    }

    #[test]
    fn revoked_unverified_or_unoffered_is_unusable() {
        let t = Timestamp::from_secs(150);
        let mut d = make_denom();
        d.is_revoked = true;
        assert!(!d.is_usable_at(t, Operation::Withdraw));

        let mut d = make_denom();
        d.is_offered = false;
        assert!(!d.is_usable_at(t, Operation::Withdraw));

        let mut d = make_denom();
        d.verification_status = VerificationStatus::Failed;
        assert!(!d.is_usable_at(t, Operation::Spend));

        let mut d = make_denom();
        d.verification_status = VerificationStatus::Unverified;
        assert!(!d.is_usable_at(t, Operation::Spend));
    }

    #[test]
    fn validity_ordering() {
        let mut d = make_denom();
        assert!(d.has_ordered_validity());
        d.stamp_expire_deposit = Timestamp::from_secs(150);
        assert!(!d.has_ordered_validity());
    }

    #[test]
    fn fee_kind_selects_field() {
        let mut d = make_denom();
        d.fee_refresh = kudos("0.03");
        assert_eq!(d.fee(FeeKind::Refresh), &kudos("0.03"));
        assert!(d.fee(FeeKind::Withdraw).is_zero());
    }

    #[test]
    fn key_hash_depends_on_cipher() {
        let rsa = DenominationPublicKey::Rsa { age_mask: 0, public_key: vec![1, 2, 3] };
        let cs = DenominationPublicKey::ClauseSchnorr { age_mask: 0, public_key: vec![1, 2, 3] };
        assert_ne!(rsa.hash(), cs.hash());
        assert_eq!(rsa.hash(), rsa.clone().hash());
    }

    #[test]
    fn serde_roundtrip() {
        let d = make_denom();
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"cipher\":\"RSA\""));
        assert!(json.contains("\"feeWithdraw\":\"KUDOS:0\""));
        let back: Denomination = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
