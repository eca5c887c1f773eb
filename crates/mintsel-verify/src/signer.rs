//! A throwaway exchange master key for building signed fixtures.
//!
//! Only compiled for tests and under the `test-helpers` feature.
//! **Never use in production.**

use ed25519_dalek::{Signer, SigningKey};
use mintsel_types::{
    Amount, Denomination, EddsaSignature, Exchange, MasterPublicKey, Timestamp,
    VerificationStatus, WireAccount, WireFeeEntry,
};

use crate::payload::{denomination_payload, wire_account_payload, wire_fee_payload};

/// Signs records the way an exchange's offline master key would.
pub struct MasterSigner {
    key: SigningKey,
}

impl MasterSigner {
    /// Deterministic signer from a 32-byte seed.
    #[must_use]
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(&seed),
        }
    }

    /// Signer with a fresh random key.
    #[must_use]
    pub fn generate() -> Self {
        Self::from_seed(rand::random())
    }

    #[must_use]
    pub fn public_key(&self) -> MasterPublicKey {
        MasterPublicKey::from(self.key.verifying_key())
    }

    /// Sign an arbitrary message.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> EddsaSignature {
        EddsaSignature::from(self.key.sign(message))
    }

    /// Claim `d` for this key and sign it. Resets its status to `Unverified`.
    pub fn sign_denomination(&self, d: &mut Denomination) {
        d.exchange_master_pub = self.public_key();
        d.master_sig = self.sign(&denomination_payload(d));
        d.verification_status = VerificationStatus::Unverified;
    }

    /// Sign `e`. Resets its status to `Unverified`.
    pub fn sign_wire_fee(&self, e: &mut WireFeeEntry) {
        e.sig = self.sign(&wire_fee_payload(e));
        e.verification_status = VerificationStatus::Unverified;
    }

    /// A signed, offered, never-expiring denomination with zero fees.
    #[must_use]
    pub fn denomination(&self, base_url: &str, value: Amount) -> Denomination {
        let mut d = Denomination::dummy(base_url, self.public_key(), value);
        self.sign_denomination(&mut d);
        d
    }

    /// A signed denomination with every fee set to `fee`.
    #[must_use]
    pub fn denomination_with_fee(&self, base_url: &str, value: Amount, fee: &Amount) -> Denomination {
        let mut d = Denomination::dummy(base_url, self.public_key(), value).with_uniform_fee(fee);
        self.sign_denomination(&mut d);
        d
    }

    /// A signed wire fee entry on `[start, end)` with every fee set to `fee`.
    #[must_use]
    pub fn wire_fee(&self, method: &str, start: Timestamp, end: Timestamp, fee: &Amount) -> WireFeeEntry {
        let mut e = WireFeeEntry::dummy(method, start, end, fee);
        self.sign_wire_fee(&mut e);
        e
    }

    /// A signed wire account.
    #[must_use]
    pub fn wire_account(&self, payto_uri: &str) -> WireAccount {
        WireAccount {
            payto_uri: payto_uri.to_string(),
            master_sig: self.sign(&wire_account_payload(payto_uri)),
            verification_status: VerificationStatus::Unverified,
        }
    }

    /// An empty exchange owned by this key, with accepted terms.
    #[must_use]
    pub fn exchange(&self, base_url: &str, currency: &str) -> Exchange {
        Exchange::dummy(base_url, currency, self.public_key())
    }
}

impl std::fmt::Debug for MasterSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MasterSigner({:?})", self.public_key())
    }
}
