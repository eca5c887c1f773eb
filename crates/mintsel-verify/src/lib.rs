//! # mintsel-verify
//!
//! **Trust gate**: nothing an exchange publishes is used before its master
//! signature has been checked.
//!
//! ## Architecture
//!
//! 1. **payload**: rebuilds the exact byte message the master key signed
//! 2. **sanity**: structural checks that fail a record without touching crypto
//! 3. **verifier**: Ed25519 verification and the sticky `Failed` status
//! 4. **signer** (tests / `test-helpers` only): produces signed fixtures
//!
//! ## Flow
//!
//! ```text
//! Exchange snapshot → sanity::check_* → payload::*_payload
//!     → ed25519 verify(master_pub) → verification_status = Verified | Failed
//! ```
//!
//! Only `Verified` records are visible to catalog construction and fee
//! resolution downstream.

pub mod payload;
pub mod sanity;
#[cfg(any(test, feature = "test-helpers"))]
pub mod signer;
pub mod verifier;

#[cfg(any(test, feature = "test-helpers"))]
pub use signer::MasterSigner;
pub use verifier::{
    verify_denomination, verify_exchange, verify_wire_account, verify_wire_fee_entry, Tally,
    VerificationReport,
};
