//! # mintsel-types
//!
//! Shared types, errors, and configuration for the **Mintsel** exchange
//! verification and denomination selection engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Money**: [`Amount`], exact fixed-point with a base of 10^8
//! - **Time**: [`Timestamp`], [`Clock`], [`SystemClock`], [`FixedClock`]
//! - **Keys**: [`EddsaPublicKey`], [`EddsaSignature`], [`HashCode`]
//! - **Denomination model**: [`Denomination`], [`DenominationPublicKey`], [`FeeKind`], [`VerificationStatus`]
//! - **Wire model**: [`WireFeeEntry`], [`WireAccount`], [`WireFeeKind`]
//! - **Exchange model**: [`Exchange`], [`TermsOfService`], [`TosStatus`], [`AuditorRef`]
//! - **Selection model**: [`Operation`], [`SelectionRequest`], [`SelectionOutcome`], [`SelectionResult`]
//! - **Configuration**: [`EngineConfig`], [`SelectionConfig`], [`CatalogConfig`], [`RankingConfig`]
//! - **Errors**: [`MintselError`] with `MS_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod amount;
pub mod config;
pub mod constants;
pub mod denomination;
pub mod error;
pub mod exchange;
pub mod keys;
pub mod selection;
pub mod time;
pub mod wire;

pub use amount::*;
pub use config::*;
pub use denomination::*;
pub use error::*;
pub use exchange::*;
pub use keys::{EddsaPublicKey, EddsaSignature, HashCode, MasterPublicKey};
pub use selection::*;
pub use time::*;
pub use wire::*;

// Constants are accessed via `mintsel_types::constants::FOO`
// (not re-exported to avoid name collisions).
