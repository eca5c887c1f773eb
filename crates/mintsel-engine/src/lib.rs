//! # mintsel-engine
//!
//! **Wallet-facing entry point** tying the planes together.
//!
//! ## Architecture
//!
//! 1. **Trust gate** (`mintsel-verify`): master signatures on every record
//! 2. **Compute plane** (`mintsel-select`): catalogs, selection, ranking
//! 3. **Engine**: configuration plus an injected clock over both
//!
//! ## Flow
//!
//! ```text
//! fetched Exchange → Engine::verify_exchange → Engine::catalog → Engine::select
//!                                          └→ Engine::rank / Engine::withdrawal_details
//! ```
//!
//! The engine performs no I/O. Exchanges arrive as snapshots; results are
//! plain values.

pub mod engine;
pub mod ops;

pub use engine::{Engine, WithdrawalDetails};
pub use ops::{build_catalog, rank, select, verify_denomination, verify_wire_account, verify_wire_fee_entry};
