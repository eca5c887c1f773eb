//! # mintsel-select
//!
//! **Pure deterministic selection for Mintsel.**
//!
//! This crate is the compute plane: it takes verified exchange snapshots and
//! produces fee resolutions, coin selections and exchange rankings. It has:
//!
//! - **Zero side effects**: no I/O, no clock reads, no shared state
//! - **Deterministic output**: same snapshot and reference time -> same coins
//! - **Bounded work**: the dynamic-programming fallback has a state budget
//!
//! ## Pipeline
//!
//! ```text
//! Exchange ─▶ DenominationCatalog::build ─▶ DenominationSelector::select ─▶ SelectionOutcome
//!     │                                  └▶ plan_withdrawal ─▶ WithdrawalPlan
//!     │                                  └▶ total_refresh_cost ─▶ Amount
//!     └▶ fee_schedule::resolve ─▶ ResolvedFee
//! [Exchange] ─▶ ExchangeRanker::rank ─▶ RankedList
//! ```

pub mod catalog;
pub mod digest;
pub mod fee_schedule;
pub mod planner;
pub mod ranker;
pub mod selector;

pub use catalog::DenominationCatalog;
pub use digest::{selection_digest, selection_digest_hex, verify_selection_digest};
pub use fee_schedule::{ResolvedFee, ScheduleIssue, ScheduleWarning, Span, audit_schedule, resolve};
pub use planner::{WithdrawalPlan, plan_withdrawal, total_refresh_cost};
pub use ranker::{ExchangeRanker, RankedExchange, RankedList, Score, UnusableExchange};
pub use selector::DenominationSelector;
