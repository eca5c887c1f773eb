//! Error types for the Mintsel engine.
//!
//! All errors use the `MS_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Amount arithmetic errors
//! - 2xx: Verification errors
//! - 3xx: Fee schedule errors
//! - 4xx: Selection errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{InfeasibleReason, Timestamp};

/// Central error enum for all Mintsel operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MintselError {
    // =================================================================
    // Amount Errors (1xx)
    // =================================================================
    /// Two amounts with different currencies were combined or compared.
    #[error("MS_ERR_100: Currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    /// The result exceeds the largest representable amount.
    #[error("MS_ERR_101: Amount overflow")]
    Overflow,

    /// A subtraction would produce a negative amount.
    #[error("MS_ERR_102: Negative amount")]
    NegativeAmount,

    /// The amount string or components are malformed.
    #[error("MS_ERR_103: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    // =================================================================
    // Verification Errors (2xx)
    // =================================================================
    /// A signed record failed verification and was excluded.
    #[error("MS_ERR_200: Verification failed for {record}: {reason}")]
    VerificationFailed { record: String, reason: String },

    /// A public key or signature has the wrong encoding.
    #[error("MS_ERR_201: Invalid key material: {reason}")]
    InvalidKey { reason: String },

    // =================================================================
    // Fee Schedule Errors (3xx)
    // =================================================================
    /// No verified fee entry covers the requested time.
    #[error("MS_ERR_300: No applicable {method} fee at {at}")]
    NoApplicableFee { method: String, at: Timestamp },

    // =================================================================
    // Selection Errors (4xx)
    // =================================================================
    /// The selection cannot reach the requested target.
    #[error("MS_ERR_400: Selection infeasible: {0}")]
    Infeasible(InfeasibleReason),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("MS_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("MS_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid values, malformed config document).
    #[error("MS_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, MintselError>;

impl From<serde_json::Error> for MintselError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
