//! Selection requests and their outcomes.
//!
//! An infeasible selection is an ordinary outcome, not an error: it tells the
//! wallet that an exchange cannot serve this amount with the denominations it
//! currently has. [`SelectionOutcome::into_result`] converts it into a
//! [`MintselError::Infeasible`] for callers that prefer `?`.

use serde::{Deserialize, Serialize};

use crate::{Amount, Denomination, FeeKind, MintselError, Result, Timestamp};

/// What the selected coins will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Withdrawing fresh coins from a reserve.
    Withdraw,
    /// Spending (depositing) already-withdrawn coins.
    Spend,
    /// Melting already-withdrawn coins for refresh.
    Refresh,
}

impl Operation {
    /// The per-coin fee charged for this operation.
    #[must_use]
    pub fn fee_kind(self) -> FeeKind {
        match self {
            Self::Withdraw => FeeKind::Withdraw,
            Self::Spend => FeeKind::Deposit,
            Self::Refresh => FeeKind::Refresh,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Withdraw => write!(f, "WITHDRAW"),
            Self::Spend => write!(f, "SPEND"),
            Self::Refresh => write!(f, "REFRESH"),
        }
    }
}

/// A request to cover `target_amount` with coins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    pub target_amount: Amount,
    pub operation: Operation,
    pub reference_time: Timestamp,
}

/// How a selection was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionStrategy {
    /// Largest-first on a canonical value ladder.
    Greedy,
    /// Bounded dynamic programming on an irregular ladder.
    DynamicProgramming,
}

/// `count` coins of one denomination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenominationPick {
    pub denomination: Denomination,
    pub count: u32,
}

/// A successful selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResult {
    /// Picks in catalog order (value descending).
    pub picks: Vec<DenominationPick>,
    pub target: Amount,
    /// Face value of all picked coins; at least `target`.
    pub total_value: Amount,
    /// Sum of the operation's per-coin fee over all picked coins.
    pub total_fee: Amount,
    pub coin_count: u32,
    pub strategy: SelectionStrategy,
}

impl SelectionResult {
    /// `total_value - target`: value that becomes change in a later step.
    pub fn overshoot(&self) -> Result<Amount> {
        self.total_value.checked_sub(&self.target)
    }

    /// `total_value + total_fee`.
    pub fn total_cost(&self) -> Result<Amount> {
        self.total_value.checked_add(&self.total_fee)
    }

    /// Whether the picks hit the target exactly.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.total_value == self.target
    }
}

/// Why a selection could not reach its target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfeasibleReason {
    ZeroTarget,
    EmptyCatalog,
    CurrencyMismatch { catalog: String, target: String },
    /// Even `max_coins` of the largest denomination fall short.
    InsufficientCapacity,
    /// Reaching the target needs more coins than allowed.
    CoinLimitExceeded { needed: u64, limit: u32 },
    /// The dynamic-programming fallback would exceed its state budget.
    SearchBudgetExhausted { states: u64, budget: u64 },
}

impl std::fmt::Display for InfeasibleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroTarget => write!(f, "target amount is zero"),
            Self::EmptyCatalog => write!(f, "no usable denominations"),
            Self::CurrencyMismatch { catalog, target } => {
                write!(f, "catalog currency {catalog} does not match target {target}")
            }
            Self::InsufficientCapacity => write!(f, "target exceeds maximum representable sum"),
            Self::CoinLimitExceeded { needed, limit } => {
                write!(f, "needs {needed} coins, limit is {limit}")
            }
            Self::SearchBudgetExhausted { states, budget } => {
                write!(f, "search needs {states} states, budget is {budget}")
            }
        }
    }
}

/// Result of running the selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionOutcome {
    Selected(SelectionResult),
    Infeasible(InfeasibleReason),
}

impl SelectionOutcome {
    #[must_use]
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::Infeasible(_))
    }

    #[must_use]
    pub fn result(&self) -> Option<&SelectionResult> {
        match self {
            Self::Selected(r) => Some(r),
            Self::Infeasible(_) => None,
        }
    }

    /// Convert into a `Result`, mapping infeasibility to an error.
    pub fn into_result(self) -> Result<SelectionResult> {
        match self {
            Self::Selected(r) => Ok(r),
            Self::Infeasible(reason) => Err(MintselError::Infeasible(reason)),
        }
    }
}
