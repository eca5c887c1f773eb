//! Budget-constrained withdrawal planning.
//!
//! Where [`crate::selector`] covers a target, the planner spends a reserve:
//! it withdraws as much value as the available balance allows, paying each
//! coin's withdraw fee out of the same balance, and never exceeds it.

use mintsel_types::{Amount, Denomination, DenominationPick, MintselError, Result};
use tracing::debug;

use crate::catalog::DenominationCatalog;

/// Coins to withdraw from a reserve and what they cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalPlan {
    /// Picks in catalog order.
    pub picks: Vec<DenominationPick>,
    pub coin_count: u32,
    /// Face value of the withdrawn coins.
    pub total_coin_value: Amount,
    /// Value plus withdraw fees: what leaves the reserve.
    pub total_withdraw_cost: Amount,
    /// Balance left in the reserve that no coin fits into.
    pub overhead: Amount,
}

impl WithdrawalPlan {
    /// Sum of withdraw fees.
    ///
    /// # Errors
    /// Only on inconsistent totals.
    pub fn total_fee(&self) -> Result<Amount> {
        self.total_withdraw_cost.checked_sub(&self.total_coin_value)
    }
}

/// Plan a withdrawal of at most `available` from `catalog`.
///
/// Walks the catalog largest value first and takes as many coins of each
/// denomination as still fit, counting `value + fee_withdraw` per coin, up to
/// `max_coins` in total.
///
/// # Errors
/// `CurrencyMismatch` if `available` is not in the catalog's currency.
pub fn plan_withdrawal(
    catalog: &DenominationCatalog,
    available: &Amount,
    max_coins: u32,
) -> Result<WithdrawalPlan> {
    if available.currency() != catalog.currency() {
        return Err(MintselError::CurrencyMismatch {
            left: available.currency().to_string(),
            right: catalog.currency().to_string(),
        });
    }

    let mut remaining = available.to_units();
    let mut coins_left = max_coins;
    let mut value_units = 0u128;
    let mut picks = Vec::new();

    for denom in catalog.usable() {
        if coins_left == 0 {
            break;
        }
        let value = denom.value.to_units();
        let cost = value + denom.fee_withdraw.to_units();
        if value == 0 {
            continue;
        }
        let fit = u32::try_from(remaining / cost).unwrap_or(u32::MAX).min(coins_left);
        if fit == 0 {
            continue;
        }
        remaining -= cost * u128::from(fit);
        value_units += value * u128::from(fit);
        coins_left -= fit;
        picks.push(DenominationPick {
            denomination: denom.clone(),
            count: fit,
        });
    }

    let currency = catalog.currency();
    let plan = WithdrawalPlan {
        coin_count: max_coins - coins_left,
        picks,
        total_coin_value: Amount::from_units(currency, value_units)?,
        total_withdraw_cost: Amount::from_units(currency, available.to_units() - remaining)?,
        overhead: Amount::from_units(currency, remaining)?,
    };
    debug!(
        exchange = catalog.exchange_base_url(),
        available = %available,
        coins = plan.coin_count,
        value = %plan.total_coin_value,
        overhead = %plan.overhead,
        "withdrawal planned"
    );
    Ok(plan)
}

/// What refreshing a coin of `refreshed` with `amount_left` on it loses.
///
/// The refresh fee comes off first; the rest is withdrawn from `catalog`
/// (a withdrawal catalog) under the planner's rules. Everything that does
/// not come back as fresh coins is cost. An `amount_left` at or below the
/// refresh fee is lost entirely.
///
/// # Errors
/// `CurrencyMismatch` if the amount, the fee and the catalog disagree.
pub fn total_refresh_cost(
    catalog: &DenominationCatalog,
    refreshed: &Denomination,
    amount_left: &Amount,
    max_coins: u32,
) -> Result<Amount> {
    let fee = &refreshed.fee_refresh;
    if amount_left.try_cmp(fee)?.is_le() {
        return Ok(amount_left.clone());
    }
    let plan = plan_withdrawal(catalog, &amount_left.checked_sub(fee)?, max_coins)?;
    let cost = amount_left.checked_sub(&plan.total_coin_value)?;
    debug!(
        exchange = catalog.exchange_base_url(),
        amount_left = %amount_left,
        cost = %cost,
        "refresh cost computed"
    );
    Ok(cost)
}
