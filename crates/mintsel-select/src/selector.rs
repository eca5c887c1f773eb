//! Denomination selection.
//!
//! Given a catalog and a target, choose how many coins of each denomination
//! to use. Candidate selections are ranked by:
//!
//! 1. overshoot (`total_value - target`), smallest first, so an exact hit
//!    always wins;
//! 2. coin count;
//! 3. total fee for the operation;
//! 4. the sorted list of picked public key hashes, lexicographically.
//!
//! Coins of equal value only ever differ in fee and hash, so each value is
//! first reduced to its cheapest (then lowest-hash) denomination.
//!
//! ## Strategies
//!
//! - **Greedy**: when every distinct value divides the next larger one, the
//!   largest-first decomposition of a sum uses the fewest coins. The smallest
//!   coverable sum within the coin limit is found among the target rounded
//!   up at each value level.
//! - **Dynamic programming**: otherwise, a table over sums in units of the
//!   values' GCD holds the best `(coin count, fee)` per sum. The table covers
//!   `[0, target + largest)`. When that exceeds the state budget, whole
//!   largest coins are taken up front until it fits.
//!
//! All arithmetic is on integer sub-units.

use mintsel_types::{
    Amount, Denomination, DenominationPick, FeeKind, InfeasibleReason, MintselError, Operation,
    Result, SelectionConfig, SelectionOutcome, SelectionResult, SelectionStrategy,
};
use tracing::debug;

use crate::catalog::DenominationCatalog;

/// One value level after equal-value pruning.
#[derive(Debug, Clone, Copy)]
struct Coin<'a> {
    value: u128,
    fee: u128,
    denom: &'a Denomination,
}

/// Per-level coin counts, or why there are none.
type Plan = std::result::Result<Vec<u128>, InfeasibleReason>;

const UNREACHABLE: u32 = u32::MAX;

/// Chooses coins from a [`DenominationCatalog`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DenominationSelector {
    config: SelectionConfig,
}

impl DenominationSelector {
    #[must_use]
    pub fn new(config: SelectionConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> SelectionConfig {
        self.config
    }

    /// Select coins covering `target` for `operation`.
    ///
    /// Infeasibility is reported as [`SelectionOutcome::Infeasible`].
    ///
    /// # Errors
    /// `Overflow` if a total leaves the amount range.
    pub fn select(
        &self,
        catalog: &DenominationCatalog,
        target: &Amount,
        operation: Operation,
    ) -> Result<SelectionOutcome> {
        if target.is_zero() {
            return Ok(SelectionOutcome::Infeasible(InfeasibleReason::ZeroTarget));
        }
        if catalog.is_empty() {
            return Ok(SelectionOutcome::Infeasible(InfeasibleReason::EmptyCatalog));
        }
        if target.currency() != catalog.currency() {
            return Ok(SelectionOutcome::Infeasible(InfeasibleReason::CurrencyMismatch {
                catalog: catalog.currency().to_string(),
                target: target.currency().to_string(),
            }));
        }

        let coins = prune(catalog.usable(), operation.fee_kind());
        if coins.is_empty() {
            return Ok(SelectionOutcome::Infeasible(InfeasibleReason::EmptyCatalog));
        }
        let short = match catalog.max_representable(self.config.max_coins) {
            Ok(capacity) => capacity.try_cmp(target)?.is_lt(),
            // Beyond the amount range, hence above any target.
            Err(MintselError::Overflow) => false,
            Err(e) => return Err(e),
        };
        if short {
            debug!(
                exchange = catalog.exchange_base_url(),
                target = %target,
                max_coins = self.config.max_coins,
                "target above maximum representable sum"
            );
            return Ok(SelectionOutcome::Infeasible(InfeasibleReason::InsufficientCapacity));
        }

        let units = target.to_units();
        let (plan, strategy) = if is_canonical(&coins) {
            (self.greedy_plan(&coins, units), SelectionStrategy::Greedy)
        } else {
            (self.dynamic_plan(&coins, units)?, SelectionStrategy::DynamicProgramming)
        };
        let counts = match plan {
            Ok(counts) => counts,
            Err(reason) => {
                debug!(
                    exchange = catalog.exchange_base_url(),
                    target = %target,
                    ?strategy,
                    %reason,
                    "selection infeasible"
                );
                return Ok(SelectionOutcome::Infeasible(reason));
            }
        };

        let result = assemble(&coins, &counts, target, strategy)?;
        debug!(
            exchange = catalog.exchange_base_url(),
            target = %target,
            ?strategy,
            coins = result.coin_count,
            total = %result.total_value,
            fee = %result.total_fee,
            "denominations selected"
        );
        Ok(SelectionOutcome::Selected(result))
    }

    /// Smallest sum `>= target` whose greedy decomposition fits the coin limit.
    ///
    /// On a divisible ladder the optimum either equals the target rounded up
    /// to the smallest value, or keeps the target's decomposition above some
    /// level, bumps that level by one coin and zeroes everything below.
    fn greedy_plan(&self, coins: &[Coin<'_>], target: u128) -> Plan {
        let mut sums: Vec<u128> = coins
            .iter()
            .flat_map(|c| [target.div_ceil(c.value) * c.value, (target / c.value + 1) * c.value])
            .collect();
        sums.sort_unstable();
        sums.dedup();

        let limit = u128::from(self.config.max_coins);
        let mut fewest = u128::MAX;
        for sum in sums {
            let counts = decompose(coins, sum);
            let used: u128 = counts.iter().sum();
            if used <= limit {
                return Ok(counts);
            }
            fewest = fewest.min(used);
        }
        Err(InfeasibleReason::CoinLimitExceeded {
            needed: u64::try_from(fewest).unwrap_or(u64::MAX),
            limit: self.config.max_coins,
        })
    }

    fn dynamic_plan(&self, coins: &[Coin<'_>], target: u128) -> Result<Plan> {
        let unit = coins.iter().fold(0, |acc, c| gcd(acc, c.value));
        let weights: Vec<u128> = coins.iter().map(|c| c.value / unit).collect();
        let goal = target.div_ceil(unit);
        let widest = weights[0];
        let budget = u128::from(self.config.dp_state_budget);

        let needed = goal + widest;
        let mut prefix = 0u128;
        if needed > budget {
            prefix = (needed - budget).div_ceil(widest);
            if prefix * widest > goal {
                return Ok(Err(InfeasibleReason::SearchBudgetExhausted {
                    states: u64::try_from(needed).unwrap_or(u64::MAX),
                    budget: self.config.dp_state_budget,
                }));
            }
        }
        let rest = goal - prefix * widest;
        let limit = u128::from(self.config.max_coins).saturating_sub(prefix);
        let Ok(states) = usize::try_from(rest + widest) else {
            return Ok(Err(InfeasibleReason::SearchBudgetExhausted {
                states: u64::try_from(needed).unwrap_or(u64::MAX),
                budget: self.config.dp_state_budget,
            }));
        };
        if prefix > 0 {
            debug!(prefix = %prefix, states, "pre-consumed largest coins to fit state budget");
        }

        // Weights below `states` fit in usize because `states` does.
        let steps: Vec<Option<usize>> = weights.iter().map(|w| usize::try_from(*w).ok()).collect();
        let mut count = vec![UNREACHABLE; states];
        let mut fee = vec![0u128; states];
        count[0] = 0;
        for s in 1..states {
            for (i, coin) in coins.iter().enumerate() {
                let Some(step) = steps[i].filter(|w| *w <= s) else {
                    continue;
                };
                let from = s - step;
                if count[from] == UNREACHABLE {
                    continue;
                }
                let candidate = (count[from] + 1, fee[from] + coin.fee);
                if candidate < (count[s], fee[s]) {
                    count[s] = candidate.0;
                    fee[s] = candidate.1;
                }
            }
        }

        let start = usize::try_from(rest).unwrap_or(states);
        let chosen = (start..states)
            .find(|s| count[*s] != UNREACHABLE && u128::from(count[*s]) <= limit);
        let Some(sum) = chosen else {
            let fewest = (start..states)
                .map(|s| count[s])
                .filter(|c| *c != UNREACHABLE)
                .min()
                .map_or(u64::MAX, |c| u64::from(c).saturating_add(u64::try_from(prefix).unwrap_or(u64::MAX)));
            return Ok(Err(InfeasibleReason::CoinLimitExceeded {
                needed: fewest,
                limit: self.config.max_coins,
            }));
        };

        // Rebuild the lexicographically smallest hash multiset: at each step
        // take the lowest-hash coin that still starts an optimal completion.
        let mut by_hash: Vec<usize> = (0..coins.len()).collect();
        by_hash.sort_by(|a, b| coins[*a].denom.public_key_hash.cmp(&coins[*b].denom.public_key_hash));

        let mut counts = vec![0u128; coins.len()];
        counts[0] = prefix;
        let mut remaining = sum;
        while remaining > 0 {
            let next = by_hash.iter().copied().find(|i| {
                steps[*i].is_some_and(|step| {
                    step <= remaining
                        && count[remaining - step] != UNREACHABLE
                        && count[remaining - step] + 1 == count[remaining]
                        && fee[remaining - step] + coins[*i].fee == fee[remaining]
                })
            });
            let Some(i) = next else {
                return Err(MintselError::Internal(format!(
                    "selection table inconsistent at sum {remaining}"
                )));
            };
            counts[i] += 1;
            remaining -= steps[i].unwrap_or(remaining);
        }
        Ok(Ok(counts))
    }
}

/// Reduce each run of equal values to its cheapest, then lowest-hash,
/// denomination. Input and output are in value-descending order. Zero-value
/// denominations are dropped.
fn prune(usable: &[Denomination], kind: FeeKind) -> Vec<Coin<'_>> {
    let mut coins: Vec<Coin<'_>> = Vec::new();
    for denom in usable.iter().filter(|d| !d.value.is_zero()) {
        let coin = Coin {
            value: denom.value.to_units(),
            fee: denom.fee(kind).to_units(),
            denom,
        };
        match coins.last_mut() {
            Some(last) if last.value == coin.value => {
                if (coin.fee, &coin.denom.public_key_hash) < (last.fee, &last.denom.public_key_hash) {
                    *last = coin;
                }
            }
            _ => coins.push(coin),
        }
    }
    coins
}

/// Whether each value is an exact multiple of the next smaller one.
fn is_canonical(coins: &[Coin<'_>]) -> bool {
    coins.windows(2).all(|pair| pair[0].value % pair[1].value == 0)
}

/// Largest-first decomposition of `sum`.
fn decompose(coins: &[Coin<'_>], sum: u128) -> Vec<u128> {
    let mut remaining = sum;
    coins
        .iter()
        .map(|c| {
            let n = remaining / c.value;
            remaining -= n * c.value;
            n
        })
        .collect()
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn assemble(
    coins: &[Coin<'_>],
    counts: &[u128],
    target: &Amount,
    strategy: SelectionStrategy,
) -> Result<SelectionResult> {
    let currency = target.currency();
    let mut picks = Vec::new();
    let mut value_units = 0u128;
    let mut fee_units = 0u128;
    let mut coin_count = 0u32;
    for (coin, n) in coins.iter().zip(counts) {
        if *n == 0 {
            continue;
        }
        let count = u32::try_from(*n).map_err(|_| MintselError::Overflow)?;
        value_units = value_units
            .checked_add(coin.value * n)
            .ok_or(MintselError::Overflow)?;
        fee_units = fee_units.checked_add(coin.fee * n).ok_or(MintselError::Overflow)?;
        coin_count = coin_count.checked_add(count).ok_or(MintselError::Overflow)?;
        picks.push(DenominationPick {
            denomination: coin.denom.clone(),
            count,
        });
    }
    Ok(SelectionResult {
        picks,
        target: target.clone(),
        total_value: Amount::from_units(currency, value_units)?,
        total_fee: Amount::from_units(currency, fee_units)?,
        coin_count,
        strategy,
    })
}
