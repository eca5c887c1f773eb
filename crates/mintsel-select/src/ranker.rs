//! Exchange ranking.
//!
//! Given several exchanges for one currency, order them by how well each
//! can serve a withdrawal of `target`:
//!
//! ```text
//! (terms accepted? 0 : 1, audited? 0 : 1, total fee, coin count, base URL)
//! ```
//!
//! compared lexicographically, smaller first. Exchanges in other currencies
//! are skipped; exchanges that cannot cover the target are listed separately
//! with the reason.

use mintsel_types::{
    Amount, CatalogConfig, EngineConfig, Exchange, InfeasibleReason, Operation, RankingConfig,
    Result, SelectionOutcome, SelectionResult, Timestamp,
};
use tracing::info;

use crate::catalog::DenominationCatalog;
use crate::selector::DenominationSelector;

/// Sort key of a ranked exchange. Field order is comparison order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score {
    /// 0 if the current terms of service were accepted.
    pub tos_rank: u8,
    /// 0 if a trusted auditor vouches for the exchange.
    pub audit_rank: u8,
    /// Total operation fee in sub-units.
    pub total_fee_units: u128,
    pub coin_count: u32,
    pub base_url: String,
}

/// An exchange that can serve the target, with its selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedExchange {
    pub base_url: String,
    pub score: Score,
    pub selection: SelectionResult,
}

/// An exchange of the right currency that cannot serve the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusableExchange {
    pub base_url: String,
    pub reason: InfeasibleReason,
}

/// Ranking output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedList {
    /// Best first.
    pub ranked: Vec<RankedExchange>,
    /// In input order.
    pub unusable: Vec<UnusableExchange>,
}

impl RankedList {
    #[must_use]
    pub fn best(&self) -> Option<&RankedExchange> {
        self.ranked.first()
    }
}

/// Orders exchanges for a withdrawal.
#[derive(Debug, Clone, Default)]
pub struct ExchangeRanker {
    selector: DenominationSelector,
    catalog: CatalogConfig,
    trust: RankingConfig,
}

impl ExchangeRanker {
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            selector: DenominationSelector::new(config.selection),
            catalog: config.catalog,
            trust: config.ranking.clone(),
        }
    }

    /// Whether an auditor the wallet trusts vouches for `exchange`.
    ///
    /// With no trusted auditors configured, any declared auditor counts. A
    /// master key on the trusted-exchange list counts as audited.
    #[must_use]
    pub fn is_audited(&self, exchange: &Exchange) -> bool {
        if self.trust.trusted_exchanges.contains(&exchange.master_public_key) {
            return true;
        }
        if self.trust.trusted_auditors.is_empty() {
            return !exchange.auditors.is_empty();
        }
        exchange
            .auditors
            .iter()
            .any(|a| self.trust.trusted_auditors.contains(&a.auditor_pub))
    }

    /// Rank `exchanges` of `currency` for withdrawing `target` at `reference_time`.
    ///
    /// `currency` is matched case-insensitively.
    ///
    /// # Errors
    /// `InvalidAmount` for a malformed currency code; propagates arithmetic
    /// errors from selection.
    pub fn rank(
        &self,
        exchanges: &[Exchange],
        currency: &str,
        target: &Amount,
        reference_time: Timestamp,
    ) -> Result<RankedList> {
        let currency = Amount::normalize_currency(currency)?;
        let mut list = RankedList::default();
        let mut skipped = 0usize;

        for exchange in exchanges {
            if !exchange.deals_in(&currency) {
                skipped += 1;
                continue;
            }
            let catalog = DenominationCatalog::build(
                exchange,
                reference_time,
                Operation::Withdraw,
                &self.catalog,
            );
            match self.selector.select(&catalog, target, Operation::Withdraw)? {
                SelectionOutcome::Selected(selection) => {
                    let score = Score {
                        tos_rank: u8::from(!exchange.tos_accepted()),
                        audit_rank: u8::from(!self.is_audited(exchange)),
                        total_fee_units: selection.total_fee.to_units(),
                        coin_count: selection.coin_count,
                        base_url: exchange.base_url.clone(),
                    };
                    list.ranked.push(RankedExchange {
                        base_url: exchange.base_url.clone(),
                        score,
                        selection,
                    });
                }
                SelectionOutcome::Infeasible(reason) => list.unusable.push(UnusableExchange {
                    base_url: exchange.base_url.clone(),
                    reason,
                }),
            }
        }
        list.ranked.sort_by(|a, b| a.score.cmp(&b.score));

        info!(
            currency = %currency,
            target = %target,
            ranked = list.ranked.len(),
            unusable = list.unusable.len(),
            skipped,
            best = list.best().map_or("-", |b| b.base_url.as_str()),
            "exchanges ranked"
        );
        Ok(list)
    }
}
