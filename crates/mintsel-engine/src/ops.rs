//! Stateless entry points with default configuration.
//!
//! For callers that hold their own reference time and do not need custom
//! limits. [`crate::Engine`] offers the same operations bound to a
//! configuration and a clock.

use mintsel_select::{DenominationCatalog, DenominationSelector, ExchangeRanker, RankedList};
use mintsel_types::{
    Amount, CatalogConfig, EngineConfig, Exchange, Operation, Result, SelectionConfig,
    SelectionOutcome, Timestamp,
};

pub use mintsel_verify::{verify_denomination, verify_wire_account, verify_wire_fee_entry};

/// Usable denominations of `exchange` for `operation` at `reference_time`.
#[must_use]
pub fn build_catalog(
    exchange: &Exchange,
    reference_time: Timestamp,
    operation: Operation,
) -> DenominationCatalog {
    DenominationCatalog::build(exchange, reference_time, operation, &CatalogConfig::default())
}

/// Select coins from `catalog` covering `target`.
pub fn select(
    catalog: &DenominationCatalog,
    target: &Amount,
    operation: Operation,
) -> Result<SelectionOutcome> {
    DenominationSelector::new(SelectionConfig::default()).select(catalog, target, operation)
}

/// Rank the `currency` exchanges among `exchanges` for withdrawing `target`.
pub fn rank(
    exchanges: &[Exchange],
    currency: &str,
    target: &Amount,
    reference_time: Timestamp,
) -> Result<RankedList> {
    ExchangeRanker::new(&EngineConfig::default()).rank(exchanges, currency, target, reference_time)
}

#[cfg(test)]
mod tests {
    use mintsel_types::{InfeasibleReason, VerificationStatus};
    use mintsel_verify::MasterSigner;

    use super::*;

    fn kudos(s: &str) -> Amount {
        Amount::parse(&format!("KUDOS:{s}")).unwrap()
    }

    #[test]
    fn verify_then_catalog_then_select() {
        let signer = MasterSigner::from_seed([11; 32]);
        let mut ex = signer.exchange("https://ex.test/", "KUDOS");
        for v in ["1", "2", "4", "8"] {
            ex.denominations.push(signer.denomination("https://ex.test/", kudos(v)));
        }
        let master = ex.master_public_key;
        for d in &mut ex.denominations {
            assert_eq!(verify_denomination(d, &master), VerificationStatus::Verified);
        }
        let cat = build_catalog(&ex, Timestamp::from_secs(5), Operation::Withdraw);
        assert_eq!(cat.len(), 4);
        let out = select(&cat, &kudos("7"), Operation::Withdraw).unwrap();
        assert_eq!(out.result().unwrap().coin_count, 3);
    }

    #[test]
    fn unverified_snapshot_yields_empty_catalog() {
        let signer = MasterSigner::from_seed([12; 32]);
        let mut ex = signer.exchange("https://ex.test/", "KUDOS");
        ex.denominations.push(signer.denomination("https://ex.test/", kudos("1")));
        let cat = build_catalog(&ex, Timestamp::from_secs(5), Operation::Withdraw);
        assert!(cat.is_empty());
        assert_eq!(
            select(&cat, &kudos("1"), Operation::Withdraw).unwrap(),
            SelectionOutcome::Infeasible(InfeasibleReason::EmptyCatalog)
        );
    }

    #[test]
    fn rank_with_defaults() {
        let signer = MasterSigner::from_seed([13; 32]);
        let mut ex = signer.exchange("https://ex.test/", "KUDOS");
        let mut d = signer.denomination("https://ex.test/", kudos("1"));
        verify_denomination(&mut d, &ex.master_public_key);
        ex.denominations.push(d);
        let list = rank(&[ex], "KUDOS", &kudos("2"), Timestamp::from_secs(5)).unwrap();
        assert_eq!(list.ranked.len(), 1);
    }
}
