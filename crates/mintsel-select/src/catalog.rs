//! The usable denominations of one exchange at one instant.

use std::cmp::Ordering;

use mintsel_types::{
    Amount, CatalogConfig, Denomination, Exchange, Operation, Result, Timestamp,
};
use tracing::debug;

/// Usable denominations of an exchange for an operation at a reference time.
///
/// Sorted by value descending, then withdraw fee ascending, then public key
/// hash ascending. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenominationCatalog {
    exchange_base_url: String,
    currency: String,
    operation: Operation,
    reference_time: Timestamp,
    usable: Vec<Denomination>,
}

/// Catalog order: value desc, withdraw fee asc, hash asc.
fn catalog_order(a: &Denomination, b: &Denomination) -> Ordering {
    b.value
        .to_units()
        .cmp(&a.value.to_units())
        .then_with(|| a.fee_withdraw.to_units().cmp(&b.fee_withdraw.to_units()))
        .then_with(|| a.public_key_hash.cmp(&b.public_key_hash))
}

impl DenominationCatalog {
    /// Collect the denominations of `exchange` usable for `operation` at
    /// `reference_time`.
    ///
    /// A denomination qualifies if it is offered, not revoked, `Verified`,
    /// denominated in the exchange's currency, and `reference_time` lies in
    /// `[stamp_start, window_end]`. For withdrawals the window end is pulled
    /// in by `config.withdraw_expiry_margin_secs`.
    #[must_use]
    pub fn build(
        exchange: &Exchange,
        reference_time: Timestamp,
        operation: Operation,
        config: &CatalogConfig,
    ) -> Self {
        let margin = match operation {
            Operation::Withdraw => config.withdraw_expiry_margin_secs,
            Operation::Spend | Operation::Refresh => 0,
        };

        let mut usable: Vec<Denomination> = exchange
            .denominations
            .iter()
            .filter(|d| {
                d.is_usable_at(reference_time, operation)
                    && reference_time <= d.window_end(operation).saturating_sub_secs(margin)
                    && exchange.deals_in(d.value.currency())
            })
            .cloned()
            .collect();
        usable.sort_by(catalog_order);

        debug!(
            exchange = %exchange.base_url,
            operation = %operation,
            at = %reference_time,
            published = exchange.denominations.len(),
            usable = usable.len(),
            "catalog built"
        );

        Self {
            exchange_base_url: exchange.base_url.clone(),
            currency: exchange.currency.to_ascii_uppercase(),
            operation,
            reference_time,
            usable,
        }
    }

    /// Usable denominations in catalog order.
    #[must_use]
    pub fn usable(&self) -> &[Denomination] {
        &self.usable
    }

    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    #[must_use]
    pub fn exchange_base_url(&self) -> &str {
        &self.exchange_base_url
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    #[must_use]
    pub fn reference_time(&self) -> Timestamp {
        self.reference_time
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.usable.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.usable.len()
    }

    /// The largest face value on offer.
    #[must_use]
    pub fn largest(&self) -> Option<&Denomination> {
        self.usable.first()
    }

    /// `max_coins × largest value`: the most a single selection can cover.
    /// Zero for an empty catalog.
    ///
    /// # Errors
    /// `Overflow` if the product exceeds the amount range.
    pub fn max_representable(&self, max_coins: u32) -> Result<Amount> {
        match self.largest() {
            Some(d) => d.value.checked_mul(max_coins),
            None => Amount::zero(&self.currency),
        }
    }

    /// Earliest `stamp_expire_deposit` among the usable denominations: coins
    /// obtained from this catalog must be spent before then.
    #[must_use]
    pub fn earliest_deposit_expiration(&self) -> Option<Timestamp> {
        self.usable.iter().map(|d| d.stamp_expire_deposit).min()
    }
}

#[cfg(test)]
mod tests {
    use mintsel_types::{MasterPublicKey, VerificationStatus};

    use super::*;

    const MASTER: MasterPublicKey = MasterPublicKey::from_bytes([1; 32]);
    const URL: &str = "https://exchange.test/";

    fn kudos(s: &str) -> Amount {
        Amount::parse(&format!("KUDOS:{s}")).unwrap()
    }

    fn denom(value: &str) -> Denomination {
        Denomination::dummy(URL, MASTER, kudos(value))
    }

    fn exchange(denoms: Vec<Denomination>) -> Exchange {
        let mut ex = Exchange::dummy(URL, "KUDOS", MASTER);
        ex.denominations = denoms;
        ex
    }

    fn build(ex: &Exchange, t: u64, op: Operation) -> DenominationCatalog {
        DenominationCatalog::build(ex, Timestamp::from_secs(t), op, &CatalogConfig::default())
    }

    #[test]
    fn sorted_by_value_then_fee_then_hash() {
        let cheap = denom("2").with_uniform_fee(&kudos("0.01"));
        let pricey = denom("2").with_uniform_fee(&kudos("0.05"));
        let ex = exchange(vec![denom("1"), pricey.clone(), denom("8"), cheap.clone()]);
        let cat = build(&ex, 10, Operation::Withdraw);
        let values: Vec<String> = cat.usable().iter().map(|d| d.value.to_string()).collect();
        assert_eq!(values, ["KUDOS:8", "KUDOS:2", "KUDOS:2", "KUDOS:1"]);
        assert_eq!(cat.usable()[1], cheap);
        assert_eq!(cat.usable()[2], pricey);
    }

    #[test]
    fn equal_value_and_fee_ordered_by_hash() {
        let a = denom("4");
        let b = denom("4");
        let ex = exchange(vec![a.clone(), b.clone()]);
        let cat = build(&ex, 10, Operation::Withdraw);
        assert!(cat.usable()[0].public_key_hash < cat.usable()[1].public_key_hash);
    }

    #[test]
    fn revoked_unverified_and_unoffered_excluded() {
        let mut revoked = denom("1");
        revoked.is_revoked = true;
        let mut unverified = denom("2");
        unverified.verification_status = VerificationStatus::Unverified;
        let mut failed = denom("4");
        failed.verification_status = VerificationStatus::Failed;
        let mut withdrawn = denom("8");
        withdrawn.is_offered = false;
        let ex = exchange(vec![revoked, unverified, failed, withdrawn, denom("16")]);
        let cat = build(&ex, 10, Operation::Withdraw);
        assert_eq!(cat.len(), 1);
        assert_eq!(cat.usable()[0].value, kudos("16"));
    }

    #[test]
    fn windows_follow_operation() {
        let d = denom("1").with_window(
            Timestamp::from_secs(100),
            Timestamp::from_secs(200),
            Timestamp::from_secs(300),
            Timestamp::from_secs(400),
        );
        let ex = exchange(vec![d]);
        assert!(build(&ex, 50, Operation::Withdraw).is_empty());
        assert_eq!(build(&ex, 150, Operation::Withdraw).len(), 1);
        assert!(build(&ex, 250, Operation::Withdraw).is_empty());
        assert_eq!(build(&ex, 250, Operation::Spend).len(), 1);
        assert_eq!(build(&ex, 300, Operation::Refresh).len(), 1);
        assert!(build(&ex, 350, Operation::Spend).is_empty());
    }

    #[test]
    fn withdraw_margin_shortens_window() {
        let d = denom("1").with_window(
            Timestamp::from_secs(0),
            Timestamp::from_secs(200),
            Timestamp::from_secs(300),
            Timestamp::from_secs(400),
        );
        let ex = exchange(vec![d]);
        let config = CatalogConfig {
            withdraw_expiry_margin_secs: 60,
        };
        let at = |t| DenominationCatalog::build(&ex, Timestamp::from_secs(t), Operation::Withdraw, &config);
        assert_eq!(at(140).len(), 1);
        assert!(at(141).is_empty());
        let spend = DenominationCatalog::build(&ex, Timestamp::from_secs(250), Operation::Spend, &config);
        assert_eq!(spend.len(), 1);
    }

    #[test]
    fn foreign_currency_excluded() {
        let ex = exchange(vec![Denomination::dummy(URL, MASTER, Amount::parse("EUR:1").unwrap())]);
        assert!(build(&ex, 10, Operation::Withdraw).is_empty());
    }

    #[test]
    fn lower_case_exchange_currency_still_matches() {
        let mut ex = Exchange::dummy(URL, "kudos", MASTER);
        ex.denominations = vec![denom("1"), denom("2")];
        assert_eq!(build(&ex, 10, Operation::Withdraw).len(), 2);

        ex.currency = "kudos".to_string();
        let cat = build(&ex, 10, Operation::Withdraw);
        assert_eq!(cat.len(), 2);
        assert_eq!(cat.currency(), "KUDOS");
    }

    #[test]
    fn max_representable_and_expiration() {
        let small = denom("1").with_window(
            Timestamp::from_secs(0),
            Timestamp::from_secs(100),
            Timestamp::from_secs(500),
            Timestamp::from_secs(900),
        );
        let ex = exchange(vec![small, denom("5")]);
        let cat = build(&ex, 10, Operation::Withdraw);
        assert_eq!(cat.max_representable(3).unwrap(), kudos("15"));
        assert_eq!(cat.earliest_deposit_expiration(), Some(Timestamp::from_secs(500)));

        let empty = build(&exchange(vec![]), 10, Operation::Withdraw);
        assert!(empty.max_representable(3).unwrap().is_zero());
        assert_eq!(empty.earliest_deposit_expiration(), None);
        assert_eq!(empty.currency(), "KUDOS");
    }
}
