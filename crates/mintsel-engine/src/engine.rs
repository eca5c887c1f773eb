//! The configured engine.
//!
//! An [`Engine`] bundles an [`EngineConfig`] with a [`Clock`]. Every
//! operation that needs "now" asks the clock, so tests pin time with
//! [`FixedClock`] and production uses [`SystemClock`].

use mintsel_select::{
    DenominationCatalog, DenominationSelector, ExchangeRanker, RankedList, ResolvedFee,
    WithdrawalPlan, plan_withdrawal, resolve, selection_digest_hex, total_refresh_cost,
};
use mintsel_types::{
    Amount, Clock, Denomination, EngineConfig, Exchange, FixedClock, MintselError, Operation,
    Result, SelectionOutcome, SelectionRequest, SystemClock, Timestamp, TosStatus,
};
use mintsel_verify::{VerificationReport, verify_exchange};
use tracing::debug;

/// Everything a wallet shows before confirming a withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalDetails {
    pub exchange_base_url: String,
    /// Amount the user wants to move into the reserve.
    pub amount: Amount,
    /// Coins the reserve balance buys.
    pub plan: WithdrawalPlan,
    /// `amount - plan.total_coin_value`: withdraw fees plus overhead.
    pub withdraw_fee: Amount,
    /// Fee entry for the wire method at the reference time, if one applies.
    pub wire_fee: Option<ResolvedFee>,
    /// Coins from this plan must be spent before this instant.
    pub earliest_deposit_expiration: Option<Timestamp>,
    pub tos_status: TosStatus,
    /// A trusted (or, with none configured, any) auditor vouches for the exchange.
    pub is_audited: bool,
    /// The exchange's master key is trusted directly.
    pub is_trusted: bool,
    pub reference_time: Timestamp,
}

/// Verification, selection and ranking bound to one configuration and clock.
#[derive(Debug, Clone)]
pub struct Engine<C: Clock = SystemClock> {
    config: EngineConfig,
    clock: C,
    selector: DenominationSelector,
    ranker: ExchangeRanker,
}

impl Engine<SystemClock> {
    /// An engine on the system clock.
    ///
    /// # Errors
    /// `Configuration` if `config` fails validation.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }

    /// An engine on the system clock, configured from JSON.
    ///
    /// # Errors
    /// `Configuration` if the JSON is malformed or invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(EngineConfig::from_json(json)?)
    }
}

impl Engine<FixedClock> {
    /// An engine frozen at `now`.
    ///
    /// # Errors
    /// `Configuration` if `config` fails validation.
    pub fn at(config: EngineConfig, now: Timestamp) -> Result<Self> {
        Self::with_clock(config, FixedClock(now))
    }
}

impl<C: Clock> Engine<C> {
    /// An engine on a caller-supplied clock.
    ///
    /// # Errors
    /// `Configuration` if `config` fails validation.
    pub fn with_clock(config: EngineConfig, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            selector: DenominationSelector::new(config.selection),
            ranker: ExchangeRanker::new(&config),
            config,
            clock,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The clock's current time.
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Verify every record of `exchange` in place.
    pub fn verify_exchange(&self, exchange: &mut Exchange) -> VerificationReport {
        verify_exchange(exchange)
    }

    /// Usable denominations of `exchange` for `operation`, now.
    #[must_use]
    pub fn catalog(&self, exchange: &Exchange, operation: Operation) -> DenominationCatalog {
        self.catalog_at(exchange, operation, self.now())
    }

    /// Usable denominations of `exchange` for `operation` at `reference_time`.
    #[must_use]
    pub fn catalog_at(
        &self,
        exchange: &Exchange,
        operation: Operation,
        reference_time: Timestamp,
    ) -> DenominationCatalog {
        DenominationCatalog::build(exchange, reference_time, operation, &self.config.catalog)
    }

    /// Select coins from `catalog` covering `target`.
    pub fn select(
        &self,
        catalog: &DenominationCatalog,
        target: &Amount,
        operation: Operation,
    ) -> Result<SelectionOutcome> {
        let outcome = self.selector.select(catalog, target, operation)?;
        if let SelectionOutcome::Selected(result) = &outcome {
            debug!(
                exchange = catalog.exchange_base_url(),
                digest = %selection_digest_hex(result),
                "selection fingerprint"
            );
        }
        Ok(outcome)
    }

    /// Build the catalog a request names and select from it.
    ///
    /// Uses the request's own reference time rather than the clock.
    pub fn select_request(
        &self,
        exchange: &Exchange,
        request: &SelectionRequest,
    ) -> Result<SelectionOutcome> {
        let catalog = self.catalog_at(exchange, request.operation, request.reference_time);
        self.select(&catalog, &request.target_amount, request.operation)
    }

    /// Value lost when refreshing a coin of `refreshed` with `amount_left`
    /// on it at `exchange`, now.
    ///
    /// # Errors
    /// `CurrencyMismatch` if `amount_left` is not in the exchange's currency.
    pub fn refresh_cost(
        &self,
        exchange: &Exchange,
        refreshed: &Denomination,
        amount_left: &Amount,
    ) -> Result<Amount> {
        let catalog = self.catalog(exchange, Operation::Withdraw);
        total_refresh_cost(&catalog, refreshed, amount_left, self.config.selection.max_coins)
    }

    /// Rank the `currency` exchanges among `exchanges` for withdrawing `target`, now.
    pub fn rank(&self, exchanges: &[Exchange], currency: &str, target: &Amount) -> Result<RankedList> {
        self.ranker.rank(exchanges, currency, target, self.now())
    }

    /// Plan a withdrawal of `amount` from `exchange` and gather what the
    /// user needs to see before confirming it.
    ///
    /// # Errors
    /// `CurrencyMismatch` if `amount` is not in the exchange's currency.
    pub fn withdrawal_details(
        &self,
        exchange: &Exchange,
        amount: &Amount,
        wire_method: &str,
    ) -> Result<WithdrawalDetails> {
        if !exchange.deals_in(amount.currency()) {
            return Err(MintselError::CurrencyMismatch {
                left: amount.currency().to_string(),
                right: exchange.currency.clone(),
            });
        }
        let now = self.now();
        let catalog = self.catalog_at(exchange, Operation::Withdraw, now);
        let plan = plan_withdrawal(&catalog, amount, self.config.selection.max_coins)?;
        let withdraw_fee = amount.checked_sub(&plan.total_coin_value)?;

        let wire_fee = match resolve(exchange.wire_fees_for(wire_method), wire_method, now) {
            Ok(fee) => Some(fee),
            Err(MintselError::NoApplicableFee { .. }) => {
                debug!(exchange = %exchange.base_url, wire_method, at = %now, "no wire fee applies");
                None
            }
            Err(e) => return Err(e),
        };

        let earliest_deposit_expiration = plan
            .picks
            .iter()
            .map(|p| p.denomination.stamp_expire_deposit)
            .min();

        Ok(WithdrawalDetails {
            exchange_base_url: exchange.base_url.clone(),
            amount: amount.clone(),
            withdraw_fee,
            wire_fee,
            earliest_deposit_expiration,
            tos_status: exchange.tos_status(),
            is_audited: self.ranker.is_audited(exchange),
            is_trusted: self
                .config
                .ranking
                .trusted_exchanges
                .contains(&exchange.master_public_key),
            reference_time: now,
            plan,
        })
    }
}
