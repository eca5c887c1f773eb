//! Exchange snapshots as handed to the engine by the wallet.
//!
//! An [`Exchange`] is an immutable, already-fetched copy of everything an
//! exchange publishes. The engine never fetches or caches these itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Amount, Denomination, EddsaPublicKey, MasterPublicKey, WireAccount, WireFeeEntry};

/// The exchange's terms of service and what the user agreed to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermsOfService {
    pub current_version: String,
    /// Version the user accepted, if any. Supplied by UI state.
    pub accepted_version: Option<String>,
    pub content: String,
}

/// Acceptance state of an exchange's terms of service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TosStatus {
    /// The current version was accepted.
    Accepted,
    /// An older version was accepted; the terms changed since.
    Changed,
    /// Never accepted.
    Pending,
}

impl TermsOfService {
    #[must_use]
    pub fn status(&self) -> TosStatus {
        match &self.accepted_version {
            Some(v) if *v == self.current_version => TosStatus::Accepted,
            Some(_) => TosStatus::Changed,
            None => TosStatus::Pending,
        }
    }
}

impl std::fmt::Display for TosStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted => write!(f, "ACCEPTED"),
            Self::Changed => write!(f, "CHANGED"),
            Self::Pending => write!(f, "PENDING"),
        }
    }
}

/// An auditor the exchange declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditorRef {
    pub auditor_pub: EddsaPublicKey,
    pub auditor_url: String,
}

/// A snapshot of one exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    pub base_url: String,
    /// Canonical upper-case currency code.
    #[serde(deserialize_with = "currency_code")]
    pub currency: String,
    pub master_public_key: MasterPublicKey,
    #[serde(default)]
    pub tos: TermsOfService,
    #[serde(default)]
    pub wire_accounts: Vec<WireAccount>,
    #[serde(default)]
    pub denominations: Vec<Denomination>,
    /// Fee schedule per wire method.
    #[serde(default)]
    pub wire_fees: BTreeMap<String, Vec<WireFeeEntry>>,
    #[serde(default)]
    pub auditors: Vec<AuditorRef>,
}

fn currency_code<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Amount::normalize_currency(&raw).map_err(serde::de::Error::custom)
}

impl Exchange {
    /// Whether `currency` names this exchange's currency, ignoring case.
    #[must_use]
    pub fn deals_in(&self, currency: &str) -> bool {
        self.currency.eq_ignore_ascii_case(currency)
    }

    #[must_use]
    pub fn tos_status(&self) -> TosStatus {
        self.tos.status()
    }

    #[must_use]
    pub fn tos_accepted(&self) -> bool {
        self.tos_status() == TosStatus::Accepted
    }

    /// Fee entries for a wire method; empty if the method is unknown.
    #[must_use]
    pub fn wire_fees_for(&self, method: &str) -> &[WireFeeEntry] {
        self.wire_fees
            .get(method)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Parse a snapshot from its JSON form.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Dummy exchange for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Exchange {
    /// An exchange with accepted terms and no records.
    pub fn dummy(base_url: &str, currency: &str, master_public_key: MasterPublicKey) -> Self {
        Self {
            base_url: base_url.to_string(),
            currency: currency.to_ascii_uppercase(),
            master_public_key,
            tos: TermsOfService {
                current_version: "v1".to_string(),
                accepted_version: Some("v1".to_string()),
                content: String::new(),
            },
            wire_accounts: Vec::new(),
            denominations: Vec::new(),
            wire_fees: BTreeMap::new(),
            auditors: Vec::new(),
        }
    }
}
