//! Configuration types for the selection engine.

use serde::{Deserialize, Serialize};

use crate::{constants, EddsaPublicKey, MintselError, Result};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub selection: SelectionConfig,
    pub catalog: CatalogConfig,
    pub ranking: RankingConfig,
}

/// Limits for the denomination selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Maximum number of coins in one selection.
    pub max_coins: u32,
    /// Maximum number of states the dynamic-programming fallback may visit.
    pub dp_state_budget: u64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_coins: constants::DEFAULT_MAX_COINS,
            dp_state_budget: constants::DEFAULT_DP_STATE_BUDGET,
        }
    }
}

/// Catalog construction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Treat a denomination as no longer withdrawable this many seconds
    /// before its `stamp_expire_withdraw`.
    pub withdraw_expiry_margin_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            withdraw_expiry_margin_secs: constants::DEFAULT_WITHDRAW_EXPIRY_MARGIN_SECS,
        }
    }
}

/// Trust anchors used when ranking exchanges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Auditor keys the wallet trusts. Empty means any declared auditor counts.
    pub trusted_auditors: Vec<EddsaPublicKey>,
    /// Exchange master keys the wallet trusts directly.
    pub trusted_exchanges: Vec<EddsaPublicKey>,
}

impl EngineConfig {
    /// Parse from JSON; missing sections take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| MintselError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings under which no selection could ever succeed.
    pub fn validate(&self) -> Result<()> {
        if self.selection.max_coins == 0 {
            return Err(MintselError::Configuration(
                "selection.max_coins must be positive".to_string(),
            ));
        }
        if self.selection.dp_state_budget == 0 {
            return Err(MintselError::Configuration(
                "selection.dp_state_budget must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.selection.max_coins, 1024);
        assert_eq!(cfg.selection.dp_state_budget, 1_000_000);
        assert_eq!(cfg.catalog.withdraw_expiry_margin_secs, 0);
        assert!(cfg.ranking.trusted_auditors.is_empty());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = EngineConfig::from_json(r#"{"catalog":{"withdraw_expiry_margin_secs":50}}"#).unwrap();
        assert_eq!(cfg.catalog.withdraw_expiry_margin_secs, 50);
        assert_eq!(cfg.selection, SelectionConfig::default());
    }

    #[test]
    fn zero_limits_rejected() {
        let err = EngineConfig::from_json(r#"{"selection":{"max_coins":0}}"#).unwrap_err();
        assert!(matches!(err, MintselError::Configuration(_)));
        let err = EngineConfig::from_json(r#"{"selection":{"dp_state_budget":0}}"#).unwrap_err();
        assert!(matches!(err, MintselError::Configuration(_)));
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        let err = EngineConfig::from_json("{").unwrap_err();
        assert!(matches!(err, MintselError::Configuration(_)));
    }

    #[test]
    fn serde_roundtrip() {
        let mut cfg = EngineConfig::default();
        cfg.ranking.trusted_auditors.push(EddsaPublicKey::from_bytes([9; 32]));
        let json = serde_json::to_string(&cfg).unwrap();
        let back = EngineConfig::from_json(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
