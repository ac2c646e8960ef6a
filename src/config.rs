use crate::domain::money::TokenPrice;
use crate::domain::split::SplitTable;
use crate::error::{LedgerError, Result};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pricing and presentation settings shared by the calculator and the voucher.
///
/// Loaded from TOML:
///
/// ```toml
/// default_token_price = 300
/// operator_name = "ArcadeRent"
///
/// [revenue_split.metegol]
/// operator = 0.5
/// owner = 0.5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Price applied when neither the machine nor its location override it.
    pub default_token_price: TokenPrice,
    /// Name shown on the voucher's payable line.
    pub operator_name: String,
    pub revenue_split: SplitTable,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_token_price: TokenPrice::from_positive(dec!(300)),
            operator_name: "ArcadeRent".to_string(),
            revenue_split: SplitTable::default(),
        }
    }
}

impl LedgerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LedgerError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded ledger configuration");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: LedgerConfig =
            toml::from_str(content).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.operator_name.trim().is_empty() {
            return Err(LedgerError::Config(
                "operator_name must not be empty".to_string(),
            ));
        }
        self.revenue_split.validate()
    }
}
