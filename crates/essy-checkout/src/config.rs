//! # Store Configuration
//!
//! Per-store settings injected into the checkout service. Defaults suit
//! a small Indonesian coffee shop; a real installation loads this from
//! a JSON file next to the database.

use serde::{Deserialize, Serialize};

use essy_core::types::TaxRate;

/// Settings that vary per store installation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PosConfig {
    /// Name printed on receipts.
    pub store_name: String,

    /// Tax rate applied to every sale.
    pub tax_rate: TaxRate,

    /// Prefix for transaction numbers (`TRX` → `TRX-20260829-0001`).
    pub transaction_prefix: String,
}

impl Default for PosConfig {
    fn default() -> Self {
        PosConfig {
            store_name: "EssyCoff".to_string(),
            tax_rate: TaxRate::default(),
            transaction_prefix: "TRX".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PosConfig::default();
        assert_eq!(config.store_name, "EssyCoff");
        assert_eq!(config.tax_rate.bps(), 1000);
        assert_eq!(config.transaction_prefix, "TRX");
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: PosConfig = serde_json::from_str(r#"{"storeName": "Kopi Kita"}"#).unwrap();
        assert_eq!(config.store_name, "Kopi Kita");
        assert_eq!(config.tax_rate.bps(), 1000);
    }
}
