//! Sync settings and field-mapping rules.
//!
//! Settings are deserialized from a JSON file by the CLI; every field has a
//! default so a missing or partial file still yields a working configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;

/// How one eBay listing field is derived from a Shopify product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MappingRule {
    /// Read a (possibly nested) field from the product, e.g. `variants[0].sku`
    ShopifyField { path: String },
    /// A fixed value
    Constant { value: String },
    /// A formula expression, stored as-is and never evaluated by this engine
    Formula { expression: String },
    /// No automatic value; the field is filled in manually elsewhere
    EditInGrid,
}

/// Merchant warehouse address used when the eBay fulfillment location
/// has to be created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantAddress {
    pub address_line1: String,
    pub city: String,
    pub state_or_province: String,
    pub postal_code: String,
    pub country: String,
}

impl Default for MerchantAddress {
    fn default() -> Self {
        Self {
            address_line1: "1 Warehouse Way".to_string(),
            city: "Portland".to_string(),
            state_or_province: "OR".to_string(),
            postal_code: "97201".to_string(),
            country: "US".to_string(),
        }
    }
}

/// Configuration for one sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Currency for offer prices, fixed per process
    pub currency: String,
    /// eBay marketplace the offers are created on
    pub marketplace_id: String,
    /// Key of the fulfillment location offers reference
    pub merchant_location_key: String,
    /// Address used to create the fulfillment location when absent
    pub merchant_address: MerchantAddress,
    /// When true, `auto_sync_new_products` lists and syncs unmapped products
    pub auto_sync_enabled: bool,
    /// Page size for the auto-sync product fetch
    pub auto_sync_limit: u32,
    /// Category id -> field name -> rule. The "*" category applies to
    /// every listing; fields without any rule resolve to empty string.
    pub mappings: HashMap<String, HashMap<String, MappingRule>>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            marketplace_id: "EBAY_US".to_string(),
            merchant_location_key: "default-warehouse".to_string(),
            merchant_address: MerchantAddress::default(),
            auto_sync_enabled: false,
            auto_sync_limit: 50,
            mappings: HashMap::new(),
        }
    }
}

impl SyncSettings {
    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::SyncError::Validation(format!(
                "cannot read settings file {}: {}",
                path.display(),
                e
            ))
        })?;
        let settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Look up the mapping rule for a listing field, preferring the
    /// category-specific rule set over the "*" catch-all.
    pub fn rule(&self, category: &str, field: &str) -> Option<&MappingRule> {
        self.mappings
            .get(category)
            .and_then(|rules| rules.get(field))
            .or_else(|| self.mappings.get("*").and_then(|rules| rules.get(field)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_rule_deserializes_tagged() {
        let rule: MappingRule =
            serde_json::from_str(r#"{"type":"shopify_field","path":"variants[0].sku"}"#).unwrap();
        assert_eq!(
            rule,
            MappingRule::ShopifyField {
                path: "variants[0].sku".to_string()
            }
        );

        let rule: MappingRule = serde_json::from_str(r#"{"type":"edit_in_grid"}"#).unwrap();
        assert_eq!(rule, MappingRule::EditInGrid);
    }

    #[test]
    fn settings_default_on_empty_object() {
        let settings: SyncSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.currency, "USD");
        assert_eq!(settings.marketplace_id, "EBAY_US");
        assert!(!settings.auto_sync_enabled);
        assert!(settings.mappings.is_empty());
    }

    #[test]
    fn settings_parse_mappings_table() {
        let json = r#"{
            "currency": "GBP",
            "mappings": {
                "*": {
                    "title": {"type": "shopify_field", "path": "title"},
                    "description": {"type": "formula", "expression": "CONCAT(title, body_html)"}
                },
                "31388": {
                    "condition": {"type": "constant", "value": "Used - Excellent"}
                }
            }
        }"#;
        let settings: SyncSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.currency, "GBP");
        assert!(matches!(
            settings.rule("31388", "condition"),
            Some(MappingRule::Constant { .. })
        ));
        // The catch-all applies to any category
        assert!(matches!(
            settings.rule("31388", "title"),
            Some(MappingRule::ShopifyField { .. })
        ));
        assert!(settings.rule("625", "condition").is_none());
        assert!(settings.rule("*", "category").is_none());
    }
}
