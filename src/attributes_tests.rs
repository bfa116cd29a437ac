//! Tests for mapping-rule resolution and the category fallback.

use std::collections::HashMap;

use super::*;
use crate::settings::{MappingRule, SyncSettings};
use crate::shopify::{ShopifyImage, ShopifyProduct, ShopifyVariant};

fn sample_product() -> ShopifyProduct {
    ShopifyProduct {
        id: 1001,
        title: "Canon AE-1 35mm Camera".to_string(),
        body_html: "<p>Classic SLR.</p>".to_string(),
        vendor: "Canon".to_string(),
        product_type: "Film Camera".to_string(),
        status: "active".to_string(),
        tags: "film, slr".to_string(),
        variants: vec![ShopifyVariant {
            id: 2001,
            sku: "CAM-100-U42".to_string(),
            price: "249.00".to_string(),
            inventory_quantity: 1,
            barcode: Some("4012345678901".to_string()),
            weight: Some(1.4),
            weight_unit: "lb".to_string(),
        }],
        images: vec![ShopifyImage {
            src: "https://cdn.example.com/cam.jpg".to_string(),
        }],
    }
}

/// Settings with the given rules in the "*" catch-all category.
fn settings_with(rules: &[(&str, MappingRule)]) -> SyncSettings {
    let catch_all: HashMap<String, MappingRule> = rules
        .iter()
        .map(|(field, rule)| (field.to_string(), rule.clone()))
        .collect();
    SyncSettings {
        mappings: HashMap::from([("*".to_string(), catch_all)]),
        ..SyncSettings::default()
    }
}

#[test]
fn shopify_field_reads_top_level_path() {
    let settings = settings_with(&[(
        "title",
        MappingRule::ShopifyField {
            path: "title".to_string(),
        },
    )]);
    let attrs = resolve_attributes(&settings, &sample_product());
    assert_eq!(attrs.title, "Canon AE-1 35mm Camera");
}

#[test]
fn shopify_field_reads_array_indexed_path() {
    let settings = settings_with(&[(
        "identifier",
        MappingRule::ShopifyField {
            path: "variants[0].barcode".to_string(),
        },
    )]);
    let attrs = resolve_attributes(&settings, &sample_product());
    assert_eq!(attrs.identifier, "4012345678901");
}

#[test]
fn shopify_field_numeric_value_becomes_string() {
    let settings = settings_with(&[(
        "handling_time",
        MappingRule::ShopifyField {
            path: "variants[0].inventory_quantity".to_string(),
        },
    )]);
    let attrs = resolve_attributes(&settings, &sample_product());
    assert_eq!(attrs.handling_time, "1");
}

#[test]
fn missing_field_degrades_to_empty_string() {
    let settings = settings_with(&[
        (
            "title",
            MappingRule::ShopifyField {
                path: "no_such_field".to_string(),
            },
        ),
        (
            "description",
            MappingRule::ShopifyField {
                path: "variants[5].sku".to_string(),
            },
        ),
        (
            "condition",
            MappingRule::ShopifyField {
                path: "variants[x].sku".to_string(),
            },
        ),
    ]);
    let attrs = resolve_attributes(&settings, &sample_product());
    assert_eq!(attrs.title, "");
    assert_eq!(attrs.description, "");
    assert_eq!(attrs.condition, "");
}

#[test]
fn constant_and_formula_rules() {
    let settings = settings_with(&[
        (
            "condition",
            MappingRule::Constant {
                value: "Used - Excellent".to_string(),
            },
        ),
        (
            "description",
            MappingRule::Formula {
                expression: "CONCAT(title, body_html)".to_string(),
            },
        ),
    ]);
    let attrs = resolve_attributes(&settings, &sample_product());
    assert_eq!(attrs.condition, "Used - Excellent");
    // Formula expressions pass through unevaluated
    assert_eq!(attrs.description, "CONCAT(title, body_html)");
}

#[test]
fn edit_in_grid_and_absent_rules_resolve_empty() {
    let settings = settings_with(&[("title", MappingRule::EditInGrid)]);
    let attrs = resolve_attributes(&settings, &sample_product());
    assert_eq!(attrs.title, "");
    assert_eq!(attrs.description, "");
    assert_eq!(attrs.handling_time, "");
}

#[test]
fn category_fallback_from_product_type() {
    let settings = settings_with(&[]);
    let attrs = resolve_attributes(&settings, &sample_product());
    // "Film Camera" matches the "camera" keyword before "film"
    assert_eq!(attrs.category_id, "31388");
}

#[test]
fn category_fallback_is_case_insensitive_with_default() {
    assert_eq!(fallback_category("USB HEADPHONES").id, "112529");
    assert_eq!(fallback_category("Garden Gnome").id, "293");
    assert_eq!(fallback_category("").id, "293");
}

#[test]
fn explicit_category_rule_overrides_fallback() {
    let settings = settings_with(&[(
        "category",
        MappingRule::Constant {
            value: "162466".to_string(),
        },
    )]);
    let attrs = resolve_attributes(&settings, &sample_product());
    assert_eq!(attrs.category_id, "162466");
}

#[test]
fn category_specific_rule_beats_catch_all() {
    let mut settings = settings_with(&[(
        "condition",
        MappingRule::Constant {
            value: "Used - Good".to_string(),
        },
    )]);
    // The sample product resolves to category 31388 via the fallback
    settings.mappings.insert(
        "31388".to_string(),
        HashMap::from([(
            "condition".to_string(),
            MappingRule::Constant {
                value: "Used - Excellent".to_string(),
            },
        )]),
    );
    let attrs = resolve_attributes(&settings, &sample_product());
    assert_eq!(attrs.condition, "Used - Excellent");
}
