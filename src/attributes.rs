//! Resolves configured mapping rules into concrete listing field values.
//!
//! Resolution is read-only: an explicit rule wins, a missing rule or a rule
//! pointing at a missing product field yields an empty string, and the
//! category falls back to a deterministic product-type lookup.

use serde_json::Value;

use crate::settings::{MappingRule, SyncSettings};
use crate::shopify::ShopifyProduct;

/// An eBay category reference (id plus display name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EbayCategory {
    pub id: &'static str,
    pub name: &'static str,
}

/// Product-type keyword -> category. Ordered; first match wins.
const CATEGORY_FALLBACKS: &[(&str, EbayCategory)] = &[
    ("camera", EbayCategory { id: "31388", name: "Digital Cameras" }),
    ("lens", EbayCategory { id: "3323", name: "Camera Lenses" }),
    ("tripod", EbayCategory { id: "30090", name: "Tripods & Supports" }),
    ("flash", EbayCategory { id: "79003", name: "Camera Flashes" }),
    ("bag", EbayCategory { id: "107894", name: "Camera Cases & Bags" }),
    ("film", EbayCategory { id: "625", name: "Cameras & Photo" }),
    ("headphone", EbayCategory { id: "112529", name: "Headphones" }),
    ("laptop", EbayCategory { id: "177", name: "PC Laptops & Netbooks" }),
    ("phone", EbayCategory { id: "9355", name: "Cell Phones & Smartphones" }),
];

/// Used when no keyword matches the product type.
const DEFAULT_CATEGORY: EbayCategory = EbayCategory {
    id: "293",
    name: "Consumer Electronics",
};

/// Concrete listing field values for one product, computed per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAttributes {
    pub title: String,
    pub description: String,
    pub condition: String,
    /// Product identifier code (UPC/EAN) as configured; may be empty
    pub identifier: String,
    pub handling_time: String,
    pub category_id: String,
}

/// Resolve all listing fields for a product.
///
/// The category comes first: its own rule can only live in the catch-all
/// set, and the resolved id selects the rule set for the other fields.
pub fn resolve_attributes(settings: &SyncSettings, product: &ShopifyProduct) -> ResolvedAttributes {
    // Serialize once; every rule path walks the same tree.
    let tree = serde_json::to_value(product).unwrap_or(Value::Null);

    let category_id = match resolve_field(settings, "*", "category", &tree) {
        value if value.is_empty() => {
            let fallback = fallback_category(&product.product_type);
            log::debug!(
                "No category rule for product {}; product type '{}' -> {} ({})",
                product.id,
                product.product_type,
                fallback.name,
                fallback.id
            );
            fallback.id.to_string()
        }
        value => value,
    };

    ResolvedAttributes {
        title: resolve_field(settings, &category_id, "title", &tree),
        description: resolve_field(settings, &category_id, "description", &tree),
        condition: resolve_field(settings, &category_id, "condition", &tree),
        identifier: resolve_field(settings, &category_id, "identifier", &tree),
        handling_time: resolve_field(settings, &category_id, "handling_time", &tree),
        category_id,
    }
}

/// Resolve a single field through the rule configured for a category.
///
/// Absence of a rule is not an error; it yields an empty string and the
/// caller decides whether empty is acceptable.
pub fn resolve_field(
    settings: &SyncSettings,
    category: &str,
    field: &str,
    product_tree: &Value,
) -> String {
    match settings.rule(category, field) {
        Some(MappingRule::ShopifyField { path }) => lookup_path(product_tree, path),
        Some(MappingRule::Constant { value }) => value.clone(),
        // Formulas are stored verbatim; this engine never evaluates them.
        Some(MappingRule::Formula { expression }) => expression.clone(),
        Some(MappingRule::EditInGrid) => String::new(),
        None => String::new(),
    }
}

/// Map a free-text product type to an eBay category.
pub fn fallback_category(product_type: &str) -> EbayCategory {
    let normalized = product_type.to_lowercase();
    for (keyword, category) in CATEGORY_FALLBACKS {
        if normalized.contains(keyword) {
            return category.clone();
        }
    }
    DEFAULT_CATEGORY
}

/// Walk a dotted path through the product tree, with one level of array
/// indexing per segment (`variants[0].sku`). Anything missing or
/// non-scalar degrades to an empty string.
fn lookup_path(tree: &Value, path: &str) -> String {
    let mut current = tree;
    for segment in path.split('.') {
        let (key, index) = parse_segment(segment);
        if key.is_empty() {
            return String::new();
        }
        current = match current.get(key) {
            Some(value) => value,
            None => return String::new(),
        };
        if let Some(i) = index {
            current = match current.get(i) {
                Some(value) => value,
                None => return String::new(),
            };
        }
    }
    scalar_to_string(current)
}

/// Split `variants[0]` into ("variants", Some(0)); plain segments return
/// (segment, None).
fn parse_segment(segment: &str) -> (&str, Option<usize>) {
    match segment.find('[') {
        Some(open) if segment.ends_with(']') => {
            let key = &segment[..open];
            let index = segment[open + 1..segment.len() - 1].parse().ok();
            match index {
                Some(i) => (key, Some(i)),
                None => ("", None),
            }
        }
        _ => (segment, None),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
#[path = "attributes_tests.rs"]
mod tests;
