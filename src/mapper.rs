//! Pure transform from a Shopify product into eBay listing payloads.
//!
//! No I/O happens here: the selling policies are an explicit input, so the
//! output is byte-identical for identical inputs.

use crate::attributes::ResolvedAttributes;
use crate::ebay::{
    Availability, CreateOfferRequest, InventoryItem, InventoryProduct, ListingPolicies,
    PackageWeight, Price, PricingSummary, ShipToLocationAvailability, UpdateOfferRequest, Weight,
};
use crate::settings::SyncSettings;
use crate::shopify::{ShopifyProduct, ShopifyVariant};

/// eBay caps listing descriptions at 2000 characters.
const MAX_DESCRIPTION_CHARS: usize = 2000;
/// eBay caps picture galleries at 12 images.
const MAX_IMAGES: usize = 12;
/// Placeholder eBay accepts for absent product identifiers.
const NOT_APPLICABLE: &str = "Does Not Apply";
const DEFAULT_BRAND: &str = "Unbranded";
const DEFAULT_CONDITION: &str = "USED_EXCELLENT";

/// Build the inventory item and offer payloads for one product variant.
pub fn build_listing(
    product: &ShopifyProduct,
    variant: &ShopifyVariant,
    attrs: &ResolvedAttributes,
    policies: &ListingPolicies,
    settings: &SyncSettings,
) -> (InventoryItem, CreateOfferRequest) {
    let title = if attrs.title.is_empty() {
        product.title.clone()
    } else {
        attrs.title.clone()
    };
    let description = truncate_description(if attrs.description.is_empty() {
        &product.body_html
    } else {
        &attrs.description
    });
    let quantity = clamp_quantity(variant.inventory_quantity);

    let item = InventoryItem {
        availability: Availability {
            ship_to_location_availability: ShipToLocationAvailability { quantity },
        },
        condition: map_condition(&attrs.condition).to_string(),
        product: InventoryProduct {
            title,
            description: description.clone(),
            brand: map_brand(&product.vendor),
            mpn: mpn_from_sku(&variant.sku),
            upc: vec![normalize_identifier(&attrs.identifier)],
            image_urls: normalize_images(product.images.iter().map(|i| i.src.as_str())),
        },
        package_weight_and_size: package_from_variant(variant),
    };

    let offer = CreateOfferRequest {
        sku: variant.sku.clone(),
        marketplace_id: settings.marketplace_id.clone(),
        format: "FIXED_PRICE",
        available_quantity: quantity,
        category_id: attrs.category_id.clone(),
        listing_description: description,
        merchant_location_key: settings.merchant_location_key.clone(),
        pricing_summary: PricingSummary {
            price: Price {
                value: format_price(&variant.price),
                currency: settings.currency.clone(),
            },
        },
        listing_policies: policies.clone(),
    };

    (item, offer)
}

/// Derive the in-place update payload from a create payload.
pub fn update_request_from(offer: &CreateOfferRequest) -> UpdateOfferRequest {
    UpdateOfferRequest {
        format: offer.format,
        available_quantity: offer.available_quantity,
        category_id: offer.category_id.clone(),
        listing_description: offer.listing_description.clone(),
        merchant_location_key: offer.merchant_location_key.clone(),
        pricing_summary: offer.pricing_summary.clone(),
        listing_policies: offer.listing_policies.clone(),
    }
}

/// Cap a description at 2000 characters, ending truncated text with "...".
fn truncate_description(description: &str) -> String {
    if description.chars().count() <= MAX_DESCRIPTION_CHARS {
        return description.to_string();
    }
    let mut truncated: String = description.chars().take(MAX_DESCRIPTION_CHARS - 3).collect();
    truncated.push_str("...");
    truncated
}

/// Drop blank URLs, force every remaining URL onto https, keep the first 12.
fn normalize_images<'a>(urls: impl Iterator<Item = &'a str>) -> Vec<String> {
    urls.map(str::trim)
        .filter(|url| !url.is_empty())
        .map(force_https)
        .take(MAX_IMAGES)
        .collect()
}

fn force_https(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("http://") {
        format!("https://{rest}")
    } else if let Some(rest) = url.strip_prefix("//") {
        format!("https://{rest}")
    } else if url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Fixed lookup from a free-text condition to the eBay condition enum.
/// Unknown values get the conservative "used, excellent" default.
fn map_condition(condition: &str) -> &'static str {
    match condition.to_lowercase().trim() {
        "new" | "brand new" => "NEW",
        "like new" => "LIKE_NEW",
        "open box" | "new other" => "NEW_OTHER",
        "refurbished" => "CERTIFIED_REFURBISHED",
        "used - excellent" | "excellent" => "USED_EXCELLENT",
        "used - very good" | "very good" => "USED_VERY_GOOD",
        "used - good" | "good" => "USED_GOOD",
        "used - acceptable" | "acceptable" => "USED_ACCEPTABLE",
        "for parts" | "for parts or not working" => "FOR_PARTS_OR_NOT_WORKING",
        _ => DEFAULT_CONDITION,
    }
}

/// All-zero identifier codes are a placeholder in the source data, in both
/// 12- and 13-digit forms; they and empty codes map to the eBay sentinel.
fn normalize_identifier(code: &str) -> String {
    let code = code.trim();
    let all_zeros =
        (code.len() == 12 || code.len() == 13) && code.chars().all(|c| c == '0');
    if code.is_empty() || all_zeros {
        NOT_APPLICABLE.to_string()
    } else {
        code.to_string()
    }
}

/// The SKU's trailing `-U<digits>` marker encodes an internal serial, not
/// manufacturer data; strip it to recover the part number.
fn mpn_from_sku(sku: &str) -> String {
    let stripped = match sku.rfind("-U") {
        Some(pos) => {
            let suffix = &sku[pos + 2..];
            if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
                &sku[..pos]
            } else {
                sku
            }
        }
        None => sku,
    };
    if stripped.is_empty() {
        NOT_APPLICABLE.to_string()
    } else {
        stripped.to_string()
    }
}

fn map_brand(vendor: &str) -> String {
    let vendor = vendor.trim();
    if vendor.is_empty() {
        DEFAULT_BRAND.to_string()
    } else {
        vendor.to_string()
    }
}

fn clamp_quantity(quantity: i64) -> u32 {
    quantity.max(0) as u32
}

fn format_price(price: &str) -> String {
    let amount: f64 = price.trim().parse().unwrap_or(0.0);
    format!("{amount:.2}")
}

fn package_from_variant(variant: &ShopifyVariant) -> Option<PackageWeight> {
    let weight = variant.weight.filter(|w| *w > 0.0)?;
    let unit = if variant.weight_unit == "kg" {
        "KILOGRAM"
    } else {
        "POUND"
    };
    Some(PackageWeight {
        weight: Weight {
            value: weight,
            unit: unit.to_string(),
        },
    })
}
