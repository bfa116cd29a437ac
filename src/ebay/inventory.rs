//! Inventory item and fulfillment location endpoints.

use serde::{Deserialize, Serialize};

use super::EbayApi;
use crate::error::Result;
use crate::settings::MerchantAddress;

/// Inventory item payload, keyed by SKU on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub availability: Availability,
    pub condition: String,
    pub product: InventoryProduct,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_weight_and_size: Option<PackageWeight>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub ship_to_location_availability: ShipToLocationAvailability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipToLocationAvailability {
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryProduct {
    pub title: String,
    pub description: String,
    pub brand: String,
    pub mpn: String,
    pub upc: Vec<String>,
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageWeight {
    pub weight: Weight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weight {
    pub value: f64,
    /// "POUND" or "KILOGRAM"
    pub unit: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LocationRequest<'a> {
    name: &'a str,
    merchant_location_status: &'static str,
    location_types: Vec<&'static str>,
    location: LocationDetails<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LocationDetails<'a> {
    address: LocationAddress<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LocationAddress<'a> {
    address_line1: &'a str,
    city: &'a str,
    state_or_province: &'a str,
    postal_code: &'a str,
    country: &'a str,
}

impl<'a> From<&'a MerchantAddress> for LocationAddress<'a> {
    fn from(address: &'a MerchantAddress) -> Self {
        Self {
            address_line1: &address.address_line1,
            city: &address.city,
            state_or_province: &address.state_or_province,
            postal_code: &address.postal_code,
            country: &address.country,
        }
    }
}

impl EbayApi {
    /// Create or fully replace the inventory item for a SKU.
    ///
    /// This call is idempotent on the eBay side and safe to retry.
    pub async fn upsert_inventory_item(&self, sku: &str, item: &InventoryItem) -> Result<()> {
        let url = format!("{}/sell/inventory/v1/inventory_item/{}", self.base_url, sku);
        log::debug!("Upserting inventory item for SKU {sku}");

        let response = self
            .client
            .put(&url)
            .header("Authorization", self.bearer())
            .header("Content-Language", "en-US")
            .json(item)
            .send()
            .await?;

        Self::check(response, "upsert inventory item").await?;
        Ok(())
    }

    /// Read the inventory item stored for a SKU, if any.
    pub async fn get_inventory_item(&self, sku: &str) -> Result<Option<InventoryItem>> {
        let url = format!("{}/sell/inventory/v1/inventory_item/{}", self.base_url, sku);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.bearer())
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check(response, "get inventory item").await?;
        Ok(Some(response.json().await?))
    }

    /// Make sure the fulfillment location exists, creating it from the
    /// merchant address when eBay reports it absent.
    pub async fn ensure_location(&self, key: &str, address: &MerchantAddress) -> Result<()> {
        let url = format!("{}/sell/inventory/v1/location/{}", self.base_url, key);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.bearer())
            .send()
            .await?;

        if response.status().is_success() {
            log::debug!("Fulfillment location {key} exists");
            return Ok(());
        }
        if response.status() != reqwest::StatusCode::NOT_FOUND {
            Self::check(response, "get location").await?;
            return Ok(());
        }

        log::info!("Fulfillment location {key} missing, creating it");
        let payload = LocationRequest {
            name: key,
            merchant_location_status: "ENABLED",
            location_types: vec!["WAREHOUSE"],
            location: LocationDetails {
                address: address.into(),
            },
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bearer())
            .json(&payload)
            .send()
            .await?;

        Self::check(response, "create location").await?;
        Ok(())
    }
}
