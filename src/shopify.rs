//! Shopify Admin REST client for reading the source catalog
//!
//! Uses async reqwest for non-blocking HTTP requests. The catalog is
//! read-only from this crate's point of view; nothing is ever written back.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// A product as returned by the Shopify Admin API, with nested
/// variants and images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopifyProduct {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub body_html: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub product_type: String,
    /// "active", "draft" or "archived"
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub variants: Vec<ShopifyVariant>,
    #[serde(default)]
    pub images: Vec<ShopifyImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopifyVariant {
    pub id: u64,
    #[serde(default)]
    pub sku: String,
    /// Decimal string, e.g. "199.95"
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub inventory_quantity: i64,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    /// "lb", "kg", "oz" or "g"
    #[serde(default)]
    pub weight_unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopifyImage {
    #[serde(default)]
    pub src: String,
}

#[derive(Debug, Deserialize)]
struct ProductEnvelope {
    product: ShopifyProduct,
}

#[derive(Debug, Deserialize)]
struct ProductListEnvelope {
    products: Vec<ShopifyProduct>,
}

/// Client for the Shopify Admin REST API.
pub struct ShopifyClient {
    pub(crate) client: reqwest::Client,
    pub(crate) access_token: String,
    pub(crate) base_url: String,
}

impl ShopifyClient {
    /// Creates a client for the given shop, e.g. `my-store` ->
    /// `https://my-store.myshopify.com/admin/api/2024-01`.
    pub fn new(shop: &str, access_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token,
            base_url: format!("https://{shop}.myshopify.com/admin/api/2024-01"),
        }
    }

    /// Fetch one product by id, with nested variants and images.
    pub async fn get_product(&self, product_id: u64) -> Result<ShopifyProduct> {
        let url = format!("{}/products/{}.json", self.base_url, product_id);
        log::debug!("Fetching Shopify product {}", product_id);

        let response = self
            .client
            .get(&url)
            .header("X-Shopify-Access-Token", &self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::Api {
                operation: "fetch product",
                status: response.status(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let envelope: ProductEnvelope = response.json().await?;
        Ok(envelope.product)
    }

    /// Fetch one page of products matching a status filter.
    pub async fn list_products(&self, status: &str, limit: u32) -> Result<Vec<ShopifyProduct>> {
        let url = format!("{}/products.json", self.base_url);
        log::debug!("Listing Shopify products (status={}, limit={})", status, limit);

        let limit = limit.to_string();
        let response = self
            .client
            .get(&url)
            .header("X-Shopify-Access-Token", &self.access_token)
            .query(&[("status", status), ("limit", limit.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::Api {
                operation: "list products",
                status: response.status(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let envelope: ProductListEnvelope = response.json().await?;
        Ok(envelope.products)
    }
}

#[cfg(test)]
#[path = "shopify_tests.rs"]
mod tests;
