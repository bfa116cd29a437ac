//! Offer lifecycle endpoints: create, update, publish, withdraw, list, delete.
//!
//! Offer creation is NOT idempotent; callers are expected to clean up
//! leftover offers for a SKU before creating a new one.

use serde::{Deserialize, Serialize};

use super::EbayApi;
use crate::error::{Result, SyncError};

/// eBay error id for withdrawing an offer that is already unpublished.
const OFFER_NOT_AVAILABLE: u32 = 25_713;

/// The three seller business-policy ids referenced by every offer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPolicies {
    pub fulfillment_policy_id: String,
    pub payment_policy_id: String,
    pub return_policy_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSummary {
    pub price: Price,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    /// Decimal string with exactly two fraction digits
    pub value: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfferRequest {
    pub sku: String,
    pub marketplace_id: String,
    pub format: &'static str,
    pub available_quantity: u32,
    pub category_id: String,
    pub listing_description: String,
    pub merchant_location_key: String,
    pub pricing_summary: PricingSummary,
    pub listing_policies: ListingPolicies,
}

/// Full-replace update; sku and marketplace are fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOfferRequest {
    pub format: &'static str,
    pub available_quantity: u32,
    pub category_id: String,
    pub listing_description: String,
    pub merchant_location_key: String,
    pub pricing_summary: PricingSummary,
    pub listing_policies: ListingPolicies,
}

/// An offer as returned by the list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub offer_id: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub marketplace_id: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct OffersEnvelope {
    #[serde(default)]
    offers: Vec<Offer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOfferResponse {
    offer_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    listing_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<EbayError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EbayError {
    #[serde(default)]
    error_id: u32,
    #[serde(default)]
    message: String,
}

impl EbayApi {
    /// Create a new offer; returns the offer id.
    pub async fn create_offer(&self, request: &CreateOfferRequest) -> Result<String> {
        let url = format!("{}/sell/inventory/v1/offer", self.base_url);
        log::debug!("Creating offer for SKU {}", request.sku);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bearer())
            .header("Content-Language", "en-US")
            .header("X-EBAY-C-MARKETPLACE-ID", &self.marketplace_id)
            .json(request)
            .send()
            .await?;

        let response = Self::check(response, "create offer").await?;
        let created: CreateOfferResponse = response.json().await?;
        Ok(created.offer_id)
    }

    /// Replace an existing offer in place, preserving its listing history.
    pub async fn update_offer(&self, offer_id: &str, request: &UpdateOfferRequest) -> Result<()> {
        let url = format!("{}/sell/inventory/v1/offer/{}", self.base_url, offer_id);
        log::debug!("Updating offer {offer_id}");

        let response = self
            .client
            .put(&url)
            .header("Authorization", self.bearer())
            .header("Content-Language", "en-US")
            .json(request)
            .send()
            .await?;

        Self::check(response, "update offer").await?;
        Ok(())
    }

    /// Publish an offer; returns the live listing id.
    pub async fn publish_offer(&self, offer_id: &str) -> Result<String> {
        let url = format!(
            "{}/sell/inventory/v1/offer/{}/publish",
            self.base_url, offer_id
        );
        log::debug!("Publishing offer {offer_id}");

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bearer())
            .send()
            .await?;

        let response = Self::check(response, "publish offer").await?;
        let published: PublishResponse = response.json().await?;
        Ok(published.listing_id)
    }

    /// Take an offer off the marketplace.
    ///
    /// eBay reports error 25713 when the offer is already unpublished; the
    /// goal state is reached either way, so that case is a success.
    pub async fn withdraw_offer(&self, offer_id: &str) -> Result<()> {
        let url = format!(
            "{}/sell/inventory/v1/offer/{}/withdraw",
            self.base_url, offer_id
        );
        log::debug!("Withdrawing offer {offer_id}");

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bearer())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
            if let Some(err) = envelope
                .errors
                .iter()
                .find(|e| e.error_id == OFFER_NOT_AVAILABLE)
            {
                log::info!("Offer {offer_id} already unpublished: {}", err.message);
                return Ok(());
            }
        }

        log::error!("withdraw offer failed: {status} - {body}");
        Err(SyncError::Api {
            operation: "withdraw offer",
            status,
            body,
        })
    }

    /// List the offers that exist for a SKU. A 404 means none.
    pub async fn offers_for_sku(&self, sku: &str) -> Result<Vec<Offer>> {
        let url = format!("{}/sell/inventory/v1/offer", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.bearer())
            .query(&[("sku", sku)])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let response = Self::check(response, "list offers").await?;
        let envelope: OffersEnvelope = response.json().await?;
        Ok(envelope.offers)
    }

    /// Delete an unpublished offer.
    pub async fn delete_offer(&self, offer_id: &str) -> Result<()> {
        let url = format!("{}/sell/inventory/v1/offer/{}", self.base_url, offer_id);
        log::debug!("Deleting offer {offer_id}");

        let response = self
            .client
            .delete(&url)
            .header("Authorization", self.bearer())
            .send()
            .await?;

        Self::check(response, "delete offer").await?;
        Ok(())
    }
}
