//! eBay Sell API client for listing management.
//!
//! Covers the Inventory API (inventory items, offers, locations) and the
//! Account API (business policies). The orchestrator receives this client
//! by constructor injection; tests point `base_url` at a mock server.

mod inventory;
mod offers;
mod policies;

use std::sync::Arc;
use tokio::sync::RwLock;

use reqwest::Client;

use crate::error::{Result, SyncError};
use policies::PolicyCache;

pub use inventory::{
    Availability, InventoryItem, InventoryProduct, PackageWeight, ShipToLocationAvailability,
    Weight,
};
pub use offers::{
    CreateOfferRequest, ListingPolicies, Offer, Price, PricingSummary, UpdateOfferRequest,
};

/// eBay Sell API client. One instance per sync run.
pub struct EbayApi {
    pub(crate) client: Client,
    pub(crate) access_token: String,
    pub(crate) base_url: String,
    pub(crate) marketplace_id: String,
    pub(crate) policy_cache: Arc<RwLock<PolicyCache>>,
}

impl EbayApi {
    /// Creates a new eBay API client with the given user access token.
    pub fn new(access_token: String, marketplace_id: String) -> Self {
        log::info!("Creating eBay API client for {marketplace_id}");
        Self {
            client: Client::new(),
            access_token,
            base_url: "https://api.ebay.com".to_string(),
            marketplace_id,
            policy_cache: Arc::new(RwLock::new(PolicyCache::default())),
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// Maps a non-success response to an `Api` error carrying the body text.
    pub(crate) async fn check(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            log::error!("{operation} failed: {status} - {body}");
            Err(SyncError::Api {
                operation,
                status,
                body,
            })
        }
    }
}

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;
