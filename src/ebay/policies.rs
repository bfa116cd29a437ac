//! Seller business-policy resolution with per-run caching.

use super::offers::ListingPolicies;
use super::EbayApi;
use crate::error::{Result, SyncError};

/// Cached policy ids. Empty until the first caller populates it; no TTL.
#[derive(Debug, Clone, Default)]
pub(crate) struct PolicyCache {
    pub(crate) policies: Option<ListingPolicies>,
}

impl EbayApi {
    /// Returns the seller's three business-policy ids, fetching them from
    /// the Account API on first use and reusing them for the rest of the run.
    pub async fn selling_policies(&self) -> Result<ListingPolicies> {
        {
            let cache = self.policy_cache.read().await;
            if let Some(policies) = &cache.policies {
                log::debug!("Using cached selling policies");
                return Ok(policies.clone());
            }
        }

        log::info!("Fetching seller business policies from eBay");
        let policies = ListingPolicies {
            fulfillment_policy_id: self
                .fetch_policy_id("fulfillment_policy", "fulfillmentPolicies", "fulfillmentPolicyId")
                .await?,
            payment_policy_id: self
                .fetch_policy_id("payment_policy", "paymentPolicies", "paymentPolicyId")
                .await?,
            return_policy_id: self
                .fetch_policy_id("return_policy", "returnPolicies", "returnPolicyId")
                .await?,
        };

        let mut cache = self.policy_cache.write().await;
        cache.policies = Some(policies.clone());
        Ok(policies)
    }

    /// The cached policies, if any caller has populated them this run.
    pub async fn cached_policies(&self) -> Option<ListingPolicies> {
        self.policy_cache.read().await.policies.clone()
    }

    /// Drops the cached policy ids so the next caller re-fetches them.
    pub async fn invalidate_policies(&self) {
        let mut cache = self.policy_cache.write().await;
        cache.policies = None;
        log::debug!("Selling-policy cache invalidated");
    }

    async fn fetch_policy_id(
        &self,
        endpoint: &'static str,
        list_field: &'static str,
        id_field: &'static str,
    ) -> Result<String> {
        let url = format!("{}/sell/account/v1/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.bearer())
            .query(&[("marketplace_id", &self.marketplace_id)])
            .send()
            .await?;

        let response = Self::check(response, "fetch policies").await?;
        let json: serde_json::Value = response.json().await?;

        json[list_field]
            .get(0)
            .and_then(|policy| policy[id_field].as_str())
            .map(|id| id.to_string())
            .ok_or_else(|| {
                SyncError::Validation(format!(
                    "no {endpoint} configured for marketplace {}",
                    self.marketplace_id
                ))
            })
    }
}
