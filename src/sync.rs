//! Sync orchestration: drives products through the create/update/end
//! listing lifecycle against eBay.
//!
//! Batches run strictly sequentially. The sequencing is load-bearing: it
//! enforces the outbound rate ceiling and guarantees that no two operations
//! race to create a mapping for the same product within a run.

use std::collections::HashSet;
use std::time::Duration;

use rusqlite::Connection;

use crate::attributes::resolve_attributes;
use crate::ebay::EbayApi;
use crate::error::{Result, SyncError};
use crate::mapper;
use crate::settings::SyncSettings;
use crate::shopify::{ShopifyClient, ShopifyProduct, ShopifyVariant};
use crate::store::{self, MappingStatus};

/// Pacing between whole-product operations. eBay allows 5 requests per
/// second outbound and each product issues several calls.
const ITEM_DELAY: Duration = Duration::from_millis(200);

/// Per-run options for the batch driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Validate and log intent without issuing any eBay call
    pub dry_run: bool,
    /// Create the offer but skip publishing
    pub draft: bool,
}

/// Accumulated outcome of one batch run.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<SyncFailure>,
}

#[derive(Debug)]
pub struct SyncFailure {
    pub product_id: String,
    pub message: String,
}

/// Outcome of the per-product update entry point.
#[derive(Debug)]
pub struct UpdateOutcome {
    pub success: bool,
    /// Names of the resources that were touched
    pub updated: Vec<String>,
}

/// Outcome of the per-product end entry point.
#[derive(Debug)]
pub struct EndOutcome {
    pub success: bool,
    pub error: Option<String>,
}

/// Outcome classes of one create attempt. "Already mapped" is an error
/// variant (`SyncError::AlreadyMapped`) so the batch fold can classify it
/// as a skip.
enum CreateOutcome {
    Created { listing_id: String },
    DryRun,
}

/// Drives products through the listing lifecycle. One instance per run;
/// every dependency is injected through the constructor.
pub struct SyncEngine {
    shopify: ShopifyClient,
    ebay: EbayApi,
    conn: Connection,
    settings: SyncSettings,
}

impl SyncEngine {
    pub fn new(
        shopify: ShopifyClient,
        ebay: EbayApi,
        conn: Connection,
        settings: SyncSettings,
    ) -> Self {
        Self {
            shopify,
            ebay,
            conn,
            settings,
        }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// The underlying database handle, for display surfaces.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Sync a list of products to eBay, one at a time.
    ///
    /// A single product's failure never aborts the batch: every outcome
    /// becomes a counter bump and, for failures, an (id, message) entry.
    pub async fn sync_products(&self, ids: &[u64], options: &SyncOptions) -> SyncReport {
        let mut report = SyncReport::default();

        for (i, product_id) in ids.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(ITEM_DELAY).await;
            }
            report.processed += 1;

            match self.create_listing(*product_id, options).await {
                Ok(CreateOutcome::Created { listing_id }) => {
                    log::info!("Product {product_id}: created eBay listing {listing_id}");
                    report.created += 1;
                }
                Ok(CreateOutcome::DryRun) => {
                    report.created += 1;
                }
                Err(err) if err.is_skip() => {
                    log::info!("Skipping product {product_id}: {err}");
                    report.skipped += 1;
                }
                Err(err) => {
                    let message = err.to_string();
                    log::warn!("Sync failed for product {product_id}: {message}");
                    if let Err(db_err) =
                        store::insert_log(&self.conn, &product_id.to_string(), "failed", &message)
                    {
                        log::error!("Failed to write sync log for {product_id}: {db_err}");
                    }
                    report.failed += 1;
                    report.errors.push(SyncFailure {
                        product_id: product_id.to_string(),
                        message,
                    });
                }
            }
        }

        log::info!(
            "Batch done: {} processed, {} created, {} skipped, {} failed",
            report.processed,
            report.created,
            report.skipped,
            report.failed
        );
        report
    }

    /// Create one listing: precondition checks, payload build, then the
    /// ordered eBay call sequence.
    async fn create_listing(&self, product_id: u64, options: &SyncOptions) -> Result<CreateOutcome> {
        let id_str = product_id.to_string();

        // Existence check before anything else: one mapping per product.
        if store::get_mapping(&self.conn, &id_str)?.is_some() {
            return Err(SyncError::AlreadyMapped(id_str));
        }

        let product = self.shopify.get_product(product_id).await?;
        let variant = validate_product(&product)?;
        let attrs = resolve_attributes(&self.settings, &product);

        if options.dry_run {
            // A dry run must not touch eBay, so it settles for whatever
            // policies are already cached; the placeholders only reach logs.
            let policies = self.ebay.cached_policies().await.unwrap_or_default();
            let (_, offer) =
                mapper::build_listing(&product, variant, &attrs, &policies, &self.settings);
            let detail = format!(
                "[dry run] would create {} listing for SKU {} in category {}",
                if options.draft { "draft" } else { "published" },
                offer.sku,
                offer.category_id
            );
            log::info!("{detail}");
            store::insert_log(&self.conn, &id_str, "success", &detail)?;
            return Ok(CreateOutcome::DryRun);
        }

        let policies = self.ebay.selling_policies().await?;
        let (item, offer) =
            mapper::build_listing(&product, variant, &attrs, &policies, &self.settings);

        self.ebay
            .ensure_location(
                &self.settings.merchant_location_key,
                &self.settings.merchant_address,
            )
            .await?;

        // Inventory item writes are idempotent and safe to redo.
        self.ebay.upsert_inventory_item(&offer.sku, &item).await?;

        // Offer creation is not; a previously interrupted run can leave an
        // offer behind for this SKU. Remove leftovers before creating.
        for orphan in self.ebay.offers_for_sku(&offer.sku).await? {
            log::warn!(
                "Deleting orphaned offer {} for SKU {}",
                orphan.offer_id,
                offer.sku
            );
            self.ebay.delete_offer(&orphan.offer_id).await?;
        }

        let offer_id = self.ebay.create_offer(&offer).await?;
        let (listing_id, status) = if options.draft {
            (format!("draft-{offer_id}"), MappingStatus::Draft)
        } else {
            (self.ebay.publish_offer(&offer_id).await?, MappingStatus::Active)
        };

        store::insert_mapping(
            &self.conn,
            &id_str,
            &listing_id,
            &offer.sku,
            status,
            &item.product.title,
            &offer.pricing_summary.price.value,
        )?;
        store::insert_log(
            &self.conn,
            &id_str,
            "success",
            &format!("created eBay listing {listing_id} for SKU {}", offer.sku),
        )?;

        Ok(CreateOutcome::Created { listing_id })
    }

    /// Push the current Shopify state of an already-listed product to eBay.
    ///
    /// The inventory item is replaced; an existing offer is updated in
    /// place so the listing keeps its history (watchers, search ranking).
    pub async fn update_product(&self, product_id: u64) -> Result<UpdateOutcome> {
        let id_str = product_id.to_string();
        match self.try_update(product_id, &id_str).await {
            Ok(updated) => {
                store::insert_log(
                    &self.conn,
                    &id_str,
                    "success",
                    &format!("updated {}", updated.join(", ")),
                )?;
                log::info!("Product {product_id}: updated {}", updated.join(", "));
                Ok(UpdateOutcome {
                    success: true,
                    updated,
                })
            }
            Err(err) => {
                log::warn!("Update failed for product {product_id}: {err}");
                if let Err(db_err) =
                    store::insert_log(&self.conn, &id_str, "failed", &err.to_string())
                {
                    log::error!("Failed to write sync log for {product_id}: {db_err}");
                }
                Err(err)
            }
        }
    }

    async fn try_update(&self, product_id: u64, id_str: &str) -> Result<Vec<String>> {
        let mapping = store::get_mapping(&self.conn, id_str)?.ok_or_else(|| {
            SyncError::Validation(format!("product {product_id} has no eBay listing to update"))
        })?;
        if mapping.status == MappingStatus::Ended {
            return Err(SyncError::Validation(format!(
                "listing for product {product_id} has ended"
            )));
        }

        let product = self.shopify.get_product(product_id).await?;
        let variant = product.variants.first().ok_or_else(|| {
            SyncError::Validation(format!("product {product_id} has no variants"))
        })?;
        if variant.sku.trim().is_empty() {
            return Err(SyncError::Validation(format!(
                "variant of product {product_id} has no SKU"
            )));
        }

        let attrs = resolve_attributes(&self.settings, &product);
        let policies = self.ebay.selling_policies().await?;
        let (item, offer) =
            mapper::build_listing(&product, variant, &attrs, &policies, &self.settings);

        self.ebay.upsert_inventory_item(&offer.sku, &item).await?;
        let mut updated = vec!["inventory_item".to_string()];

        if let Some(existing) = self.ebay.offers_for_sku(&offer.sku).await?.first() {
            let update = mapper::update_request_from(&offer);
            self.ebay.update_offer(&existing.offer_id, &update).await?;
            updated.push("offer".to_string());
        }

        store::update_mapping_fields(
            &self.conn,
            id_str,
            &item.product.title,
            &offer.pricing_summary.price.value,
            &offer.sku,
        )?;
        updated.push("mapping".to_string());
        Ok(updated)
    }

    /// Take a listing off eBay and mark its mapping ended.
    ///
    /// Ending is terminal: a second call reports a non-fatal error without
    /// touching eBay. An offer eBay already considers unpublished counts
    /// as ended.
    pub async fn end_listing(&self, product_id: u64) -> EndOutcome {
        let id_str = product_id.to_string();
        match self.try_end(product_id, &id_str).await {
            Ok(detail) => {
                if let Err(db_err) = store::insert_log(&self.conn, &id_str, "success", &detail) {
                    log::error!("Failed to write sync log for {product_id}: {db_err}");
                }
                log::info!("Product {product_id}: {detail}");
                EndOutcome {
                    success: true,
                    error: None,
                }
            }
            Err(err) => {
                let message = err.to_string();
                log::warn!("End failed for product {product_id}: {message}");
                if let Err(db_err) = store::insert_log(&self.conn, &id_str, "failed", &message) {
                    log::error!("Failed to write sync log for {product_id}: {db_err}");
                }
                EndOutcome {
                    success: false,
                    error: Some(message),
                }
            }
        }
    }

    async fn try_end(&self, product_id: u64, id_str: &str) -> Result<String> {
        let mapping = store::get_mapping(&self.conn, id_str)?.ok_or_else(|| {
            SyncError::Validation(format!("product {product_id} has no eBay listing to end"))
        })?;
        if mapping.status == MappingStatus::Ended {
            return Err(SyncError::Validation(format!(
                "listing for product {product_id} is already ended"
            )));
        }

        let offers = self.ebay.offers_for_sku(&mapping.sku).await?;
        if offers.is_empty() {
            log::info!(
                "No live offers for SKU {}; listing is already off eBay",
                mapping.sku
            );
        }
        for offer in &offers {
            self.ebay.withdraw_offer(&offer.offer_id).await?;
        }

        store::mark_ended(&self.conn, id_str)?;
        Ok(format!("ended eBay listing {}", mapping.ebay_listing_id))
    }

    /// List active Shopify products and sync the ones without a mapping.
    /// A no-op when auto-sync is disabled or every product is mapped.
    pub async fn auto_sync_new_products(&self, options: &SyncOptions) -> Result<SyncReport> {
        if !self.settings.auto_sync_enabled {
            log::debug!("Auto-sync disabled; nothing to do");
            return Ok(SyncReport::default());
        }

        let products = self
            .shopify
            .list_products("active", self.settings.auto_sync_limit)
            .await?;
        let mapped: HashSet<String> = store::mapped_product_ids(&self.conn)?.into_iter().collect();
        let candidates: Vec<u64> = products
            .iter()
            .map(|p| p.id)
            .filter(|id| !mapped.contains(&id.to_string()))
            .collect();

        if candidates.is_empty() {
            log::info!("Auto-sync: no unmapped active products");
            return Ok(SyncReport::default());
        }

        log::info!("Auto-sync: {} unmapped products to sync", candidates.len());
        Ok(self.sync_products(&candidates, options).await)
    }
}

/// Create preconditions, checked before any eBay call. Each violation is a
/// fast, descriptive, non-fatal error.
fn validate_product(product: &ShopifyProduct) -> Result<&ShopifyVariant> {
    if product.status != "active" {
        return Err(SyncError::Validation(format!(
            "product {} is not active on Shopify (status: {})",
            product.id, product.status
        )));
    }
    if product.variants.len() > 1 {
        return Err(SyncError::Validation(format!(
            "product {} has {} variants; multi-variant products are not supported",
            product.id,
            product.variants.len()
        )));
    }
    let variant = product.variants.first().ok_or_else(|| {
        SyncError::Validation(format!("product {} has no variants", product.id))
    })?;
    if variant.sku.trim().is_empty() {
        return Err(SyncError::Validation(format!(
            "product {} has no SKU on its variant",
            product.id
        )));
    }
    if variant.inventory_quantity <= 0 {
        return Err(SyncError::Validation(format!(
            "product {} is out of stock",
            product.id
        )));
    }
    if !product.images.iter().any(|i| !i.src.trim().is_empty()) {
        return Err(SyncError::Validation(format!(
            "product {} has no images",
            product.id
        )));
    }
    Ok(variant)
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
