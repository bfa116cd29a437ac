//! Database operations for product mappings and the sync audit log
//!
//! Uses parameterized queries exclusively for security (no SQL string
//! concatenation). Mapping rows are never deleted; their status only
//! advances forward.

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

/// Result type for database operations
pub type DbResult<T> = rusqlite::Result<T>;

/// Lifecycle status of a product mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingStatus {
    Active,
    Draft,
    Ended,
}

impl MappingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingStatus::Active => "active",
            MappingStatus::Draft => "draft",
            MappingStatus::Ended => "ended",
        }
    }

    fn from_str(value: &str) -> Self {
        match value {
            "active" => MappingStatus::Active,
            "draft" => MappingStatus::Draft,
            _ => MappingStatus::Ended,
        }
    }
}

/// The persisted association between one Shopify product and its eBay
/// listing, with display fields cached for listing without a re-fetch.
#[derive(Debug, Clone)]
pub struct ProductMapping {
    pub shopify_product_id: String,
    pub ebay_listing_id: String,
    pub sku: String,
    pub status: MappingStatus,
    pub title: String,
    pub price: String,
    pub created_at: String,
    pub updated_at: String,
}

/// One immutable row of the sync audit trail.
#[derive(Debug, Clone)]
pub struct SyncLogEntry {
    pub direction: String,
    pub entity_type: String,
    pub entity_id: String,
    pub status: String,
    pub detail: String,
    pub created_at: String,
}

/// Initialize the database schema
///
/// Creates tables if they don't exist:
/// - `product_mappings`: one row per synced product
/// - `sync_logs`: append-only audit trail of sync attempts
pub fn init_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS product_mappings (
            shopify_product_id TEXT PRIMARY KEY,
            ebay_listing_id TEXT NOT NULL,
            sku TEXT NOT NULL,
            status TEXT NOT NULL,
            title TEXT NOT NULL,
            price TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_mappings_status ON product_mappings(status);
        CREATE INDEX IF NOT EXISTS idx_mappings_sku ON product_mappings(sku);

        CREATE TABLE IF NOT EXISTS sync_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            direction TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            status TEXT NOT NULL,
            detail TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sync_logs_entity ON sync_logs(entity_type, entity_id);
        ",
    )?;

    log::info!("Database schema initialized");
    Ok(())
}

/// RFC 3339 UTC timestamp for new and updated rows.
fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Look up the mapping for a Shopify product, if one exists.
pub fn get_mapping(conn: &Connection, shopify_product_id: &str) -> DbResult<Option<ProductMapping>> {
    conn.query_row(
        "SELECT shopify_product_id, ebay_listing_id, sku, status, title, price,
                created_at, updated_at
         FROM product_mappings WHERE shopify_product_id = ?1",
        params![shopify_product_id],
        |row| {
            let status: String = row.get(3)?;
            Ok(ProductMapping {
                shopify_product_id: row.get(0)?,
                ebay_listing_id: row.get(1)?,
                sku: row.get(2)?,
                status: MappingStatus::from_str(&status),
                title: row.get(4)?,
                price: row.get(5)?,
                created_at: row.get(6)?,
                updated_at: row.get(7)?,
            })
        },
    )
    .optional()
}

/// Insert a new mapping. Fails on a duplicate product id; callers check
/// existence first, which is also what keeps creates single-shot.
pub fn insert_mapping(
    conn: &Connection,
    shopify_product_id: &str,
    ebay_listing_id: &str,
    sku: &str,
    status: MappingStatus,
    title: &str,
    price: &str,
) -> DbResult<()> {
    let now = now_utc();
    conn.execute(
        "INSERT INTO product_mappings
         (shopify_product_id, ebay_listing_id, sku, status, title, price, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            shopify_product_id,
            ebay_listing_id,
            sku,
            status.as_str(),
            title,
            price,
            now
        ],
    )?;
    Ok(())
}

/// Refresh the cached display fields after a successful update.
pub fn update_mapping_fields(
    conn: &Connection,
    shopify_product_id: &str,
    title: &str,
    price: &str,
    sku: &str,
) -> DbResult<()> {
    conn.execute(
        "UPDATE product_mappings
         SET title = ?2, price = ?3, sku = ?4, updated_at = ?5
         WHERE shopify_product_id = ?1",
        params![shopify_product_id, title, price, sku, now_utc()],
    )?;
    Ok(())
}

/// Advance a mapping to its terminal ended state.
pub fn mark_ended(conn: &Connection, shopify_product_id: &str) -> DbResult<()> {
    conn.execute(
        "UPDATE product_mappings SET status = 'ended', updated_at = ?2
         WHERE shopify_product_id = ?1",
        params![shopify_product_id, now_utc()],
    )?;
    Ok(())
}

/// All product ids that already have a mapping, for auto-sync filtering.
pub fn mapped_product_ids(conn: &Connection) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT shopify_product_id FROM product_mappings")?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    rows.collect()
}

/// All mappings, newest first, for display surfaces.
pub fn list_mappings(conn: &Connection) -> DbResult<Vec<ProductMapping>> {
    let mut stmt = conn.prepare(
        "SELECT shopify_product_id, ebay_listing_id, sku, status, title, price,
                created_at, updated_at
         FROM product_mappings ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        let status: String = row.get(3)?;
        Ok(ProductMapping {
            shopify_product_id: row.get(0)?,
            ebay_listing_id: row.get(1)?,
            sku: row.get(2)?,
            status: MappingStatus::from_str(&status),
            title: row.get(4)?,
            price: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    })?;
    rows.collect()
}

/// Append one audit row. Log rows are never mutated or deleted.
pub fn insert_log(
    conn: &Connection,
    entity_id: &str,
    status: &str,
    detail: &str,
) -> DbResult<()> {
    conn.execute(
        "INSERT INTO sync_logs (direction, entity_type, entity_id, status, detail, created_at)
         VALUES ('shopify_to_ebay', 'product', ?1, ?2, ?3, ?4)",
        params![entity_id, status, detail, now_utc()],
    )?;
    Ok(())
}

/// The most recent audit rows, newest first.
pub fn recent_logs(conn: &Connection, limit: u32) -> DbResult<Vec<SyncLogEntry>> {
    let mut stmt = conn.prepare(
        "SELECT direction, entity_type, entity_id, status, detail, created_at
         FROM sync_logs ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        Ok(SyncLogEntry {
            direction: row.get(0)?,
            entity_type: row.get(1)?,
            entity_id: row.get(2)?,
            status: row.get(3)?,
            detail: row.get(4)?,
            created_at: row.get(5)?,
        })
    })?;
    rows.collect()
}
