//! Listing Sync - Shopify to eBay catalog mirroring
//!
//! Keeps a merchant's Shopify catalog mirrored as eBay listings: decides
//! whether a product may be listed, maps it into eBay Inventory API
//! payloads, and drives the create/update/end lifecycle with recovery from
//! partial failures left by earlier runs.

pub mod attributes;
pub mod ebay;
pub mod error;
pub mod mapper;
pub mod settings;
pub mod shopify;
pub mod store;
pub mod sync;

pub use error::{Result, SyncError};
pub use settings::SyncSettings;
pub use sync::{EndOutcome, SyncEngine, SyncOptions, SyncReport, UpdateOutcome};
