//! Error types for listing_sync

use thiserror::Error;

/// Unified error type for sync operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// A precondition on the product failed; no marketplace call was made
    #[error("{0}")]
    Validation(String),
    /// The product already has an eBay listing (classified as a skip, not a failure)
    #[error("product {0} already has an eBay listing")]
    AlreadyMapped(String),
    /// HTTP request failed (network error, timeout, etc.)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Remote API returned an error status
    #[error("{operation} failed: {status} - {body}")]
    Api {
        operation: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Failed to parse a JSON response
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SyncError {
    /// True for outcomes that should count as skipped rather than failed.
    pub fn is_skip(&self) -> bool {
        matches!(self, SyncError::AlreadyMapped(_))
    }
}

/// Result alias for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;
