//! Listing Sync - Shopify to eBay catalog mirroring
//!
//! Thin CLI shell around the sync engine: parses arguments, wires up the
//! clients and the database, and prints the batch report.

use clap::{Parser, Subcommand};
use listing_sync::shopify::ShopifyClient;
use listing_sync::{ebay::EbayApi, SyncEngine, SyncOptions, SyncReport, SyncSettings};
use rusqlite::Connection;
use std::path::PathBuf;

/// Shopify to eBay listing sync
#[derive(Parser, Debug)]
#[command(name = "listing_sync")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, default_value_t = default_db_path())]
    database: String,

    /// Path to a JSON settings file (defaults apply when omitted)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sync the given Shopify product ids to eBay
    Sync {
        /// Product ids to sync
        #[arg(required = true)]
        ids: Vec<u64>,

        /// Validate and log without touching eBay
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Create offers without publishing them
        #[arg(long, default_value_t = false)]
        draft: bool,
    },
    /// Push the current Shopify state of a listed product to eBay
    Update {
        /// Product id to update
        id: u64,
    },
    /// End the eBay listing for a product
    End {
        /// Product id whose listing should end
        id: u64,
    },
    /// Sync all unmapped active products (requires the settings flag)
    AutoSync {
        /// Validate and log without touching eBay
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Show the synced products and their cached listing fields
    Listings,
}

/// Returns the default database path: ~/.local/share/listing_sync/listings.db
fn default_db_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("listing_sync")
        .join("listings.db")
        .to_string_lossy()
        .to_string()
}

fn env_var(name: &str) -> String {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => {
            log::error!("Environment variable {name} is not set");
            std::process::exit(1);
        }
    }
}

fn print_report(report: &SyncReport) {
    log::info!(
        "Result: {} processed, {} created, {} updated, {} skipped, {} failed",
        report.processed,
        report.created,
        report.updated,
        report.skipped,
        report.failed
    );
    for failure in &report.errors {
        log::warn!("  {}: {}", failure.product_id, failure.message);
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let db_path = PathBuf::from(&args.database);

    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.exists() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::error!("Failed to create database directory: {}", e);
                std::process::exit(1);
            }
        }
    }

    let conn = match Connection::open(&db_path) {
        Ok(conn) => {
            log::info!("Opened database: {}", db_path.display());
            conn
        }
        Err(e) => {
            log::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = listing_sync::store::init_schema(&conn) {
        log::error!("Failed to initialize database schema: {}", e);
        std::process::exit(1);
    }

    let settings = match &args.settings {
        Some(path) => match SyncSettings::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("Failed to load settings: {}", e);
                std::process::exit(1);
            }
        },
        None => SyncSettings::default(),
    };

    if let Command::Listings = args.command {
        match listing_sync::store::list_mappings(&conn) {
            Ok(mappings) => {
                for m in mappings {
                    println!(
                        "{}\t{}\t{}\t{}\t{}",
                        m.shopify_product_id,
                        m.ebay_listing_id,
                        m.status.as_str(),
                        m.price,
                        m.title
                    );
                }
            }
            Err(e) => {
                log::error!("Failed to list mappings: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let shopify = ShopifyClient::new(
        &env_var("SHOPIFY_SHOP"),
        env_var("SHOPIFY_ACCESS_TOKEN"),
    );
    let ebay = EbayApi::new(env_var("EBAY_ACCESS_TOKEN"), settings.marketplace_id.clone());
    let engine = SyncEngine::new(shopify, ebay, conn, settings);

    match args.command {
        Command::Sync { ids, dry_run, draft } => {
            let options = SyncOptions { dry_run, draft };
            let report = engine.sync_products(&ids, &options).await;
            print_report(&report);
            if report.failed > 0 {
                std::process::exit(2);
            }
        }
        Command::Update { id } => match engine.update_product(id).await {
            Ok(outcome) => log::info!("Updated: {}", outcome.updated.join(", ")),
            Err(e) => {
                log::error!("Update failed: {}", e);
                std::process::exit(2);
            }
        },
        Command::End { id } => {
            let outcome = engine.end_listing(id).await;
            if !outcome.success {
                log::error!(
                    "End failed: {}",
                    outcome.error.unwrap_or_else(|| "unknown error".to_string())
                );
                std::process::exit(2);
            }
        }
        Command::AutoSync { dry_run } => {
            let options = SyncOptions {
                dry_run,
                draft: false,
            };
            match engine.auto_sync_new_products(&options).await {
                Ok(report) => print_report(&report),
                Err(e) => {
                    log::error!("Auto-sync failed: {}", e);
                    std::process::exit(2);
                }
            }
        }
        Command::Listings => unreachable!("handled above"),
    }
}
