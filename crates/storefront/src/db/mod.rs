//! Database operations for the catalog `PostgreSQL` store.
//!
//! # Schema: `catalog`
//!
//! ## Tables
//!
//! - `products` - Sellable items (soft-deleted via `deleted_at`)
//! - `variants` - Purchasable configurations, one `is_master` row per product
//! - `prices` - Per-currency variant prices
//! - `stock_items` - On-hand counts and backorder policy per stock location
//! - `images` - Variant images
//! - `option_types` / `option_values` - Axes of variation and their values
//! - `product_option_types` - Which option types a product varies by
//! - `properties` / `product_properties` - Named product annotations
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p pantry-cli -- migrate
//! ```

pub mod catalog;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub use catalog::{PgCatalogStore, insert_product};

/// Create a `PostgreSQL` connection pool.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
