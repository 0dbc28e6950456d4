//! Seed the catalog with demo products.
//!
//! Inserts the blue shirt (product 42, slug `blue-shirt`) with its variants,
//! prices, stock, images, option types, and properties. Products that already
//! exist are left untouched, so the command can be re-run safely.

use tracing::info;

use pantry_storefront::catalog::fixtures;
use pantry_storefront::db;

use super::{CommandError, database_url};

/// Insert the demo catalog.
///
/// # Errors
///
/// Returns `CommandError` if the URL is missing or any insert fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;
    let pool = db::create_pool(&database_url, 1).await?;
    info!("Connected to database");

    for product in [fixtures::blue_shirt()] {
        if db::insert_product(&pool, &product).await? {
            info!(product_id = %product.id, slug = ?product.slug, "Inserted product");
        } else {
            info!(product_id = %product.id, "Product already exists, skipping");
        }
    }

    info!("Seeding complete");
    Ok(())
}
