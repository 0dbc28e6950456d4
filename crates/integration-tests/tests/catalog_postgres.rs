//! Integration tests for the `PostgreSQL` catalog store.
//!
//! These tests require a `PostgreSQL` database at `STOREFRONT_DATABASE_URL`.
//! Migrations are applied and the demo catalog is seeded on first use.
//!
//! Run with: cargo test -p pantry-integration-tests -- --ignored

use pantry_core::{CurrencyCode, ProductId};
use pantry_storefront::catalog::{
    CatalogStore, FetchSpec, PRODUCT_SHOW, ProductResolver, ResolveError, StoreError, fixtures,
};
use pantry_storefront::db::{self, PgCatalogStore};
use pantry_storefront::serializer::serialize_product;
use secrecy::SecretString;

async fn seeded_store() -> PgCatalogStore {
    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .map(SecretString::from)
        .expect("STOREFRONT_DATABASE_URL not set");
    let pool = db::create_pool(&database_url, 2)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("../storefront/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    db::insert_product(&pool, &fixtures::blue_shirt())
        .await
        .expect("Failed to seed demo catalog");

    PgCatalogStore::new(pool, CurrencyCode::USD)
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at STOREFRONT_DATABASE_URL"]
async fn test_lookup_matches_fixture() {
    let store = seeded_store().await;

    let products = store
        .find_products_by_slug("blue-shirt", PRODUCT_SHOW.fetch())
        .await
        .expect("Lookup failed");
    assert_eq!(products, vec![fixtures::blue_shirt()]);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at STOREFRONT_DATABASE_URL"]
async fn test_resolve_and_serialize() {
    let store = seeded_store().await;
    let resolver = ProductResolver::new(&store, PRODUCT_SHOW.fetch());

    let product = resolver.resolve("42").await.expect("Resolve failed");
    let document = serialize_product(&product, PRODUCT_SHOW.output());
    assert_eq!(document.data.id, "42");
    assert_eq!(document.included.len(), 8);

    assert!(matches!(
        resolver.resolve("no-such-product").await,
        Err(ResolveError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at STOREFRONT_DATABASE_URL"]
async fn test_unfetched_relations_stay_unloaded() {
    let store = seeded_store().await;

    let products = store
        .find_products_by_id(ProductId::new(42), &FetchSpec::new())
        .await
        .expect("Lookup failed");
    let product = products.first().expect("Product 42 missing");
    assert!(!product.variants.is_loaded());
    assert_eq!(product.master_id, fixtures::blue_shirt().master_id);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL at STOREFRONT_DATABASE_URL"]
async fn test_unknown_relation_fails_before_query() {
    let store = seeded_store().await;

    let err = store
        .find_products_by_id(ProductId::new(42), &FetchSpec::new().leaf("reviews"))
        .await
        .expect_err("Unknown relation should fail");
    assert!(matches!(err, StoreError::UnknownRelation { .. }));
}
