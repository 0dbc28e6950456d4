//! Identifier → product resolution.
//!
//! The storefront accepts either a slug or a primary key in the same path
//! segment. Slugs win: the slug lookup runs first and the primary-key lookup
//! only runs when no single product owns that slug.

use thiserror::Error;
use tracing::{debug, instrument};

use pantry_core::ProductId;

use super::plan::FetchSpec;
use super::store::{CatalogStore, StoreError};
use crate::models::Product;

/// Errors from resolving a product identifier.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Neither the slug nor the primary-key lookup matched exactly one product.
    #[error("product not found: {0}")]
    NotFound(String),

    /// The store failed; not retried.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves identifiers against a store using one fetch spec for every lookup.
pub struct ProductResolver<'a> {
    store: &'a dyn CatalogStore,
    fetch: &'a FetchSpec,
}

impl<'a> ProductResolver<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn CatalogStore, fetch: &'a FetchSpec) -> Self {
        Self { store, fetch }
    }

    /// Resolve `identifier` to exactly one product.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::NotFound` when neither lookup yields exactly one
    /// product, and `ResolveError::Store` when the store fails.
    #[instrument(skip(self))]
    pub async fn resolve(&self, identifier: &str) -> Result<Product, ResolveError> {
        let by_slug = self
            .store
            .find_products_by_slug(identifier, self.fetch)
            .await?;
        if let Some(product) = exactly_one(by_slug) {
            debug!(product_id = %product.id, "Resolved product by slug");
            return Ok(product);
        }

        // Identifiers that can't be a primary key never reach the store.
        if let Ok(id) = identifier.parse::<ProductId>() {
            let by_id = self.store.find_products_by_id(id, self.fetch).await?;
            if let Some(product) = exactly_one(by_id) {
                debug!(product_id = %product.id, "Resolved product by id");
                return Ok(product);
            }
        }

        debug!("No product matched identifier");
        Err(ResolveError::NotFound(identifier.to_string()))
    }
}

fn exactly_one(mut matches: Vec<Product>) -> Option<Product> {
    if matches.len() == 1 {
        matches.pop()
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;
    use crate::catalog::memory::MemoryCatalogStore;
    use crate::catalog::plan::PRODUCT_SHOW;

    #[tokio::test]
    async fn test_resolves_by_slug() {
        let store = MemoryCatalogStore::with_products([fixtures::blue_shirt()]);
        let resolver = ProductResolver::new(&store, PRODUCT_SHOW.fetch());

        let product = resolver.resolve("blue-shirt").await.unwrap();
        assert_eq!(product.id, ProductId::new(42));
        assert_eq!(store.round_trips(), 1);
    }

    #[tokio::test]
    async fn test_falls_back_to_primary_key() {
        let store = MemoryCatalogStore::with_products([fixtures::blue_shirt()]);
        let resolver = ProductResolver::new(&store, PRODUCT_SHOW.fetch());

        let product = resolver.resolve("42").await.unwrap();
        assert_eq!(product.slug.as_deref(), Some("blue-shirt"));
        assert_eq!(store.round_trips(), 2);
    }

    #[tokio::test]
    async fn test_slug_wins_over_primary_key() {
        let store = MemoryCatalogStore::with_products([
            fixtures::product(7, Some("plain"), vec![]),
            fixtures::product(8, Some("7"), vec![]),
        ]);
        let resolver = ProductResolver::new(&store, PRODUCT_SHOW.fetch());

        let product = resolver.resolve("7").await.unwrap();
        assert_eq!(product.id, ProductId::new(8));
        assert_eq!(store.round_trips(), 1);
    }

    #[tokio::test]
    async fn test_not_found() {
        let store = MemoryCatalogStore::with_products([fixtures::blue_shirt()]);
        let resolver = ProductResolver::new(&store, PRODUCT_SHOW.fetch());

        let err = resolver.resolve("red-shirt").await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(ref id) if id == "red-shirt"));
        // "red-shirt" is not a primary key, so only the slug lookup ran.
        assert_eq!(store.round_trips(), 1);

        let err = resolver.resolve("43").await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(_)));
        assert_eq!(store.round_trips(), 3);
    }

    #[tokio::test]
    async fn test_ambiguous_slug_falls_through() {
        let store = MemoryCatalogStore::with_products([
            fixtures::product(1, Some("dup"), vec![]),
            fixtures::product(2, Some("dup"), vec![]),
        ]);
        let resolver = ProductResolver::new(&store, PRODUCT_SHOW.fetch());

        assert!(matches!(
            resolver.resolve("dup").await,
            Err(ResolveError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let store = MemoryCatalogStore::with_products([fixtures::blue_shirt()]);
        let fetch = FetchSpec::new().leaf("reviews");
        let resolver = ProductResolver::new(&store, &fetch);

        let err = resolver.resolve("blue-shirt").await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Store(StoreError::UnknownRelation { .. })
        ));
        assert_eq!(store.round_trips(), 1);
    }
}
