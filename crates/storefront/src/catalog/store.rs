//! The catalog store seam.

use async_trait::async_trait;
use thiserror::Error;

use pantry_core::ProductId;

use super::plan::FetchSpec;
use crate::models::Product;

/// Errors from a catalog store.
///
/// All variants are fatal for the request; nothing here is retried.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row could not be decoded into a catalog model.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The fetch spec names a relation the store cannot load.
    #[error("unknown relation `{relation}` on {parent}")]
    UnknownRelation {
        parent: &'static str,
        relation: String,
    },
}

/// Read access to products with eager loading.
///
/// Each lookup is a single round trip that returns products with every
/// relation in `fetch` populated and every other relation left
/// [`NotLoaded`](crate::models::Relation::NotLoaded). Implementations return
/// at most two matches; callers decide what to do with more than one.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Products whose slug equals `slug`.
    async fn find_products_by_slug(
        &self,
        slug: &str,
        fetch: &FetchSpec,
    ) -> Result<Vec<Product>, StoreError>;

    /// Products whose primary key equals `id`.
    async fn find_products_by_id(
        &self,
        id: ProductId,
        fetch: &FetchSpec,
    ) -> Result<Vec<Product>, StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
