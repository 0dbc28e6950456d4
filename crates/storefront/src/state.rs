//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::CatalogStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable; immutable after startup.
#[derive(Clone)]
pub struct AppState {
    catalog: Arc<dyn CatalogStore>,
}

impl AppState {
    /// Create a new application state around a catalog store.
    #[must_use]
    pub fn new(catalog: impl CatalogStore + 'static) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    /// Get the catalog store.
    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogStore {
        self.catalog.as_ref()
    }
}

impl From<Arc<dyn CatalogStore>> for AppState {
    fn from(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }
}
