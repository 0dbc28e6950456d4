//! Integration tests for Pantry.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (memory catalog store)
//! cargo test -p pantry-integration-tests
//!
//! # Live tests against PostgreSQL and a running storefront
//! STOREFRONT_DATABASE_URL=postgres://... cargo test -p pantry-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `storefront_products` - Product show endpoint over HTTP
//! - `catalog_postgres` - `PgCatalogStore` against a real database (ignored)

use std::net::SocketAddr;

use pantry_storefront::routes;
use pantry_storefront::state::AppState;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A storefront served on an ephemeral local port.
///
/// The server task is aborted when this value is dropped.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Serve the full storefront application for `state`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if no local port can be bound.
    pub async fn spawn(state: AppState) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = routes::app(state);

        let handle = tokio::spawn(async move {
            // The server only stops when the task is aborted.
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, handle })
    }

    /// Absolute URL for `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Base URL of a separately running storefront (for live tests).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}
