//! Catalog lookup: relationship plans, stores, and identifier resolution.
//!
//! # Flow
//!
//! ```text
//! identifier ──► ProductResolver ──► CatalogStore (one round trip per lookup,
//!                     │                 eager-loading plan.fetch())
//!                     ▼
//!                  Product ──► serializer (renders plan.output())
//! ```

pub mod fixtures;
pub mod memory;
pub mod plan;
pub mod resolver;
pub mod store;

pub use memory::MemoryCatalogStore;
pub use plan::{
    FetchNode, FetchSpec, IncludeTree, OutputSpec, PRODUCT_SHOW, PlanMismatchError,
    RelationshipPlan,
};
pub use resolver::{ProductResolver, ResolveError};
pub use store::{CatalogStore, StoreError};
