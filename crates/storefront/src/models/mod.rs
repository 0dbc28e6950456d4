//! Domain models for the storefront.
//!
//! These types represent loaded catalog records, separate from database row
//! types and from the serialized response document.

pub mod catalog;
pub mod relation;

pub use catalog::{
    Image, OptionType, OptionValue, Product, ProductProperty, Property, StockLevel, Variant,
};
pub use relation::Relation;
