//! Attribute payloads per resource type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use pantry_core::CurrencyCode;

/// The `attributes` member of any resource object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Attributes {
    Product(ProductAttributes),
    Variant(VariantAttributes),
    Image(ImageAttributes),
    OptionType(OptionTypeAttributes),
    OptionValue(OptionValueAttributes),
    ProductProperty(ProductPropertyAttributes),
}

/// `product` attributes. Price fields come from the master variant; the three
/// availability flags are computed over every variant on each render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductAttributes {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub currency: Option<CurrencyCode>,
    pub display_price: Option<String>,
    pub available_on: Option<DateTime<Utc>>,
    pub slug: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub purchasable: bool,
    pub in_stock: bool,
    pub backorderable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantAttributes {
    pub sku: String,
    pub price: Option<Decimal>,
    pub currency: Option<CurrencyCode>,
    pub display_price: Option<String>,
    pub weight: Option<Decimal>,
    pub height: Option<Decimal>,
    pub width: Option<Decimal>,
    pub depth: Option<Decimal>,
    pub is_master: bool,
    pub purchasable: bool,
    pub in_stock: bool,
    pub backorderable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAttributes {
    pub position: i32,
    pub alt: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionTypeAttributes {
    pub name: String,
    pub presentation: String,
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionValueAttributes {
    pub name: String,
    pub presentation: String,
    pub position: i32,
}

/// `name` and `presentation` are read through the property relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductPropertyAttributes {
    pub value: Option<String>,
    pub name: Option<String>,
    pub presentation: Option<String>,
}
