//! Catalog domain types.
//!
//! Products and their related records as loaded by a [`CatalogStore`]. Every
//! relation is a [`Relation`] slot, populated only when the lookup's fetch
//! spec asked for it.
//!
//! [`CatalogStore`]: crate::catalog::CatalogStore

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use pantry_core::{
    ImageId, OptionTypeId, OptionValueId, Price, ProductId, ProductPropertyId, PropertyId,
    VariantId,
};

use super::Relation;

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Product {
    /// Primary key.
    pub id: ProductId,
    /// URL slug (unique when present).
    pub slug: Option<String>,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: Option<String>,
    /// When the product becomes available for sale.
    pub available_on: Option<DateTime<Utc>>,
    /// SEO meta description.
    pub meta_description: Option<String>,
    /// SEO meta keywords.
    pub meta_keywords: Option<String>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// ID of the master variant.
    pub master_id: Option<VariantId>,
    /// Every variant row of the product, master included.
    #[serde(default)]
    pub variants: Relation<Vec<Variant>>,
    /// Axes of variation.
    #[serde(default)]
    pub option_types: Relation<Vec<OptionType>>,
    /// Property annotations.
    #[serde(default)]
    pub product_properties: Relation<Vec<ProductProperty>>,
}

impl Product {
    /// The master variant, borrowed from the loaded `variants` relation.
    ///
    /// Returns `None` when the product has no master or variants were not loaded.
    #[must_use]
    pub fn master(&self) -> Option<&Variant> {
        let master_id = self.master_id?;
        self.variants
            .get()?
            .iter()
            .find(|variant| variant.id == master_id)
    }

    /// Variants including the master; empty when not loaded.
    #[must_use]
    pub fn variants_including_master(&self) -> &[Variant] {
        self.variants.get().map_or(&[], Vec::as_slice)
    }

    /// The product price, taken from the master variant.
    #[must_use]
    pub fn price(&self) -> Option<Price> {
        self.master()?.price()
    }

    /// Whether any variant can be bought right now.
    #[must_use]
    pub fn purchasable(&self) -> bool {
        self.variants_including_master()
            .iter()
            .any(Variant::purchasable)
    }

    /// Whether any variant has stock on hand.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.variants_including_master()
            .iter()
            .any(Variant::in_stock)
    }

    /// Whether any variant accepts backorders.
    #[must_use]
    pub fn backorderable(&self) -> bool {
        self.variants_including_master()
            .iter()
            .any(Variant::backorderable)
    }
}

/// A purchasable configuration of a product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Variant {
    /// Primary key.
    pub id: VariantId,
    /// Stock keeping unit.
    pub sku: String,
    /// Whether this row is the product's master variant.
    pub is_master: bool,
    pub weight: Option<Decimal>,
    pub height: Option<Decimal>,
    pub width: Option<Decimal>,
    pub depth: Option<Decimal>,
    /// Aggregated stock across stock locations.
    pub stock: StockLevel,
    /// The default price.
    #[serde(default)]
    pub default_price: Relation<Option<Price>>,
    /// Variant images.
    #[serde(default)]
    pub images: Relation<Vec<Image>>,
}

impl Variant {
    /// The default price, if loaded and present.
    #[must_use]
    pub fn price(&self) -> Option<Price> {
        self.default_price.get().copied().flatten()
    }

    /// Whether the variant can be bought right now.
    #[must_use]
    pub const fn purchasable(&self) -> bool {
        self.in_stock() || self.backorderable()
    }

    /// Untracked variants are always in stock.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        !self.stock.track_inventory || self.stock.count_on_hand > 0
    }

    #[must_use]
    pub const fn backorderable(&self) -> bool {
        self.stock.backorderable
    }
}

/// Stock and backorder policy for a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct StockLevel {
    /// Whether inventory is tracked at all.
    pub track_inventory: bool,
    /// Units on hand across all stock locations.
    pub count_on_hand: i32,
    /// Whether any stock location accepts backorders.
    pub backorderable: bool,
}

/// A variant image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Image {
    pub id: ImageId,
    pub position: i32,
    pub alt: Option<String>,
    pub url: String,
}

/// A named axis of variation (e.g. "size").
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OptionType {
    pub id: OptionTypeId,
    pub name: String,
    pub presentation: String,
    pub position: i32,
    #[serde(default)]
    pub option_values: Relation<Vec<OptionValue>>,
}

/// One value on an option type axis.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OptionValue {
    pub id: OptionValueId,
    pub name: String,
    pub presentation: String,
    pub position: i32,
}

/// A product's value for a [`Property`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductProperty {
    pub id: ProductPropertyId,
    pub value: Option<String>,
    #[serde(default)]
    pub property: Relation<Option<Property>>,
}

/// A property name shared across products (e.g. "material").
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub name: String,
    pub presentation: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;

    #[test]
    fn test_master_is_projection_of_variants() {
        let product = fixtures::blue_shirt();
        let master = product.master().unwrap();
        assert_eq!(Some(master.id), product.master_id);
        assert!(master.is_master);
        assert!(
            product
                .variants_including_master()
                .iter()
                .any(|variant| std::ptr::eq(variant, master))
        );
    }

    #[test]
    fn test_master_requires_loaded_variants() {
        let mut product = fixtures::blue_shirt();
        product.variants = Relation::NotLoaded;
        assert!(product.master().is_none());
        assert!(product.price().is_none());
        assert!(!product.in_stock());
    }

    #[test]
    fn test_variant_stock_flags() {
        let mut variant = fixtures::variant(10, false, 0);
        assert!(!variant.in_stock());
        assert!(!variant.purchasable());

        variant.stock.backorderable = true;
        assert!(variant.backorderable());
        assert!(variant.purchasable());

        variant.stock.backorderable = false;
        variant.stock.track_inventory = false;
        assert!(variant.in_stock());
        assert!(variant.purchasable());
    }

    #[test]
    fn test_product_deserializes_partial_fetch() {
        let json = serde_json::json!({
            "id": 7,
            "slug": null,
            "name": "Mug",
            "description": null,
            "available_on": null,
            "meta_description": null,
            "meta_keywords": null,
            "updated_at": "2026-01-01T00:00:00+00:00",
            "master_id": 3,
            "variants": [{
                "id": 3,
                "sku": "MUG",
                "is_master": true,
                "weight": "1.50",
                "height": null,
                "width": null,
                "depth": null,
                "stock": {"track_inventory": true, "count_on_hand": 4, "backorderable": false},
                "default_price": {"amount": "9.00", "currency_code": "USD"}
            }]
        });

        let product: Product = serde_json::from_value(json).unwrap();
        assert!(product.option_types == Relation::NotLoaded);
        let master = product.master().unwrap();
        assert_eq!(master.images, Relation::NotLoaded);
        assert_eq!(master.weight, Some(Decimal::new(150, 2)));
        assert_eq!(product.price().unwrap().display(), "$9.00");
        assert!(product.in_stock());
    }
}
