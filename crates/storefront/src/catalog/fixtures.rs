//! Demo catalog records.
//!
//! Fully loaded products used by tests, the integration test crate, and the
//! CLI `seed` command.

use chrono::{DateTime, Utc};

use pantry_core::{
    CurrencyCode, ImageId, OptionTypeId, OptionValueId, Price, ProductId, ProductPropertyId,
    PropertyId, VariantId,
};

use crate::models::{
    Image, OptionType, OptionValue, Product, ProductProperty, Property, Relation, StockLevel,
    Variant,
};

/// 2026-01-15T12:00:00Z
const UPDATED_AT: i64 = 1_768_478_400;

/// The blue shirt: product 42 with an in-stock master (variant 1) and an
/// out-of-stock large size (variant 2).
#[must_use]
pub fn blue_shirt() -> Product {
    let mut master = variant(1, true, 5);
    master.sku = "BLUE-SHIRT".to_string();
    master.images = Relation::Loaded(vec![image(100, 1, "blue-shirt-front.jpg")]);

    let mut large = variant(2, false, 0);
    large.sku = "BLUE-SHIRT-L".to_string();
    large.default_price = Relation::Loaded(Some(Price::from_cents(2199, CurrencyCode::USD)));
    large.images = Relation::Loaded(vec![image(101, 1, "blue-shirt-large.jpg")]);

    Product {
        name: "Blue Shirt".to_string(),
        description: Some("A soft cotton shirt in classic blue.".to_string()),
        meta_description: Some("Blue cotton shirt".to_string()),
        meta_keywords: Some("shirt, blue, cotton".to_string()),
        option_types: Relation::Loaded(vec![OptionType {
            id: OptionTypeId::new(5),
            name: "size".to_string(),
            presentation: "Size".to_string(),
            position: 1,
            option_values: Relation::Loaded(vec![
                option_value(11, "s", "S", 1),
                option_value(12, "l", "L", 2),
            ]),
        }]),
        product_properties: Relation::Loaded(vec![ProductProperty {
            id: ProductPropertyId::new(7),
            value: Some("cotton".to_string()),
            property: Relation::Loaded(Some(Property {
                id: PropertyId::new(3),
                name: "material".to_string(),
                presentation: "Material".to_string(),
            })),
        }]),
        ..product(42, Some("blue-shirt"), vec![master, large])
    }
}

/// A product with the given variants; the first master variant becomes `master_id`.
#[must_use]
pub fn product(id: i32, slug: Option<&str>, variants: Vec<Variant>) -> Product {
    Product {
        id: ProductId::new(id),
        slug: slug.map(str::to_string),
        name: format!("Product {id}"),
        description: None,
        available_on: DateTime::from_timestamp(UPDATED_AT, 0),
        meta_description: None,
        meta_keywords: None,
        updated_at: DateTime::<Utc>::from_timestamp(UPDATED_AT, 0).unwrap_or_default(),
        master_id: variants
            .iter()
            .find(|variant| variant.is_master)
            .map(|variant| variant.id),
        variants: Relation::Loaded(variants),
        option_types: Relation::Loaded(Vec::new()),
        product_properties: Relation::Loaded(Vec::new()),
    }
}

/// A tracked, non-backorderable variant priced at $19.99.
#[must_use]
pub fn variant(id: i32, is_master: bool, count_on_hand: i32) -> Variant {
    Variant {
        id: VariantId::new(id),
        sku: format!("SKU-{id}"),
        is_master,
        weight: None,
        height: None,
        width: None,
        depth: None,
        stock: StockLevel {
            track_inventory: true,
            count_on_hand,
            backorderable: false,
        },
        default_price: Relation::Loaded(Some(Price::from_cents(1999, CurrencyCode::USD))),
        images: Relation::Loaded(Vec::new()),
    }
}

fn image(id: i32, position: i32, file: &str) -> Image {
    Image {
        id: ImageId::new(id),
        position,
        alt: None,
        url: format!("/media/{file}"),
    }
}

fn option_value(id: i32, name: &str, presentation: &str, position: i32) -> OptionValue {
    OptionValue {
        id: OptionValueId::new(id),
        name: name.to_string(),
        presentation: presentation.to_string(),
        position,
    }
}
