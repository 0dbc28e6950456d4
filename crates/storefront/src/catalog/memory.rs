//! In-process catalog store.
//!
//! Holds fully loaded products and projects them onto the requested fetch
//! spec, so relations outside the spec come back `NotLoaded` exactly as they
//! would from PostgreSQL. Every lookup counts as one round trip.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use pantry_core::ProductId;

use super::plan::FetchSpec;
use super::store::{CatalogStore, StoreError};
use crate::models::{OptionType, Product, ProductProperty, Relation, Variant};

/// A catalog store backed by a `Vec<Product>`.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    products: RwLock<Vec<Product>>,
    round_trips: AtomicUsize,
}

impl MemoryCatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with products.
    #[must_use]
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: RwLock::new(products.into_iter().collect()),
            round_trips: AtomicUsize::new(0),
        }
    }

    /// Insert a product, replacing any product with the same id.
    pub fn upsert(&self, product: Product) {
        let mut products = self.products.write();
        products.retain(|existing| existing.id != product.id);
        products.push(product);
    }

    /// Number of lookups served so far.
    #[must_use]
    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::SeqCst)
    }

    fn find(
        &self,
        fetch: &FetchSpec,
        predicate: impl Fn(&Product) -> bool,
    ) -> Result<Vec<Product>, StoreError> {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
        validate("product", fetch)?;
        self.products
            .read()
            .iter()
            .filter(|&product| predicate(product))
            .take(2)
            .map(|product| project_product(product, fetch))
            .collect()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn find_products_by_slug(
        &self,
        slug: &str,
        fetch: &FetchSpec,
    ) -> Result<Vec<Product>, StoreError> {
        self.find(fetch, |product| product.slug.as_deref() == Some(slug))
    }

    async fn find_products_by_id(
        &self,
        id: ProductId,
        fetch: &FetchSpec,
    ) -> Result<Vec<Product>, StoreError> {
        self.find(fetch, |product| product.id == id)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// =============================================================================
// Projection
// =============================================================================

fn project_product(product: &Product, fetch: &FetchSpec) -> Result<Product, StoreError> {
    Ok(Product {
        variants: project_many(&product.variants, fetch.get("variants"), project_variant)?,
        option_types: project_many(
            &product.option_types,
            fetch.get("option_types"),
            project_option_type,
        )?,
        product_properties: project_many(
            &product.product_properties,
            fetch.get("product_properties"),
            project_product_property,
        )?,
        ..product.clone()
    })
}

fn project_variant(variant: &Variant, fetch: &FetchSpec) -> Result<Variant, StoreError> {
    Ok(Variant {
        default_price: project_one(&variant.default_price, fetch.get("default_price"), |price, _| {
            Ok(*price)
        })?,
        images: project_many(&variant.images, fetch.get("images"), |image, _| {
            Ok(image.clone())
        })?,
        ..variant.clone()
    })
}

fn project_option_type(
    option_type: &OptionType,
    fetch: &FetchSpec,
) -> Result<OptionType, StoreError> {
    Ok(OptionType {
        option_values: project_many(
            &option_type.option_values,
            fetch.get("option_values"),
            |value, _| Ok(value.clone()),
        )?,
        ..option_type.clone()
    })
}

fn project_product_property(
    product_property: &ProductProperty,
    fetch: &FetchSpec,
) -> Result<ProductProperty, StoreError> {
    Ok(ProductProperty {
        property: project_one(
            &product_property.property,
            fetch.get("property"),
            |property, _| Ok(property.clone()),
        )?,
        ..product_property.clone()
    })
}

/// Seeded relations left `NotLoaded` are treated as empty.
fn project_many<T>(
    relation: &Relation<Vec<T>>,
    nested: Option<&FetchSpec>,
    project: impl Fn(&T, &FetchSpec) -> Result<T, StoreError>,
) -> Result<Relation<Vec<T>>, StoreError> {
    let Some(nested) = nested else {
        return Ok(Relation::NotLoaded);
    };
    relation
        .get()
        .map_or(&[][..], Vec::as_slice)
        .iter()
        .map(|item| project(item, nested))
        .collect::<Result<Vec<_>, _>>()
        .map(Relation::Loaded)
}

fn project_one<T>(
    relation: &Relation<Option<T>>,
    nested: Option<&FetchSpec>,
    project: impl Fn(&T, &FetchSpec) -> Result<T, StoreError>,
) -> Result<Relation<Option<T>>, StoreError> {
    let Some(nested) = nested else {
        return Ok(Relation::NotLoaded);
    };
    relation
        .get()
        .and_then(Option::as_ref)
        .map(|item| project(item, nested))
        .transpose()
        .map(Relation::Loaded)
}

/// Rejects any relation the catalog does not have, whether or not a product
/// matches the lookup.
fn validate(parent: &'static str, fetch: &FetchSpec) -> Result<(), StoreError> {
    for node in fetch.nodes() {
        let target = related_entity(parent, node.name()).ok_or_else(|| {
            StoreError::UnknownRelation {
                parent,
                relation: node.name().to_string(),
            }
        })?;
        validate(target, node.children())?;
    }
    Ok(())
}

/// `(parent, relation, target)` for every relation the catalog can load.
const RELATIONS: &[(&str, &str, &str)] = &[
    ("product", "variants", "variant"),
    ("product", "option_types", "option_type"),
    ("product", "product_properties", "product_property"),
    ("variant", "default_price", "price"),
    ("variant", "images", "image"),
    ("option_type", "option_values", "option_value"),
    ("product_property", "property", "property"),
];

fn related_entity(parent: &str, relation: &str) -> Option<&'static str> {
    RELATIONS
        .iter()
        .find(|(from, name, _)| *from == parent && *name == relation)
        .map(|(_, _, target)| *target)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;
    use crate::catalog::plan::PRODUCT_SHOW;

    #[tokio::test]
    async fn test_projection_leaves_unfetched_relations_unloaded() {
        let store = MemoryCatalogStore::with_products([fixtures::blue_shirt()]);
        let fetch = FetchSpec::new().leaf("variants");

        let products = store.find_products_by_slug("blue-shirt", &fetch).await.unwrap();
        let product = products.first().unwrap();

        assert!(product.variants.is_loaded());
        assert_eq!(product.option_types, Relation::NotLoaded);
        assert_eq!(product.product_properties, Relation::NotLoaded);
        let master = product.master().unwrap();
        assert_eq!(master.default_price, Relation::NotLoaded);
        assert_eq!(master.images, Relation::NotLoaded);
    }

    #[tokio::test]
    async fn test_full_plan_loads_everything() {
        let store = MemoryCatalogStore::with_products([fixtures::blue_shirt()]);
        let products = store
            .find_products_by_id(ProductId::new(42), PRODUCT_SHOW.fetch())
            .await
            .unwrap();

        assert_eq!(products, vec![fixtures::blue_shirt()]);
        assert_eq!(store.round_trips(), 1);
    }

    #[tokio::test]
    async fn test_unknown_relation_is_rejected() {
        let store = MemoryCatalogStore::with_products([fixtures::blue_shirt()]);
        let fetch = FetchSpec::new().nest("variants", FetchSpec::new().leaf("taxons"));

        let err = store
            .find_products_by_slug("blue-shirt", &fetch)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnknownRelation { parent: "variant", ref relation } if relation == "taxons"
        ));
    }

    #[tokio::test]
    async fn test_every_lookup_is_one_round_trip() {
        let store = MemoryCatalogStore::new();
        store.upsert(fixtures::blue_shirt());

        assert!(
            store
                .find_products_by_slug("missing", &FetchSpec::new())
                .await
                .unwrap()
                .is_empty()
        );
        store
            .find_products_by_id(ProductId::new(42), &FetchSpec::new())
            .await
            .unwrap();
        assert_eq!(store.round_trips(), 2);
    }

    #[tokio::test]
    async fn test_unknown_relation_fails_without_a_match() {
        let store = MemoryCatalogStore::with_products([fixtures::blue_shirt()]);
        let fetch = FetchSpec::new().leaf("reviews");

        let err = store
            .find_products_by_slug("missing", &fetch)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnknownRelation { parent: "product", ref relation } if relation == "reviews"
        ));
        assert_eq!(store.round_trips(), 1);
    }

    #[tokio::test]
    async fn test_nested_unknown_relation_fails_without_a_match() {
        let store = MemoryCatalogStore::new();
        let fetch = FetchSpec::new().nest("variants", FetchSpec::new().leaf("stock_movements"));

        let err = store
            .find_products_by_id(ProductId::new(7), &fetch)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownRelation { parent: "variant", .. }));
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let store = MemoryCatalogStore::with_products([fixtures::blue_shirt()]);
        let mut renamed = fixtures::blue_shirt();
        renamed.name = "Navy Shirt".to_string();
        store.upsert(renamed);

        let products = store.products.read();
        assert_eq!(products.len(), 1);
        assert_eq!(products.first().unwrap().name, "Navy Shirt");
    }
}
