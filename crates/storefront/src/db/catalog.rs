//! `PostgreSQL` catalog store.
//!
//! Each lookup compiles the fetch spec into a single statement: the product
//! row is rendered with `json_build_object`, and every requested relation
//! becomes a correlated subselect (`json_agg` for collections, `LIMIT 1` for
//! single records) nested inside its parent. The result is one JSON document
//! per product which deserializes straight into [`Product`], leaving
//! unrequested relations [`NotLoaded`](crate::models::Relation::NotLoaded).

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument};

use pantry_core::{CurrencyCode, ProductId};

use crate::catalog::{CatalogStore, FetchSpec, StoreError};
use crate::models::{Image, OptionType, Product, ProductProperty, Variant};

/// Catalog store backed by the `catalog` schema.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
    currency: CurrencyCode,
}

impl PgCatalogStore {
    /// Create a store that prices variants in `currency`.
    #[must_use]
    pub const fn new(pool: PgPool, currency: CurrencyCode) -> Self {
        Self { pool, currency }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    #[instrument(skip(self, fetch))]
    async fn find_products_by_slug(
        &self,
        slug: &str,
        fetch: &FetchSpec,
    ) -> Result<Vec<Product>, StoreError> {
        let sql = product_query("p.slug = $1", fetch, self.currency)?;
        let rows = sqlx::query_scalar::<_, serde_json::Value>(&sql)
            .bind(slug)
            .fetch_all(&self.pool)
            .await?;
        decode_products(rows)
    }

    #[instrument(skip(self, fetch))]
    async fn find_products_by_id(
        &self,
        id: ProductId,
        fetch: &FetchSpec,
    ) -> Result<Vec<Product>, StoreError> {
        let sql = product_query("p.id = $1", fetch, self.currency)?;
        let rows = sqlx::query_scalar::<_, serde_json::Value>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        decode_products(rows)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn decode_products(rows: Vec<serde_json::Value>) -> Result<Vec<Product>, StoreError> {
    debug!(rows = rows.len(), "Fetched product rows");
    rows.into_iter()
        .map(|row| {
            serde_json::from_value::<Product>(row)
                .map_err(|e| StoreError::DataCorruption(format!("invalid product document: {e}")))
        })
        .collect()
}

// =============================================================================
// Query Compilation
// =============================================================================

/// Tables reachable from a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entity {
    Product,
    Variant,
    Price,
    Image,
    OptionType,
    OptionValue,
    ProductProperty,
    Property,
}

/// How a relation is joined to its parent row.
///
/// `{c}` is replaced by the child alias and `{p}` by the parent alias.
struct Join {
    target: Entity,
    from: &'static str,
    order_by: &'static str,
    many: bool,
}

impl Entity {
    const fn label(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Variant => "variant",
            Self::Price => "price",
            Self::Image => "image",
            Self::OptionType => "option_type",
            Self::OptionValue => "option_value",
            Self::ProductProperty => "product_property",
            Self::Property => "property",
        }
    }

    /// JSON keys and the column expressions that fill them.
    const fn columns(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Product => &[
                ("id", "{c}.id"),
                ("slug", "{c}.slug"),
                ("name", "{c}.name"),
                ("description", "{c}.description"),
                ("available_on", "{c}.available_on"),
                ("meta_description", "{c}.meta_description"),
                ("meta_keywords", "{c}.meta_keywords"),
                ("updated_at", "{c}.updated_at"),
                (
                    "master_id",
                    "(SELECT {c}_m.id FROM catalog.variants {c}_m \
                     WHERE {c}_m.product_id = {c}.id AND {c}_m.is_master \
                     AND {c}_m.deleted_at IS NULL LIMIT 1)",
                ),
            ],
            Self::Variant => &[
                ("id", "{c}.id"),
                ("sku", "{c}.sku"),
                ("is_master", "{c}.is_master"),
                ("weight", "{c}.weight::text"),
                ("height", "{c}.height::text"),
                ("width", "{c}.width::text"),
                ("depth", "{c}.depth::text"),
                (
                    "stock",
                    "(SELECT json_build_object(\
                     'track_inventory', {c}.track_inventory, \
                     'count_on_hand', COALESCE(SUM({c}_s.count_on_hand), 0), \
                     'backorderable', COALESCE(bool_or({c}_s.backorderable), false)) \
                     FROM catalog.stock_items {c}_s WHERE {c}_s.variant_id = {c}.id)",
                ),
            ],
            Self::Price => &[
                ("amount", "{c}.amount::text"),
                ("currency_code", "{c}.currency"),
            ],
            Self::Image => &[
                ("id", "{c}.id"),
                ("position", "{c}.position"),
                ("alt", "{c}.alt"),
                ("url", "{c}.url"),
            ],
            Self::OptionType | Self::OptionValue => &[
                ("id", "{c}.id"),
                ("name", "{c}.name"),
                ("presentation", "{c}.presentation"),
                ("position", "{c}.position"),
            ],
            Self::ProductProperty => &[("id", "{c}.id"), ("value", "{c}.value")],
            Self::Property => &[
                ("id", "{c}.id"),
                ("name", "{c}.name"),
                ("presentation", "{c}.presentation"),
            ],
        }
    }

    fn join(self, relation: &str) -> Option<Join> {
        let join = match (self, relation) {
            (Self::Product, "variants") => Join {
                target: Self::Variant,
                from: "catalog.variants {c} WHERE {c}.product_id = {p}.id AND {c}.deleted_at IS NULL",
                order_by: "{c}.position, {c}.id",
                many: true,
            },
            (Self::Product, "option_types") => Join {
                target: Self::OptionType,
                from: "catalog.product_option_types {c}_j \
                       JOIN catalog.option_types {c} ON {c}.id = {c}_j.option_type_id \
                       WHERE {c}_j.product_id = {p}.id",
                order_by: "{c}_j.position, {c}.id",
                many: true,
            },
            (Self::Product, "product_properties") => Join {
                target: Self::ProductProperty,
                from: "catalog.product_properties {c} WHERE {c}.product_id = {p}.id",
                order_by: "{c}.position, {c}.id",
                many: true,
            },
            (Self::Variant, "default_price") => Join {
                target: Self::Price,
                from: "catalog.prices {c} WHERE {c}.variant_id = {p}.id \
                       AND {c}.currency = '{currency}' AND {c}.amount IS NOT NULL \
                       AND {c}.deleted_at IS NULL",
                order_by: "{c}.id",
                many: false,
            },
            (Self::Variant, "images") => Join {
                target: Self::Image,
                from: "catalog.images {c} WHERE {c}.variant_id = {p}.id",
                order_by: "{c}.position, {c}.id",
                many: true,
            },
            (Self::OptionType, "option_values") => Join {
                target: Self::OptionValue,
                from: "catalog.option_values {c} WHERE {c}.option_type_id = {p}.id",
                order_by: "{c}.position, {c}.id",
                many: true,
            },
            (Self::ProductProperty, "property") => Join {
                target: Self::Property,
                from: "catalog.properties {c} WHERE {c}.id = {p}.property_id",
                order_by: "{c}.id",
                many: false,
            },
            _ => return None,
        };
        Some(join)
    }
}

/// The full lookup statement; at most two products, live rows only.
fn product_query(
    predicate: &str,
    fetch: &FetchSpec,
    currency: CurrencyCode,
) -> Result<String, StoreError> {
    let object = object_sql(Entity::Product, "p", fetch, currency)?;
    Ok(format!(
        "SELECT {object} AS product FROM catalog.products p \
         WHERE {predicate} AND p.deleted_at IS NULL ORDER BY p.id LIMIT 2"
    ))
}

fn object_sql(
    entity: Entity,
    alias: &str,
    fetch: &FetchSpec,
    currency: CurrencyCode,
) -> Result<String, StoreError> {
    let mut pairs: Vec<String> = entity
        .columns()
        .iter()
        .map(|(key, expr)| format!("'{key}', {}", expr.replace("{c}", alias)))
        .collect();

    for (index, node) in fetch.nodes().iter().enumerate() {
        let join = entity
            .join(node.name())
            .ok_or_else(|| StoreError::UnknownRelation {
                parent: entity.label(),
                relation: node.name().to_string(),
            })?;
        let child = format!("{alias}_{index}");
        let object = object_sql(join.target, &child, node.children(), currency)?;
        let from = join
            .from
            .replace("{c}", &child)
            .replace("{p}", alias)
            .replace("{currency}", currency.code());
        let order_by = join.order_by.replace("{c}", &child);

        let subselect = if join.many {
            format!(
                "(SELECT COALESCE(json_agg({object} ORDER BY {order_by}), '[]'::json) FROM {from})"
            )
        } else {
            format!("(SELECT {object} FROM {from} ORDER BY {order_by} LIMIT 1)")
        };
        pairs.push(format!("'{}', {subselect}", node.name()));
    }

    Ok(format!("json_build_object({})", pairs.join(", ")))
}

// =============================================================================
// Writes
// =============================================================================

/// Insert a fully loaded product with its variants, prices, stock, images,
/// option types, and properties in one transaction.
///
/// Shared rows (option types, option values, properties) are reused when
/// they already exist. Relations that are not loaded are skipped.
///
/// Returns `false` without writing anything when the product id is taken.
///
/// # Errors
///
/// Returns `StoreError::Database` if any statement fails.
pub async fn insert_product(pool: &PgPool, product: &Product) -> Result<bool, StoreError> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        r"
        INSERT INTO catalog.products
            (id, slug, name, description, available_on, meta_description, meta_keywords, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (id) DO NOTHING
        ",
    )
    .bind(product.id)
    .bind(&product.slug)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.available_on)
    .bind(&product.meta_description)
    .bind(&product.meta_keywords)
    .bind(product.updated_at)
    .execute(&mut *tx)
    .await?
    .rows_affected()
        == 1;

    if !inserted {
        tx.rollback().await?;
        return Ok(false);
    }

    for (position, variant) in (1..).zip(product.variants_including_master()) {
        insert_variant(&mut tx, product.id, position, variant).await?;
    }
    for (position, option_type) in (1..).zip(product.option_types.get().into_iter().flatten()) {
        insert_option_type(&mut tx, product.id, position, option_type).await?;
    }
    for (position, property) in (1..).zip(product.product_properties.get().into_iter().flatten())
    {
        insert_product_property(&mut tx, product.id, position, property).await?;
    }

    tx.commit().await?;
    Ok(true)
}

async fn insert_variant(
    conn: &mut PgConnection,
    product_id: ProductId,
    position: i32,
    variant: &Variant,
) -> Result<(), StoreError> {
    sqlx::query(
        r"
        INSERT INTO catalog.variants
            (id, product_id, sku, is_master, position, weight, height, width, depth, track_inventory)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ",
    )
    .bind(variant.id)
    .bind(product_id)
    .bind(&variant.sku)
    .bind(variant.is_master)
    .bind(position)
    .bind(variant.weight)
    .bind(variant.height)
    .bind(variant.width)
    .bind(variant.depth)
    .bind(variant.stock.track_inventory)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        "INSERT INTO catalog.stock_items (variant_id, count_on_hand, backorderable) VALUES ($1, $2, $3)",
    )
    .bind(variant.id)
    .bind(variant.stock.count_on_hand)
    .bind(variant.stock.backorderable)
    .execute(&mut *conn)
    .await?;

    if let Some(price) = variant.price() {
        sqlx::query("INSERT INTO catalog.prices (variant_id, amount, currency) VALUES ($1, $2, $3)")
            .bind(variant.id)
            .bind(price.amount)
            .bind(price.currency_code.code())
            .execute(&mut *conn)
            .await?;
    }

    for image in variant.images.get().into_iter().flatten() {
        insert_image(conn, variant, image).await?;
    }
    Ok(())
}

async fn insert_image(
    conn: &mut PgConnection,
    variant: &Variant,
    image: &Image,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO catalog.images (id, variant_id, position, alt, url) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(image.id)
    .bind(variant.id)
    .bind(image.position)
    .bind(&image.alt)
    .bind(&image.url)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_option_type(
    conn: &mut PgConnection,
    product_id: ProductId,
    position: i32,
    option_type: &OptionType,
) -> Result<(), StoreError> {
    sqlx::query(
        r"
        INSERT INTO catalog.option_types (id, name, presentation, position)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id) DO NOTHING
        ",
    )
    .bind(option_type.id)
    .bind(&option_type.name)
    .bind(&option_type.presentation)
    .bind(option_type.position)
    .execute(&mut *conn)
    .await?;

    for value in option_type.option_values.get().into_iter().flatten() {
        sqlx::query(
            r"
            INSERT INTO catalog.option_values (id, option_type_id, name, presentation, position)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            ",
        )
        .bind(value.id)
        .bind(option_type.id)
        .bind(&value.name)
        .bind(&value.presentation)
        .bind(value.position)
        .execute(&mut *conn)
        .await?;
    }

    sqlx::query(
        "INSERT INTO catalog.product_option_types (product_id, option_type_id, position) VALUES ($1, $2, $3)",
    )
    .bind(product_id)
    .bind(option_type.id)
    .bind(position)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_product_property(
    conn: &mut PgConnection,
    product_id: ProductId,
    position: i32,
    product_property: &ProductProperty,
) -> Result<(), StoreError> {
    let Some(Some(property)) = product_property.property.get() else {
        debug!(
            product_property_id = %product_property.id,
            "Skipping product property without a property"
        );
        return Ok(());
    };

    sqlx::query(
        r"
        INSERT INTO catalog.properties (id, name, presentation)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO NOTHING
        ",
    )
    .bind(property.id)
    .bind(&property.name)
    .bind(&property.presentation)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r"
        INSERT INTO catalog.product_properties (id, product_id, property_id, value, position)
        VALUES ($1, $2, $3, $4, $5)
        ",
    )
    .bind(product_property.id)
    .bind(product_id)
    .bind(property.id)
    .bind(&product_property.value)
    .bind(position)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::PRODUCT_SHOW;
    use crate::models::Relation;

    #[test]
    fn test_empty_fetch_selects_columns_only() {
        let sql = product_query("p.id = $1", &FetchSpec::new(), CurrencyCode::USD).unwrap();
        assert!(sql.starts_with("SELECT json_build_object('id', p.id, 'slug', p.slug"));
        assert!(sql.contains("'master_id', (SELECT p_m.id FROM catalog.variants p_m"));
        assert!(!sql.contains("json_agg"));
        assert!(sql.ends_with("WHERE p.id = $1 AND p.deleted_at IS NULL ORDER BY p.id LIMIT 2"));
    }

    #[test]
    fn test_product_show_is_one_statement_with_nested_relations() {
        let sql = product_query("p.slug = $1", PRODUCT_SHOW.fetch(), CurrencyCode::USD).unwrap();

        assert_eq!(sql.matches("SELECT").count(), 10);
        assert!(sql.contains("'product_properties', (SELECT COALESCE(json_agg("));
        assert!(sql.contains("'property', (SELECT json_build_object('id', p_0_0.id"));
        assert!(sql.contains("FROM catalog.variants p_1 WHERE p_1.product_id = p.id"));
        assert!(sql.contains("'default_price', (SELECT json_build_object('amount', p_1_0.amount::text"));
        assert!(sql.contains("p_1_0.currency = 'USD'"));
        assert!(sql.contains("'images', (SELECT COALESCE(json_agg("));
        assert!(sql.contains("JOIN catalog.option_types p_2 ON p_2.id = p_2_j.option_type_id"));
        assert!(sql.contains("WHERE p_2_0.option_type_id = p_2.id"));
    }

    #[test]
    fn test_price_currency_follows_store() {
        let fetch = FetchSpec::new().nest("variants", FetchSpec::new().leaf("default_price"));
        let sql = product_query("p.id = $1", &fetch, CurrencyCode::EUR).unwrap();
        assert!(sql.contains("p_0_0.currency = 'EUR'"));
        assert!(sql.contains("p_0_0.amount IS NOT NULL"));
        assert!(!sql.contains("'USD'"));
    }

    #[test]
    fn test_unknown_relation_is_rejected() {
        let fetch = FetchSpec::new().nest("variants", FetchSpec::new().leaf("stock_movements"));
        let err = product_query("p.id = $1", &fetch, CurrencyCode::USD).unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnknownRelation { parent: "variant", ref relation } if relation == "stock_movements"
        ));
    }

    #[test]
    fn test_document_decodes_into_product() {
        let document = serde_json::json!({
            "id": 42,
            "slug": "blue-shirt",
            "name": "Blue Shirt",
            "description": null,
            "available_on": "2026-01-15T12:00:00+00:00",
            "meta_description": null,
            "meta_keywords": null,
            "updated_at": "2026-01-15T12:00:00.123456+00:00",
            "master_id": 1,
            "variants": [{
                "id": 1,
                "sku": "BLUE-SHIRT",
                "is_master": true,
                "weight": "0.25",
                "height": null,
                "width": null,
                "depth": null,
                "stock": { "track_inventory": true, "count_on_hand": 5, "backorderable": false },
                "default_price": { "amount": "19.99", "currency_code": "USD" }
            }]
        });

        let product: Product = serde_json::from_value(document).unwrap();
        let master = product.master().unwrap();
        assert_eq!(master.price().unwrap().display(), "$19.99");
        assert_eq!(master.weight.unwrap().to_string(), "0.25");
        assert!(!master.images.is_loaded());
        assert!(!product.option_types.is_loaded());
        assert!(product.in_stock());
    }

    #[test]
    fn test_variant_without_price_decodes() {
        let document = serde_json::json!({
            "id": 43,
            "slug": "gift-card",
            "name": "Gift Card",
            "description": null,
            "available_on": null,
            "meta_description": null,
            "meta_keywords": null,
            "updated_at": "2026-01-15T12:00:00+00:00",
            "master_id": 3,
            "variants": [{
                "id": 3,
                "sku": "GIFT-CARD",
                "is_master": true,
                "weight": null,
                "height": null,
                "width": null,
                "depth": null,
                "stock": { "track_inventory": false, "count_on_hand": 0, "backorderable": false },
                "default_price": null
            }]
        });

        let products = decode_products(vec![document]).unwrap();
        let product = products.first().unwrap();
        assert_eq!(product.master().unwrap().default_price, Relation::Loaded(None));
        assert!(product.price().is_none());
    }
}
