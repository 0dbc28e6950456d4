//! Product route handlers.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::instrument;

use crate::catalog::{PRODUCT_SHOW, ProductResolver};
use crate::error::{Result, add_breadcrumb};
use crate::serializer::{Document, serialize_product};
use crate::state::AppState;

/// Media type of JSON:API documents.
pub const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";

/// A JSON body served as `application/vnd.api+json`.
#[derive(Debug)]
pub struct JsonApi<T>(pub T);

impl<T: Serialize> IntoResponse for JsonApi<T> {
    fn into_response(self) -> Response {
        let mut response = axum::Json(self.0).into_response();
        if response.status().is_success() {
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static(JSON_API_CONTENT_TYPE),
            );
        }
        response
    }
}

/// Show a product by slug or primary key.
///
/// Slugs take priority; `/products/42` serves the product with slug `42` if
/// one exists, otherwise the product with id 42.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<JsonApi<Document>> {
    let resolver = ProductResolver::new(state.catalog(), PRODUCT_SHOW.fetch());
    let product = resolver.resolve(&id).await?;

    let product_id = product.id.to_string();
    add_breadcrumb(
        "catalog",
        "Resolved product",
        Some(&[("product_id", product_id.as_str())]),
    );

    Ok(JsonApi(serialize_product(&product, PRODUCT_SHOW.output())))
}
