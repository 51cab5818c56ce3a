//! Product catalog handlers.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use tracing::instrument;

use verdant_core::Product;
use verdant_core::api::ProductListResponse;

use crate::error::{AppError, Result};
use crate::middleware::ProductParam;
use crate::state::AppState;

/// Query parameters for product listing.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    /// Only list products in this category (case-insensitive).
    pub category: Option<String>,
}

/// List products, optionally filtered by category.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    query: std::result::Result<Query<ProductsQuery>, QueryRejection>,
) -> Result<Json<ProductListResponse>> {
    let Query(query) = query?;
    let products = state
        .catalog()
        .products()
        .iter()
        .filter(|product| {
            query
                .category
                .as_deref()
                .is_none_or(|category| product.category.eq_ignore_ascii_case(category))
        })
        .cloned()
        .collect();

    Ok(Json(ProductListResponse { products }))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ProductParam(product_id): ProductParam,
) -> Result<Json<Product>> {
    state
        .catalog()
        .get(&product_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))
}
