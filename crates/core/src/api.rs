//! JSON wire types for the cart HTTP API.
//!
//! Shared by the storefront (which serves them) and the client (which sends
//! and parses them). Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::cart::CartLineItem;
use crate::types::{Price, Product, ProductId};

/// Header carrying the session id on `/api/cart`.
pub const SESSION_HEADER: &str = "x-session-id";

/// Largest quantity accepted by a single add request.
pub const MAX_ADD_QUANTITY: i64 = 999;

/// Body of `POST /api/cart[/{session}]`.
///
/// Both fields are optional on the wire so that a missing `productId` can be
/// reported as a validation error rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// Defaults to 1 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

impl AddItemRequest {
    /// Request adding `quantity` units of a product.
    #[must_use]
    pub fn new(product_id: &ProductId, quantity: u32) -> Self {
        Self {
            product_id: Some(product_id.to_string()),
            quantity: Some(i64::from(quantity)),
        }
    }
}

/// Body of `PUT /api/cart/{session}/items/{productId}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateQuantityRequest {
    /// New quantity; zero or less removes the line.
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// Response of `GET /api/cart[/{session}]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartResponse {
    pub items: Vec<CartLineItem>,
}

/// Response of every successful cart mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartMutationResponse {
    pub message: String,
    pub items: Vec<CartLineItem>,
}

/// Response of `GET /api/cart/{session}/summary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub total_items: u64,
    pub total_price: Price,
    /// `total_price` formatted for display, e.g. `$42.50`.
    pub formatted_total: String,
    /// Lines left out of `total_price` because the catalog has no price.
    pub unpriced_product_ids: Vec<ProductId>,
}

/// Response of `GET /api/products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
}

/// Body of every 4xx/5xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
