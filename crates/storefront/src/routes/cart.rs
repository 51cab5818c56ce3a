//! Cart API handlers.
//!
//! Every handler resolves the session through [`CartSession`], validates its
//! body at the boundary, and performs one operation on the [`CartStore`].
//! Each mutation answers with `{message, items}`; reads answer with `{items}`.
//!
//! [`CartStore`]: crate::store::CartStore

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::instrument;

use verdant_core::api::{
    AddItemRequest, CartMutationResponse, CartResponse, CartSummary, MAX_ADD_QUANTITY,
    UpdateQuantityRequest,
};
use verdant_core::{Cart, ProductId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{CartSession, ProductParam};
use crate::state::AppState;

// =============================================================================
// Request Validation
// =============================================================================

/// A validated add-to-cart request.
#[derive(Debug, PartialEq, Eq)]
struct AddItem {
    product_id: ProductId,
    quantity: u32,
}

impl TryFrom<AddItemRequest> for AddItem {
    type Error = AppError;

    fn try_from(request: AddItemRequest) -> Result<Self> {
        let raw_id = request
            .product_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AppError::Validation("productId is required".to_string()))?;
        let product_id = ProductId::parse(&raw_id)?;

        let quantity = request.quantity.unwrap_or(1);
        if !(1..=MAX_ADD_QUANTITY).contains(&quantity) {
            return Err(AppError::Validation(format!(
                "quantity must be between 1 and {MAX_ADD_QUANTITY}"
            )));
        }
        let quantity = u32::try_from(quantity)
            .map_err(|_| AppError::Validation("quantity is out of range".to_string()))?;

        Ok(Self {
            product_id,
            quantity,
        })
    }
}

fn mutation_response(message: &str, cart: Cart) -> Json<CartMutationResponse> {
    Json(CartMutationResponse {
        message: message.to_string(),
        items: cart.into_items(),
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// List the session's line items.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    CartSession(session): CartSession,
) -> Json<CartResponse> {
    let cart = state.carts().snapshot(&session).await;
    Json(CartResponse {
        items: cart.into_items(),
    })
}

/// Add an item, incrementing the existing line or appending a new one.
#[instrument(skip(state, payload))]
pub async fn add(
    State(state): State<AppState>,
    CartSession(session): CartSession,
    payload: std::result::Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<Json<CartMutationResponse>> {
    let Json(request) = payload?;
    let item = AddItem::try_from(request)?;

    let cart = state
        .carts()
        .add_item(&session, &item.product_id, item.quantity)
        .await;

    add_breadcrumb(
        "cart",
        "Added item",
        Some(&[
            ("product_id", item.product_id.as_str()),
            ("quantity", &item.quantity.to_string()),
        ]),
    );
    tracing::info!(
        product_id = %item.product_id,
        quantity = item.quantity,
        lines = cart.len(),
        "Item added to cart"
    );

    Ok(mutation_response("Item added to cart", cart))
}

/// Set a line's quantity; zero or less removes the line.
#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    CartSession(session): CartSession,
    ProductParam(product_id): ProductParam,
    payload: std::result::Result<Json<UpdateQuantityRequest>, JsonRejection>,
) -> Result<Json<CartMutationResponse>> {
    let Json(request) = payload?;
    let quantity = request
        .quantity
        .ok_or_else(|| AppError::Validation("quantity is required".to_string()))?;

    let cart = state
        .carts()
        .update_quantity(&session, &product_id, quantity)
        .await;

    Ok(mutation_response("Cart updated", cart))
}

/// Remove a line. Removing a product that is not in the cart is not an error.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    CartSession(session): CartSession,
    ProductParam(product_id): ProductParam,
) -> Json<CartMutationResponse> {
    let cart = state.carts().remove_item(&session, &product_id).await;

    add_breadcrumb(
        "cart",
        "Removed item",
        Some(&[("product_id", product_id.as_str())]),
    );

    mutation_response("Item removed from cart", cart)
}

/// Empty the session's cart.
#[instrument(skip(state))]
pub async fn clear(
    State(state): State<AppState>,
    CartSession(session): CartSession,
) -> Json<CartMutationResponse> {
    let cart = state.carts().clear(&session).await;
    mutation_response("Cart cleared", cart)
}

/// Totals for the session's cart at current catalog prices.
#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    CartSession(session): CartSession,
) -> Result<Json<CartSummary>> {
    let cart = state.carts().snapshot(&session).await;
    let catalog = state.catalog();
    let total_price = cart.total_price(catalog).ok_or_else(|| {
        AppError::Internal(format!(
            "cart total overflowed ({} items)",
            cart.total_items()
        ))
    })?;

    Ok(Json(CartSummary {
        total_items: cart.total_items(),
        total_price,
        formatted_total: total_price.to_string(),
        unpriced_product_ids: cart.unpriced_items(catalog),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(product_id: Option<&str>, quantity: Option<i64>) -> AddItemRequest {
        AddItemRequest {
            product_id: product_id.map(String::from),
            quantity,
        }
    }

    #[test]
    fn test_add_item_defaults_quantity() {
        let item = AddItem::try_from(request(Some("p1"), None)).unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.product_id.as_str(), "p1");
    }

    #[test]
    fn test_add_item_requires_product_id() {
        for missing in [None, Some(""), Some("   ")] {
            let err = AddItem::try_from(request(missing, Some(1))).unwrap_err();
            assert_eq!(err.to_string(), "productId is required");
        }
    }

    #[test]
    fn test_add_item_quantity_bounds() {
        assert!(AddItem::try_from(request(Some("p1"), Some(0))).is_err());
        assert!(AddItem::try_from(request(Some("p1"), Some(-3))).is_err());
        assert!(AddItem::try_from(request(Some("p1"), Some(MAX_ADD_QUANTITY + 1))).is_err());
        assert_eq!(
            AddItem::try_from(request(Some("p1"), Some(MAX_ADD_QUANTITY)))
                .unwrap()
                .quantity,
            999
        );
    }
}
