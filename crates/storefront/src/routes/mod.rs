//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                   - Health check
//!
//! # Cart (session from x-session-id header, or the shared anonymous cart)
//! GET     /api/cart                              - List items
//! POST    /api/cart                              - Add item {productId, quantity?}
//!
//! # Cart (session in path)
//! GET     /api/cart/{session}                    - List items
//! POST    /api/cart/{session}                    - Add item {productId, quantity?}
//! DELETE  /api/cart/{session}                    - Clear cart
//! PUT     /api/cart/{session}/items/{product_id} - Set quantity {quantity}
//! DELETE  /api/cart/{session}/items/{product_id} - Remove item
//! GET     /api/cart/{session}/summary            - Totals at current prices
//!
//! # Products
//! GET  /api/products                             - Product listing (?category=)
//! GET  /api/products/{product_id}                - Product detail
//! ```
//!
//! `OPTIONS` on any path is answered by the CORS layer. Any other method on
//! these paths answers 405 with an `{error}` body.

pub mod cart;
pub mod products;

use axum::{
    Router,
    http::Method,
    routing::{get, put},
};

use crate::error::AppError;
use crate::state::AppState;

/// Fallback for methods a route does not support.
pub async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(method)
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(cart::show)
                .post(cart::add)
                .fallback(method_not_allowed),
        )
        .route(
            "/{session}",
            get(cart::show)
                .post(cart::add)
                .delete(cart::clear)
                .fallback(method_not_allowed),
        )
        .route(
            "/{session}/items/{product_id}",
            put(cart::update)
                .delete(cart::remove)
                .fallback(method_not_allowed),
        )
        .route(
            "/{session}/summary",
            get(cart::summary).fallback(method_not_allowed),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(products::index).fallback(method_not_allowed),
        )
        .route(
            "/{product_id}",
            get(products::show).fallback(method_not_allowed),
        )
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/cart", cart_routes())
        .nest("/api/products", product_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use verdant_core::api::SESSION_HEADER;

    use crate::catalog::ProductCatalog;
    use crate::config::StorefrontConfig;
    use crate::middleware::REQUEST_ID_HEADER;
    use crate::state::AppState;

    const SESSION: &str = "router-test-session";

    fn test_app() -> Router {
        test_app_with(ProductCatalog::builtin().unwrap())
    }

    fn test_app_with(catalog: ProductCatalog) -> Router {
        crate::app(AppState::new(&StorefrontConfig::default(), catalog))
    }

    fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn cart_uri(suffix: &str) -> String {
        format!("/api/cart/{SESSION}{suffix}")
    }

    #[tokio::test]
    async fn test_get_empty_cart() {
        let app = test_app();
        let (status, body) = send(&app, empty_request("GET", "/api/cart")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "items": [] }));
    }

    #[tokio::test]
    async fn test_add_without_product_id_is_rejected() {
        let app = test_app();
        let (status, body) = send(&app, json_request("POST", "/api/cart", &json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "productId is required");
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let app = test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/cart")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"productId\":"))
            .unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let app = test_app();
        let (status, body) = send(&app, empty_request("PATCH", "/api/cart")).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method PATCH not allowed");

        let (status, _) = send(&app, empty_request("POST", &cart_uri("/summary"))).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_options_answered_by_cors_layer() {
        let app = test_app();
        for uri in ["/api/cart", "/api/cart/router-test-session"] {
            let response = app
                .clone()
                .oneshot(empty_request("OPTIONS", uri))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        }
    }

    #[tokio::test]
    async fn test_repeated_adds_merge_into_one_line() {
        let app = test_app();
        send(
            &app,
            json_request("POST", &cart_uri(""), &json!({ "productId": "p1", "quantity": 2 })),
        )
        .await;
        let (status, body) = send(
            &app,
            json_request("POST", &cart_uri(""), &json!({ "productId": "p1", "quantity": 3 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Item added to cart");
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["productId"], "p1");
        assert_eq!(items[0]["quantity"], 5);
        assert!(items[0]["addedAt"].is_string());
    }

    #[tokio::test]
    async fn test_add_quantity_defaults_to_one() {
        let app = test_app();
        let (_, body) = send(
            &app,
            json_request("POST", &cart_uri(""), &json!({ "productId": "lavender" })),
        )
        .await;

        assert_eq!(body["items"][0]["quantity"], 1);
    }

    #[tokio::test]
    async fn test_add_rejects_out_of_range_quantity() {
        let app = test_app();
        for quantity in [0, -1, 1000] {
            let (status, body) = send(
                &app,
                json_request(
                    "POST",
                    &cart_uri(""),
                    &json!({ "productId": "p1", "quantity": quantity }),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "quantity {quantity}");
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_update_to_zero_removes_line() {
        let app = test_app();
        send(
            &app,
            json_request("POST", &cart_uri(""), &json!({ "productId": "p1", "quantity": 4 })),
        )
        .await;

        let (status, body) = send(
            &app,
            json_request("PUT", &cart_uri("/items/p1"), &json!({ "quantity": 0 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Cart updated");
        assert_eq!(body["items"], json!([]));
    }

    #[tokio::test]
    async fn test_update_requires_quantity() {
        let app = test_app();
        let (status, body) =
            send(&app, json_request("PUT", &cart_uri("/items/p1"), &json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "quantity is required");
    }

    #[tokio::test]
    async fn test_remove_missing_product_is_ok() {
        let app = test_app();
        let (status, body) = send(&app, empty_request("DELETE", &cart_uri("/items/ghost"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Item removed from cart");
        assert_eq!(body["items"], json!([]));
    }

    #[tokio::test]
    async fn test_clear_cart() {
        let app = test_app();
        send(
            &app,
            json_request("POST", &cart_uri(""), &json!({ "productId": "p1" })),
        )
        .await;

        let (status, body) = send(&app, empty_request("DELETE", &cart_uri(""))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Cart cleared");
        assert_eq!(body["items"], json!([]));

        let (_, body) = send(&app, empty_request("GET", &cart_uri(""))).await;
        assert_eq!(body["items"], json!([]));
    }

    #[tokio::test]
    async fn test_summary_uses_catalog_prices() {
        let app = test_app();
        for (product_id, quantity) in [("monstera-deliciosa", 2), ("lavender", 1), ("ghost", 3)] {
            send(
                &app,
                json_request(
                    "POST",
                    &cart_uri(""),
                    &json!({ "productId": product_id, "quantity": quantity }),
                ),
            )
            .await;
        }

        let (status, body) = send(&app, empty_request("GET", &cart_uri("/summary"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalItems"], 6);
        assert_eq!(body["totalPrice"]["amount"], "82.97");
        assert_eq!(body["totalPrice"]["currencyCode"], "USD");
        assert_eq!(body["formattedTotal"], "$82.97");
        assert_eq!(body["unpricedProductIds"], json!(["ghost"]));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let app = test_app();
        let add = Request::builder()
            .method("POST")
            .uri("/api/cart")
            .header(header::CONTENT_TYPE, "application/json")
            .header(SESSION_HEADER, "header-session-a")
            .body(Body::from(json!({ "productId": "p1" }).to_string()))
            .unwrap();
        send(&app, add).await;

        // The header session and the path session are the same cart
        let (_, body) = send(&app, empty_request("GET", "/api/cart/header-session-a")).await;
        assert_eq!(body["items"][0]["productId"], "p1");

        let (_, body) = send(&app, empty_request("GET", "/api/cart/header-session-b")).await;
        assert_eq!(body["items"], json!([]));

        let (_, body) = send(&app, empty_request("GET", "/api/cart")).await;
        assert_eq!(body["items"], json!([]));
    }

    #[tokio::test]
    async fn test_malformed_session_header_uses_anonymous_cart() {
        let app = test_app();
        send(
            &app,
            json_request("POST", "/api/cart", &json!({ "productId": "lavender" })),
        )
        .await;

        let request = Request::builder()
            .uri("/api/cart")
            .header(SESSION_HEADER, "short")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"][0]["productId"], "lavender");
    }

    #[tokio::test]
    async fn test_invalid_session_is_rejected() {
        let app = test_app();
        let (status, body) = send(&app, empty_request("GET", "/api/cart/bad%20id!")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_products() {
        let app = test_app();

        let (status, body) = send(&app, empty_request("GET", "/api/products")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["products"].as_array().unwrap().len(), 7);

        let (_, body) = send(&app, empty_request("GET", "/api/products?category=OUTDOOR")).await;
        let products = body["products"].as_array().unwrap();
        assert!(!products.is_empty());
        assert!(products.iter().all(|p| p["category"] == "outdoor"));

        let (status, body) = send(&app, empty_request("GET", "/api/products/snake-plant")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["price"]["amount"], "24.50");

        let (status, body) = send(&app, empty_request("GET", "/api/products/fern")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found: product fern");
    }

    #[tokio::test]
    async fn test_bad_query_string_is_json_error() {
        let app = test_app();
        let response = app
            .oneshot(empty_request("GET", "/api/products?category=a&category=b"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].as_str().unwrap().contains("category"));
    }

    #[tokio::test]
    async fn test_summary_overflow_is_internal_error() {
        let catalog = ProductCatalog::from_json(
            r#"[{"id":"giant-sequoia","name":"Giant Sequoia","category":"outdoor",
                "price":{"amount":"100000000000000000000","currencyCode":"USD"}}]"#,
        )
        .unwrap();
        let app = test_app_with(catalog);

        send(
            &app,
            json_request("POST", &cart_uri(""), &json!({ "productId": "giant-sequoia" })),
        )
        .await;
        send(
            &app,
            json_request(
                "PUT",
                &cart_uri("/items/giant-sequoia"),
                &json!({ "quantity": 10_000_000_000_i64 }),
            ),
        )
        .await;

        let (status, body) = send(&app, empty_request("GET", &cart_uri("/summary"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_health_and_request_id() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(empty_request("GET", "/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));

        let (status, body) = send(&app, empty_request("GET", "/nowhere")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }
}
