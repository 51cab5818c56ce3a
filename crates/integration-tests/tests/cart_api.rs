//! HTTP-level tests of the cart API against a running server.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use verdant_core::api::SESSION_HEADER;
use verdant_integration_tests::TestServer;

async fn body(resp: reqwest::Response) -> Value {
    resp.json().await.unwrap()
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;
    let resp = reqwest::get(server.url("/health")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_header_session_round_trip() {
    let server = TestServer::start().await;
    let client = Client::new();

    let resp = client
        .post(server.url("/api/cart"))
        .header(SESSION_HEADER, "browser-tab-0001")
        .json(&json!({ "productId": "snake-plant", "quantity": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let added = body(resp).await;
    assert_eq!(added["message"], "Item added to cart");
    assert_eq!(added["items"][0]["quantity"], 2);

    let resp = client
        .get(server.url("/api/cart"))
        .header(SESSION_HEADER, "browser-tab-0001")
        .send()
        .await
        .unwrap();
    assert_eq!(body(resp).await["items"], added["items"]);

    // Another tab never sees it
    let resp = client
        .get(server.url("/api/cart"))
        .header(SESSION_HEADER, "browser-tab-0002")
        .send()
        .await
        .unwrap();
    assert_eq!(body(resp).await["items"], json!([]));
}

#[tokio::test]
async fn test_missing_product_id() {
    let server = TestServer::start().await;
    let resp = Client::new()
        .post(server.url("/api/cart"))
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(resp).await["error"], "productId is required");
}

#[tokio::test]
async fn test_unsupported_method() {
    let server = TestServer::start().await;
    let resp = Client::new()
        .patch(server.url("/api/cart"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(body(resp).await["error"].is_string());
}

#[tokio::test]
async fn test_cors_preflight() {
    let server = TestServer::start().await;
    let resp = Client::new()
        .request(reqwest::Method::OPTIONS, server.url("/api/cart"))
        .header("Origin", "https://shop.example.com")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_success());
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = TestServer::start().await;
    let resp = Client::new()
        .get(server.url("/api/products"))
        .header("x-request-id", "trace-abc-123")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.headers()["x-request-id"], "trace-abc-123");
}

#[tokio::test]
async fn test_concurrent_adds_are_not_lost() {
    let server = TestServer::start().await;
    let client = Client::new();
    let url = server.url("/api/cart/concurrent-session");

    let requests = (0..25).map(|_| {
        let client = client.clone();
        let url = url.clone();
        tokio::spawn(async move {
            client
                .post(url)
                .json(&json!({ "productId": "lavender" }))
                .send()
                .await
                .unwrap()
                .status()
        })
    });
    for request in requests.collect::<Vec<_>>() {
        assert_eq!(request.await.unwrap(), StatusCode::OK);
    }

    let cart = body(client.get(&url).send().await.unwrap()).await;
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 25);
}
