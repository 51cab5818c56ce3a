//! HTTP client for the cart API.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use verdant_core::api::{
    AddItemRequest, CartMutationResponse, CartResponse, CartSummary, ErrorResponse,
    ProductListResponse, UpdateQuantityRequest,
};
use verdant_core::{Cart, Product, ProductId, SessionId};

use crate::error::{ClientError, Result};

/// Longest slice of an unstructured error body kept in `ClientError::Http`.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Client for the Verdant cart API.
///
/// Every operation issues exactly one request. Failures are returned to the
/// caller as-is; nothing is retried.
#[derive(Clone)]
pub struct CartClient {
    inner: Arc<CartClientInner>,
}

struct CartClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl CartClient {
    /// Create a client for the API served at `base_url`
    /// (e.g. `http://127.0.0.1:3000`).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidBaseUrl` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    /// Create a client that sends requests through an existing
    /// `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidBaseUrl` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn with_http_client(client: reqwest::Client, base_url: &str) -> Result<Self> {
        let invalid = |reason: String| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };

        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", parsed.scheme())));
        }
        if parsed.cannot_be_a_base() {
            return Err(invalid("URL cannot be a base".to_string()));
        }

        Ok(Self {
            inner: Arc::new(CartClientInner {
                client,
                base_url: parsed,
            }),
        })
    }

    /// The base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the session's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not a cart.
    #[instrument(skip_all, fields(session = %session))]
    pub async fn fetch(&self, session: &SessionId) -> Result<Cart> {
        let url = self.endpoint(&["api", "cart", session.as_str()]);
        let response: CartResponse = self.send(self.request(Method::GET, url)).await?;
        Ok(Cart::from_items(response.items))
    }

    /// Add `quantity` units of a product to the session's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip_all, fields(session = %session, product_id = %product_id, quantity = quantity))]
    pub async fn add(
        &self,
        session: &SessionId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart> {
        let url = self.endpoint(&["api", "cart", session.as_str()]);
        let request = self
            .request(Method::POST, url)
            .json(&AddItemRequest::new(product_id, quantity));
        self.mutate(request).await
    }

    /// Set a line's quantity; zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip_all, fields(session = %session, product_id = %product_id, quantity = quantity))]
    pub async fn update(
        &self,
        session: &SessionId,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<Cart> {
        let url = self.endpoint(&["api", "cart", session.as_str(), "items", product_id.as_str()]);
        let request = self.request(Method::PUT, url).json(&UpdateQuantityRequest {
            quantity: Some(quantity),
        });
        self.mutate(request).await
    }

    /// Remove a product's line. Removing an absent product succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip_all, fields(session = %session, product_id = %product_id))]
    pub async fn remove(&self, session: &SessionId, product_id: &ProductId) -> Result<Cart> {
        let url = self.endpoint(&["api", "cart", session.as_str(), "items", product_id.as_str()]);
        self.mutate(self.request(Method::DELETE, url)).await
    }

    /// Empty the session's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip_all, fields(session = %session))]
    pub async fn clear(&self, session: &SessionId) -> Result<Cart> {
        let url = self.endpoint(&["api", "cart", session.as_str()]);
        self.mutate(self.request(Method::DELETE, url)).await
    }

    /// Totals for the session's cart at current catalog prices.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip_all, fields(session = %session))]
    pub async fn summary(&self, session: &SessionId) -> Result<CartSummary> {
        let url = self.endpoint(&["api", "cart", session.as_str(), "summary"]);
        self.send(self.request(Method::GET, url)).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List the catalog, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn products(&self, category: Option<&str>) -> Result<Vec<Product>> {
        let mut url = self.endpoint(&["api", "products"]);
        if let Some(category) = category {
            url.query_pairs_mut().append_pair("category", category);
        }
        let response: ProductListResponse = self.send(self.request(Method::GET, url)).await?;
        Ok(response.products)
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` with status 404 for an unknown product.
    #[instrument(skip_all, fields(product_id = %product_id))]
    pub async fn product(&self, product_id: &ProductId) -> Result<Product> {
        let url = self.endpoint(&["api", "products", product_id.as_str()]);
        self.send(self.request(Method::GET, url)).await
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Resolve path segments against the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        // Checked in the constructor
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner.client.request(method, url)
    }

    async fn mutate(&self, request: RequestBuilder) -> Result<Cart> {
        let response: CartMutationResponse = self.send(request).await?;
        debug!(message = %response.message, lines = response.items.len(), "Cart updated");
        Ok(Cart::from_items(response.items))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &body);
            debug!(status = %status, message = %message, "Cart API returned non-success status");
            return Err(ClientError::Http { status, message });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(
                error = %e,
                body = %body.chars().take(MAX_ERROR_BODY_CHARS).collect::<String>(),
                "Failed to parse cart API response"
            );
            ClientError::Decode(e)
        })
    }
}

impl std::fmt::Debug for CartClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Message for a failed response: the `{error}` field when present, else a
/// prefix of the raw body, else the status reason.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(ErrorResponse { error }) = serde_json::from_str::<ErrorResponse>(body) {
        return error;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
    }
}
