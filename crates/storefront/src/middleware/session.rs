//! Cart session extractors.
//!
//! Cart routes identify the session in one of two ways:
//!
//! - `/api/cart/{session}/...` carries it as a path segment
//! - `/api/cart` reads the `x-session-id` header, falling back to the shared
//!   anonymous cart when the header is absent or malformed
//!
//! A malformed path id is rejected with a 400 before the handler runs.

use axum::{
    extract::{FromRequestParts, RawPathParams, rejection::RawPathParamsRejection},
    http::request::Parts,
};

use verdant_core::api::SESSION_HEADER;
use verdant_core::{ProductId, SessionId};

use crate::error::AppError;

/// Path parameter naming the session.
const SESSION_PARAM: &str = "session";

/// Path parameter naming the product.
const PRODUCT_PARAM: &str = "product_id";

/// Extractor resolving the cart session for a request.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CartSession(session): CartSession) -> impl IntoResponse {
///     format!("cart for {session}")
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CartSession(pub SessionId);

impl<S> FromRequestParts<S> for CartSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(raw) = path_param(parts, state, SESSION_PARAM).await? {
            return Ok(Self(SessionId::parse(&raw)?));
        }

        let Some(value) = parts.headers.get(SESSION_HEADER) else {
            return Ok(Self(SessionId::anonymous()));
        };

        match value.to_str().map_err(|err| err.to_string()).and_then(|raw| {
            SessionId::parse(raw).map_err(|err| err.to_string())
        }) {
            Ok(session) => Ok(Self(session)),
            Err(error) => {
                tracing::warn!(%error, "ignoring malformed {SESSION_HEADER} header");
                Ok(Self(SessionId::anonymous()))
            }
        }
    }
}

/// Extractor for the `{product_id}` path segment.
#[derive(Debug, Clone)]
pub struct ProductParam(pub ProductId);

impl<S> FromRequestParts<S> for ProductParam
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = path_param(parts, state, PRODUCT_PARAM)
            .await?
            .ok_or_else(|| AppError::Validation("productId is required".to_string()))?;
        Ok(Self(ProductId::parse(&raw)?))
    }
}

/// Look up a single percent-decoded path parameter by name.
async fn path_param<S>(parts: &mut Parts, state: &S, name: &str) -> Result<Option<String>, AppError>
where
    S: Send + Sync,
{
    let params = match RawPathParams::from_request_parts(parts, state).await {
        Ok(params) => params,
        // Not routed through a path with captures
        Err(RawPathParamsRejection::MissingPathParams(_)) => return Ok(None),
        Err(rejection) => return Err(AppError::Validation(rejection.body_text())),
    };

    Ok(params
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned()))
}
