//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::ProductCatalog;
use crate::config::StorefrontConfig;
use crate::store::CartStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// cart store and the product catalog. Handlers receive it
/// through axum's `State` extractor; there is no global cart state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    catalog: ProductCatalog,
    carts: CartStore,
}

impl AppState {
    /// Create a new application state with an empty cart store.
    #[must_use]
    pub fn new(config: &StorefrontConfig, catalog: ProductCatalog) -> Self {
        let carts = CartStore::new(&config.cart);

        Self {
            inner: Arc::new(AppStateInner { catalog, carts }),
        }
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &ProductCatalog {
        &self.inner.catalog
    }

    /// Get a reference to the session cart store.
    #[must_use]
    pub fn carts(&self) -> &CartStore {
        &self.inner.carts
    }
}
