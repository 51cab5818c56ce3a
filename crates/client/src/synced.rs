//! Local cart copy kept in step with the server.

use verdant_core::api::CartSummary;
use verdant_core::{Cart, ProductId, SessionId};

use crate::client::CartClient;
use crate::error::Result;

/// A session's cart as last reported by the server.
///
/// Each successful operation replaces the local copy with the server's
/// response. A failed operation leaves the copy untouched.
#[derive(Debug, Clone)]
pub struct SyncedCart {
    client: CartClient,
    session: SessionId,
    cart: Cart,
}

impl SyncedCart {
    /// Start with an empty local copy; call [`refresh`](Self::refresh) to
    /// load the server's cart.
    #[must_use]
    pub const fn new(client: CartClient, session: SessionId) -> Self {
        Self {
            client,
            session,
            cart: Cart::new(),
        }
    }

    /// Create and immediately load the server's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be fetched.
    pub async fn load(client: CartClient, session: SessionId) -> Result<Self> {
        let mut synced = Self::new(client, session);
        synced.refresh().await?;
        Ok(synced)
    }

    /// The last cart the server reported.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn session(&self) -> &SessionId {
        &self.session
    }

    /// Replace the local copy with the server's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be fetched.
    pub async fn refresh(&mut self) -> Result<&Cart> {
        self.cart = self.client.fetch(&self.session).await?;
        Ok(&self.cart)
    }

    /// Add `quantity` units of a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the request or cannot be
    /// reached.
    pub async fn add(&mut self, product_id: &ProductId, quantity: u32) -> Result<&Cart> {
        self.cart = self.client.add(&self.session, product_id, quantity).await?;
        Ok(&self.cart)
    }

    /// Set a line's quantity; zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the request or cannot be
    /// reached.
    pub async fn update(&mut self, product_id: &ProductId, quantity: i64) -> Result<&Cart> {
        self.cart = self
            .client
            .update(&self.session, product_id, quantity)
            .await?;
        Ok(&self.cart)
    }

    /// Remove a product's line.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be reached.
    pub async fn remove(&mut self, product_id: &ProductId) -> Result<&Cart> {
        self.cart = self.client.remove(&self.session, product_id).await?;
        Ok(&self.cart)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be reached.
    pub async fn clear(&mut self) -> Result<&Cart> {
        self.cart = self.client.clear(&self.session).await?;
        Ok(&self.cart)
    }

    /// Totals at current catalog prices. Does not touch the local copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the summary cannot be fetched.
    pub async fn summary(&self) -> Result<CartSummary> {
        self.client.summary(&self.session).await
    }
}
