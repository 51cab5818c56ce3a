//! Session-keyed in-memory cart store.
//!
//! Each session id maps to its own [`Cart`] behind a `tokio::sync::Mutex`.
//! The map itself is a `moka` cache, which gives us:
//!
//! - creation on first mutating access (`get_with`)
//! - eviction of carts idle for longer than `CART_IDLE_TTL_SECS`
//! - a hard cap on the number of sessions held in memory
//!
//! Reads of an unknown session return an empty cart without creating one.
//! Nothing is persisted: a restart drops every cart.

use std::sync::Arc;

use moka::future::Cache;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use verdant_core::{Cart, ProductId, SessionId};

use crate::config::CartStoreConfig;

type SharedCart = Arc<Mutex<Cart>>;

/// Process-wide cart storage, owned by [`AppState`](crate::state::AppState).
#[derive(Clone)]
pub struct CartStore {
    carts: Cache<SessionId, SharedCart>,
}

impl CartStore {
    /// Create an empty store with the given limits.
    #[must_use]
    pub fn new(config: &CartStoreConfig) -> Self {
        let carts = Cache::builder()
            .max_capacity(config.max_sessions)
            .time_to_idle(config.idle_ttl)
            .eviction_listener(|session: Arc<SessionId>, _cart, cause| {
                debug!(session = %session, ?cause, "Cart evicted");
            })
            .build();

        Self { carts }
    }

    /// Copy of the session's cart, or an empty cart if it has none.
    pub async fn snapshot(&self, session: &SessionId) -> Cart {
        match self.carts.get(session).await {
            Some(cart) => cart.lock().await.clone(),
            None => Cart::new(),
        }
    }

    /// Add `quantity` units of a product, creating the cart if needed.
    ///
    /// Returns the cart after the change.
    #[instrument(skip_all, fields(session = %session, product_id = %product_id))]
    pub async fn add_item(&self, session: &SessionId, product_id: &ProductId, quantity: u32) -> Cart {
        let cart = self
            .carts
            .get_with(session.clone(), async {
                debug!("Creating cart");
                Arc::new(Mutex::new(Cart::new()))
            })
            .await;

        let mut cart = cart.lock().await;
        let total = cart.add_item(product_id, quantity);
        debug!(quantity = total, "Line quantity after add");
        cart.clone()
    }

    /// Set a line's quantity; zero or less removes it.
    ///
    /// Unknown sessions and products are left untouched.
    #[instrument(skip_all, fields(session = %session, product_id = %product_id))]
    pub async fn update_quantity(
        &self,
        session: &SessionId,
        product_id: &ProductId,
        quantity: i64,
    ) -> Cart {
        self.modify_existing(session, |cart| {
            cart.update_quantity(product_id, quantity);
        })
        .await
    }

    /// Remove a product's line if present.
    #[instrument(skip_all, fields(session = %session, product_id = %product_id))]
    pub async fn remove_item(&self, session: &SessionId, product_id: &ProductId) -> Cart {
        self.modify_existing(session, |cart| {
            cart.remove_item(product_id);
        })
        .await
    }

    /// Empty the session's cart.
    #[instrument(skip_all, fields(session = %session))]
    pub async fn clear(&self, session: &SessionId) -> Cart {
        self.modify_existing(session, Cart::clear).await
    }

    /// Approximate number of sessions currently holding a cart.
    #[must_use]
    pub fn session_count(&self) -> u64 {
        self.carts.entry_count()
    }

    /// Run a mutation against an existing cart without creating one.
    async fn modify_existing<F>(&self, session: &SessionId, mutate: F) -> Cart
    where
        F: FnOnce(&mut Cart),
    {
        let Some(cart) = self.carts.get(session).await else {
            debug!("No cart for session, nothing to change");
            return Cart::new();
        };

        let mut cart = cart.lock().await;
        mutate(&mut cart);
        cart.clone()
    }

    #[cfg(test)]
    pub(crate) async fn sync(&self) {
        self.carts.run_pending_tasks().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn store() -> CartStore {
        CartStore::new(&CartStoreConfig::default())
    }

    fn session(s: &str) -> SessionId {
        SessionId::parse(s).unwrap()
    }

    fn pid(s: &str) -> ProductId {
        ProductId::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_add_creates_cart() {
        let store = store();
        let alice = session("alice-session");

        assert!(store.snapshot(&alice).await.is_empty());

        let cart = store.add_item(&alice, &pid("p1"), 2).await;
        assert_eq!(cart.total_items(), 2);

        let cart = store.add_item(&alice, &pid("p1"), 3).await;
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&pid("p1")).unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = store();
        let alice = session("alice-session");
        let bob = session("bob-session1");

        store.add_item(&alice, &pid("fern"), 1).await;
        store.add_item(&bob, &pid("cactus"), 4).await;

        let alice_cart = store.snapshot(&alice).await;
        let bob_cart = store.snapshot(&bob).await;
        assert!(alice_cart.get(&pid("cactus")).is_none());
        assert!(bob_cart.get(&pid("fern")).is_none());
        assert_eq!(bob_cart.total_items(), 4);
    }

    #[tokio::test]
    async fn test_reads_do_not_create_carts() {
        let store = store();
        let ghost = session("ghost-session");

        store.snapshot(&ghost).await;
        store.remove_item(&ghost, &pid("p1")).await;
        store.update_quantity(&ghost, &pid("p1"), 3).await;
        store.clear(&ghost).await;
        store.sync().await;

        assert_eq!(store.session_count(), 0);
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let store = store();
        let s = session("update-session");
        store.add_item(&s, &pid("a"), 1).await;
        store.add_item(&s, &pid("b"), 1).await;

        let cart = store.update_quantity(&s, &pid("a"), 7).await;
        assert_eq!(cart.get(&pid("a")).unwrap().quantity, 7);

        let cart = store.update_quantity(&s, &pid("a"), 0).await;
        assert!(cart.get(&pid("a")).is_none());

        let cart = store.remove_item(&s, &pid("missing")).await;
        assert_eq!(cart.len(), 1);

        let cart = store.remove_item(&s, &pid("b")).await;
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let store = store();
        let s = session("clear-session");
        store.add_item(&s, &pid("a"), 2).await;

        assert!(store.clear(&s).await.is_empty());
        assert!(store.snapshot(&s).await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_not_lost() {
        let store = store();
        let s = session("busy-session");

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let store = store.clone();
                let s = s.clone();
                tokio::spawn(async move {
                    store.add_item(&s, &pid("p1"), 1).await;
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let cart = store.snapshot(&s).await;
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_items(), 50);
    }

    #[tokio::test]
    async fn test_idle_carts_expire() {
        let store = CartStore::new(&CartStoreConfig {
            idle_ttl: Duration::from_millis(50),
            max_sessions: 100,
        });
        let s = session("sleepy-session");
        store.add_item(&s, &pid("p1"), 1).await;

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(store.snapshot(&s).await.is_empty());
    }
}
