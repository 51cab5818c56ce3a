//! End-to-end test harness for the Verdant cart API.
//!
//! [`TestServer`] runs the real storefront application on an ephemeral
//! localhost port; tests talk to it over HTTP with `verdant-client` or plain
//! `reqwest`.
//!
//! ```rust,ignore
//! #[tokio::test]
//! async fn test_health() {
//!     let server = TestServer::start().await;
//!     let resp = reqwest::get(server.url("/health")).await.unwrap();
//!     assert_eq!(resp.status(), 200);
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use verdant_client::CartClient;
use verdant_core::SessionId;
use verdant_storefront::catalog::ProductCatalog;
use verdant_storefront::config::StorefrontConfig;
use verdant_storefront::state::AppState;

/// A storefront server bound to `127.0.0.1:0`, stopped when dropped.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with default configuration and the built-in catalog.
    pub async fn start() -> Self {
        let catalog = ProductCatalog::builtin().expect("Built-in catalog should load");
        Self::start_with(StorefrontConfig::default(), catalog).await
    }

    /// Start a server with the given configuration and catalog.
    pub async fn start_with(config: StorefrontConfig, catalog: ProductCatalog) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no local address");
        let app = verdant_storefront::app(AppState::new(&config, catalog));

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Test server error");
        });

        Self { addr, handle }
    }

    /// Base URL of the running server, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Absolute URL for `path` on the running server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url())
    }

    /// A cart client pointed at this server.
    #[must_use]
    pub fn client(&self) -> CartClient {
        CartClient::new(&self.base_url()).expect("Test server URL is valid")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A session id unique to the calling test.
#[must_use]
pub fn test_session(name: &str) -> SessionId {
    SessionId::parse(&format!("it-{name}")).expect("Test session name is valid")
}
