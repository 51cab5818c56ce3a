//! Verdant cart API client.
//!
//! - [`CartClient`]: one HTTP request per cart operation, no retries
//! - [`SyncedCart`]: a local [`Cart`](verdant_core::Cart) copy replaced from
//!   every server response
//! - [`session`]: the client-held session token and where it is stored

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
mod error;
pub mod session;
mod synced;

pub use client::CartClient;
pub use error::{ClientError, Result};
pub use session::{FileStorage, MemoryStorage, SessionProvider, SessionStorage, StorageError};
pub use synced::SyncedCart;
