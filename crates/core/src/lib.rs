//! Verdant Core - Shared cart and catalog types.
//!
//! This crate provides the types used across all Verdant components:
//! - `storefront` - HTTP server owning the canonical in-memory carts
//! - `client` - Typed client for the cart API and session provider
//! - `cli` - Command-line front end over the client
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP, no
//! clocks beyond `chrono::Utc::now()` for line-item timestamps. This keeps it
//! lightweight and usable on both sides of the wire.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, and products
//! - [`api`] - JSON request and response bodies of the cart API
//! - [`cart`] - The cart state container and its line items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod types;

pub use cart::{Cart, CartLineItem, PriceLookup};
pub use types::*;
