//! Cart state container.
//!
//! A [`Cart`] is an ordered list of [`CartLineItem`]s with at most one line
//! per product. Every mutation keeps two invariants:
//!
//! - each line's quantity is at least 1 (a line that would drop to zero is
//!   removed instead)
//! - no two lines share a [`ProductId`]
//!
//! Totals are derived on every call. [`Cart::total_price`] looks up the
//! current unit price through a [`PriceLookup`], so a catalog price change is
//! reflected in every cart holding that product.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CurrencyCode, Price, ProductId};

/// A single product line in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub product_id: ProductId,
    /// Always at least 1 while the line is in a cart.
    pub quantity: u32,
    /// When the line was first created. Later adds keep the original time.
    pub added_at: DateTime<Utc>,
}

/// Source of current unit prices for cart totals.
pub trait PriceLookup {
    /// Current unit price of a product, or `None` if it is unknown.
    fn unit_price(&self, product_id: &ProductId) -> Option<Price>;

    /// Currency that cart totals are expressed in.
    fn currency(&self) -> CurrencyCode {
        CurrencyCode::default()
    }
}

impl PriceLookup for HashMap<ProductId, Price> {
    fn unit_price(&self, product_id: &ProductId) -> Option<Price> {
        self.get(product_id).copied()
    }
}

/// An ordered collection of line items for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Rebuild a cart from raw line items, e.g. a server response.
    ///
    /// Lines with a zero quantity are dropped and duplicate products are
    /// merged into the first occurrence, so the result always satisfies the
    /// cart invariants.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartLineItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            match cart.position(&item.product_id) {
                Some(idx) => {
                    if let Some(line) = cart.items.get_mut(idx) {
                        line.quantity = line.quantity.saturating_add(item.quantity);
                    }
                }
                None => cart.items.push(item),
            }
        }
        cart
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Consume the cart and return its line items.
    #[must_use]
    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }

    /// The line for a product, if present.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|line| &line.product_id == product_id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `quantity` units of a product, stamping new lines with the current time.
    ///
    /// See [`Cart::add_item_at`].
    pub fn add_item(&mut self, product_id: &ProductId, quantity: u32) -> u32 {
        self.add_item_at(product_id, quantity, Utc::now())
    }

    /// Add `quantity` units of a product.
    ///
    /// If the product already has a line, its quantity grows by `quantity`
    /// (saturating at `u32::MAX`); otherwise a new line stamped `added_at` is
    /// appended. Adding zero units is a no-op.
    ///
    /// Returns the product's quantity after the call (0 if it has no line).
    pub fn add_item_at(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
        added_at: DateTime<Utc>,
    ) -> u32 {
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| &line.product_id == product_id)
        {
            line.quantity = line.quantity.saturating_add(quantity);
            return line.quantity;
        }

        if quantity == 0 {
            return 0;
        }

        self.items.push(CartLineItem {
            product_id: product_id.clone(),
            quantity,
            added_at,
        });
        quantity
    }

    /// Set the quantity of a product's line.
    ///
    /// A quantity of zero or less removes the line. Updating a product with
    /// no line is a no-op. Returns true if the cart changed.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_item(product_id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self
            .items
            .iter_mut()
            .find(|line| &line.product_id == product_id)
        {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Remove a product's line. Returns true if a line was removed.
    pub fn remove_item(&mut self, product_id: &ProductId) -> bool {
        match self.position(product_id) {
            Some(idx) => {
                self.items.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of unit price times quantity across all lines.
    ///
    /// Prices come from `prices` on every call; nothing is cached. Lines whose
    /// product is unknown to `prices`, or priced in a different currency, add
    /// nothing (see [`Cart::unpriced_items`]).
    ///
    /// Returns `None` if the total does not fit in a `Decimal`.
    #[must_use]
    pub fn total_price<P: PriceLookup + ?Sized>(&self, prices: &P) -> Option<Price> {
        let currency = prices.currency();
        self.items
            .iter()
            .filter_map(|line| {
                prices
                    .unit_price(&line.product_id)
                    .filter(|price| price.currency_code == currency)
                    .map(|price| price.checked_times(line.quantity))
            })
            .try_fold(Price::zero(currency), |total, line_total| {
                total.checked_add(line_total?)
            })
    }

    /// Products whose lines [`Cart::total_price`] could not price.
    #[must_use]
    pub fn unpriced_items<P: PriceLookup + ?Sized>(&self, prices: &P) -> Vec<ProductId> {
        let currency = prices.currency();
        self.items
            .iter()
            .filter(|line| {
                prices
                    .unit_price(&line.product_id)
                    .is_none_or(|price| price.currency_code != currency)
            })
            .map(|line| line.product_id.clone())
            .collect()
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|line| &line.product_id == product_id)
    }
}
