//! Product reference data.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product in the catalog.
///
/// Products are immutable reference data owned by the catalog. Carts refer to
/// them by [`ProductId`] only and never copy the price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Price,
    /// Image reference (URL or asset path).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
