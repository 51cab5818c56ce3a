//! Product catalog loaded at startup.
//!
//! Products are reference data: the catalog owns them, carts only hold
//! [`ProductId`]s. The catalog is read from a JSON array of products, either
//! a file named by `STOREFRONT_CATALOG_PATH` or the built-in plant catalog
//! compiled into the binary.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use verdant_core::{CurrencyCode, Price, PriceLookup, Product, ProductId};

/// Built-in catalog used when no catalog file is configured.
const BUILTIN_CATALOG: &str = include_str!("../content/catalog.json");

/// Errors that can occur while loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate product id in catalog: {0}")]
    DuplicateId(ProductId),
    #[error("product {0} has a negative price")]
    NegativePrice(ProductId),
    #[error("product {id} is priced in {found}, expected {expected}")]
    MixedCurrency {
        id: ProductId,
        expected: &'static str,
        found: &'static str,
    },
}

/// In-memory product catalog.
///
/// Cheaply cloneable; products keep the order they were listed in.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    products: Arc<Vec<Product>>,
    index: Arc<HashMap<ProductId, usize>>,
    currency: CurrencyCode,
}

impl ProductCatalog {
    /// Build a catalog from a list of products.
    ///
    /// # Errors
    ///
    /// Returns an error if two products share an id, if a price is negative,
    /// or if products are priced in more than one currency.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let currency = products
            .first()
            .map_or_else(CurrencyCode::default, |p| p.price.currency_code);

        let mut index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            if product.price.is_negative() {
                return Err(CatalogError::NegativePrice(product.id.clone()));
            }
            if product.price.currency_code != currency {
                return Err(CatalogError::MixedCurrency {
                    id: product.id.clone(),
                    expected: currency.code(),
                    found: product.price.currency_code.code(),
                });
            }
            if index.insert(product.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId(product.id.clone()));
            }
        }

        Ok(Self {
            products: Arc::new(products),
            index: Arc::new(index),
            currency,
        })
    }

    /// Parse a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or the products fail
    /// [`ProductCatalog::new`] validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::new(products)
    }

    /// Load the catalog from a file, or the built-in catalog if `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        let catalog = match path {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::from_json(&json)?
            }
            None => Self::builtin()?,
        };

        tracing::info!(
            products = catalog.len(),
            source = path.map_or_else(|| "built-in".to_string(), |p| p.display().to_string()),
            "Product catalog loaded"
        );
        Ok(catalog)
    }

    /// The catalog compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedded JSON is malformed.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// All products in listing order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.index
            .get(id)
            .and_then(|&position| self.products.get(position))
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Returns true if the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl PriceLookup for ProductCatalog {
    fn unit_price(&self, product_id: &ProductId) -> Option<Price> {
        self.get(product_id).map(|product| product.price)
    }

    fn currency(&self) -> CurrencyCode {
        self.currency
    }
}
