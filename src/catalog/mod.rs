//! Catalog
//!
//! Immutable product records, looked up by [`ProductId`] and filtered the way
//! the storefront's category and price buttons do.

use rusty_money::iso::Currency;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use thiserror::Error;

use crate::products::{Product, ProductId, ProductKey};

pub mod filter;

pub use filter::{CatalogFilter, CategoryFilter, PriceRange, PriceRangeError};

/// Errors related to catalog construction.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Two products share the same id.
    #[error("Duplicate product id {0}")]
    DuplicateProduct(ProductId),

    /// A product's currency differs from the catalog currency (product id, product currency, catalog currency).
    #[error("Product {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(ProductId, &'static str, &'static str),

    /// A product was not found in the catalog.
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),
}

/// Catalog
#[derive(Debug)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    index: FxHashMap<ProductId, ProductKey>,
    order: Vec<ProductKey>,
    currency: &'static Currency,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Catalog {
            products: SlotMap::with_key(),
            index: FxHashMap::default(),
            order: Vec::new(),
            currency,
        }
    }

    /// Create a catalog with the given products, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` on duplicate ids or a currency mismatch.
    pub fn with_products(
        products: impl IntoIterator<Item = Product<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(currency);

        for product in products {
            catalog.insert(product)?;
        }

        Ok(catalog)
    }

    /// Add a product to the end of the catalog.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` on a duplicate id or a currency mismatch.
    pub fn insert(&mut self, product: Product<'a>) -> Result<ProductKey, CatalogError> {
        if self.index.contains_key(&product.id) {
            return Err(CatalogError::DuplicateProduct(product.id));
        }

        let product_currency = product.price.currency();

        if product_currency != self.currency {
            return Err(CatalogError::CurrencyMismatch(
                product.id,
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let id = product.id;
        let key = self.products.insert(product);

        self.index.insert(id, key);
        self.order.push(key);

        Ok(key)
    }

    /// Look up a product by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if no product has that id.
    pub fn get(&self, id: ProductId) -> Result<&Product<'a>, CatalogError> {
        self.index
            .get(&id)
            .and_then(|key| self.products.get(*key))
            .ok_or(CatalogError::ProductNotFound(id))
    }

    /// Iterate over the products in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Product<'a>> {
        self.order.iter().filter_map(|key| self.products.get(*key))
    }

    /// Products matching the filter, in catalog order.
    pub fn filter<'c>(&'c self, filter: &CatalogFilter) -> Vec<&'c Product<'a>> {
        self.iter().filter(|product| filter.matches(product)).collect()
    }

    /// Distinct categories, in order of first appearance.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();

        for product in self.iter() {
            if !categories.contains(&product.category.as_str()) {
                categories.push(product.category.as_str());
            }
        }

        categories
    }

    /// Get the number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Get the currency of the catalog.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
