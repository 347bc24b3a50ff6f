//! Cart
//!
//! The cart store holds `(product, quantity)` pairs and is the only place
//! input is validated before it reaches the pricing engine.

use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    catalog::{Catalog, CatalogError},
    items::LineItem,
    products::{Product, ProductId},
};

/// Errors related to cart updates or pricing input.
#[derive(Debug, Error)]
pub enum CartError {
    /// A product's currency differs from the cart currency (product id, product currency, cart currency).
    #[error("Product {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(ProductId, &'static str, &'static str),

    /// The product has no line in the cart.
    #[error("Item {0} not found")]
    ItemNotFound(ProductId),

    /// A product priced below zero cannot be sold.
    #[error("Product {0} has a negative price")]
    NegativePrice(ProductId),

    /// The cart references a product the catalog doesn't have.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// A single cart row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    /// Product in the row
    pub product: ProductId,

    /// Units of the product, always at least one
    pub quantity: u32,
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart {
    lines: Vec<CartLine>,
    currency: &'static Currency,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Add one unit of a product, appending a new line if needed.
    ///
    /// Returns the new quantity for the product.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if the product's price is negative or in another currency.
    pub fn add(&mut self, product: &Product<'_>) -> Result<u32, CartError> {
        self.check_product(product)?;

        if let Some(line) = self.line_mut(product.id) {
            line.quantity = line.quantity.saturating_add(1);

            return Ok(line.quantity);
        }

        self.lines.push(CartLine {
            product: product.id,
            quantity: 1,
        });

        Ok(1)
    }

    /// Set the quantity of a product already in the cart; zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the product isn't in the cart.
    pub fn update_quantity(&mut self, id: ProductId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(id);
        }

        let line = self.line_mut(id).ok_or(CartError::ItemNotFound(id))?;

        line.quantity = quantity;

        Ok(())
    }

    /// Remove a product's line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the product isn't in the cart.
    pub fn remove(&mut self, id: ProductId) -> Result<(), CartError> {
        let before = self.lines.len();

        self.lines.retain(|line| line.product != id);

        if self.lines.len() == before {
            return Err(CartError::ItemNotFound(id));
        }

        Ok(())
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Quantity of a product, zero when absent.
    pub fn quantity(&self, id: ProductId) -> u32 {
        self.lines
            .iter()
            .find(|line| line.product == id)
            .map_or(0, |line| line.quantity)
    }

    /// Resolve every line against the catalog, in cart order.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if a product is missing from the catalog, priced
    /// below zero or in another currency.
    pub fn line_items<'a>(&self, catalog: &Catalog<'a>) -> Result<Vec<LineItem<'a>>, CartError> {
        self.lines
            .iter()
            .map(|line| {
                let product = catalog.get(line.product)?;

                self.check_product(product)?;

                Ok(LineItem::new(
                    product.id,
                    product.name.clone(),
                    product.price,
                    line.quantity,
                ))
            })
            .collect()
    }

    /// Iterate over the cart lines.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Total units across every line.
    pub fn total_units(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Get the number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn line_mut(&mut self, id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.product == id)
    }

    fn check_product(&self, product: &Product<'_>) -> Result<(), CartError> {
        let product_currency = product.price.currency();

        if product_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                product.id,
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if product.price.to_minor_units() < 0 {
            return Err(CartError::NegativePrice(product.id));
        }

        Ok(())
    }
}
