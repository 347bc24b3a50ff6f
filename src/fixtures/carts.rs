//! Cart Fixtures

use serde::Deserialize;

use crate::products::ProductId;

/// Wrapper for cart contents in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart lines, in the order they were added
    pub items: Vec<CartLineFixture>,
}

/// A single cart line
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CartLineFixture {
    /// Product id
    pub product: ProductId,

    /// Units of the product
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}
