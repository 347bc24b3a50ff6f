//! Items
//!
//! Line items are what the cart hands to the pricing engine. Units are the
//! per-sticker expansion the discount rule works on.

use rusty_money::{Money, iso::Currency};

use crate::products::ProductId;

/// A cart row: one product and how many of it.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem<'a> {
    id: ProductId,
    name: String,
    unit_price: Money<'a, Currency>,
    quantity: u32,
}

impl<'a> LineItem<'a> {
    /// Creates a new line item.
    ///
    /// Quantity must be at least one; the cart store never produces empty lines.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Money<'a, Currency>,
        quantity: u32,
    ) -> Self {
        debug_assert!(quantity > 0, "line items must carry at least one unit");

        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    /// Returns the product id
    pub fn id(&self) -> ProductId {
        self.id
    }

    /// Returns the display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the price of a single unit
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Line total in minor units, before any promotion.
    pub fn total_minor(&self) -> i64 {
        self.unit_price.to_minor_units() * i64::from(self.quantity)
    }
}

/// One physical unit of a line item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CartUnit {
    /// Index of the originating line item
    pub line: usize,

    /// Product id of the originating line item
    pub id: ProductId,

    /// Unit price in minor units
    pub unit_price: i64,
}

/// Total number of units across all line items.
pub fn total_units(items: &[LineItem<'_>]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity())).sum()
}

/// Expand line items into one [`CartUnit`] per physical unit, in line order.
pub fn expand_units(items: &[LineItem<'_>]) -> Vec<CartUnit> {
    let capacity = usize::try_from(total_units(items)).unwrap_or(0);
    let mut units = Vec::with_capacity(capacity);

    for (line, item) in items.iter().enumerate() {
        let unit = CartUnit {
            line,
            id: item.id(),
            unit_price: item.unit_price().to_minor_units(),
        };

        units.extend((0..item.quantity()).map(|_| unit));
    }

    units
}
