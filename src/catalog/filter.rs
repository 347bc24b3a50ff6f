//! Catalog Filters

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::products::Product;

/// Errors parsing a price range.
#[derive(Debug, Error, PartialEq)]
pub enum PriceRangeError {
    /// The range was not `All`, `MIN-MAX` or `MIN-`.
    #[error("Invalid price range: {0}")]
    Invalid(String),

    /// The upper bound is below the lower bound.
    #[error("Price range {0} has its upper bound below its lower bound")]
    Inverted(String),
}

/// Price band in whole currency units, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceRange {
    /// Any price
    #[default]
    All,

    /// `min <= price`, and `price <= max` when `max` is set
    Between {
        /// Lower bound
        min: u32,
        /// Upper bound, open-ended when `None`
        max: Option<u32>,
    },
}

impl PriceRange {
    /// Whether a price falls in this range, compared in whole currency units.
    pub fn contains(&self, price: &Money<'_, Currency>) -> bool {
        let amount = *price.amount();

        match *self {
            PriceRange::All => true,
            PriceRange::Between { min, max } => {
                amount >= Decimal::from(min) && max.is_none_or(|max| amount <= Decimal::from(max))
            }
        }
    }
}

impl FromStr for PriceRange {
    type Err = PriceRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(PriceRange::All);
        }

        let (min, max) = trimmed
            .split_once('-')
            .ok_or_else(|| PriceRangeError::Invalid(s.to_string()))?;

        let min = min
            .trim()
            .parse::<u32>()
            .map_err(|_err| PriceRangeError::Invalid(s.to_string()))?;

        let max = match max.trim() {
            "" => None,
            max => Some(
                max.parse::<u32>()
                    .map_err(|_err| PriceRangeError::Invalid(s.to_string()))?,
            ),
        };

        if max.is_some_and(|max| max < min) {
            return Err(PriceRangeError::Inverted(s.to_string()));
        }

        Ok(PriceRange::Between { min, max })
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceRange::All => write!(f, "All"),
            PriceRange::Between { min, max: Some(max) } => write!(f, "{min}-{max}"),
            PriceRange::Between { min, max: None } => write!(f, "{min}-"),
        }
    }
}

/// Category selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Every category
    #[default]
    All,

    /// A single named category
    Named(String),
}

impl CategoryFilter {
    /// Filter on a single category; `"All"` selects every category.
    pub fn named(category: impl Into<String>) -> Self {
        let category = category.into();

        if category == "All" {
            CategoryFilter::All
        } else {
            CategoryFilter::Named(category)
        }
    }

    /// Whether the category is selected.
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => name == category,
        }
    }
}

/// Combined category and price filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogFilter {
    /// Category selection
    pub category: CategoryFilter,

    /// Price band
    pub price: PriceRange,
}

impl CatalogFilter {
    /// Whether a product passes both filters.
    pub fn matches(&self, product: &Product<'_>) -> bool {
        self.category.matches(&product.category)
            && self.price.contains(&product.price)
    }
}
