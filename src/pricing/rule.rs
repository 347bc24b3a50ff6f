//! Promotion Rule

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    discounts::fraction,
    items::{LineItem, total_units},
};

/// Errors raised when configuring a promotion rule.
#[derive(Debug, Error, PartialEq)]
pub enum PromotionRuleError {
    /// The percentage was negative or above 100%.
    #[error("promotion percentage must be between 0% and 100%, got {0}")]
    PercentOutOfRange(Decimal),

    /// A rule that is always eligible is not a promotion.
    #[error("promotion must require at least one unit")]
    ZeroMinUnits,
}

/// "Buy N, get a percentage off the next unit" configuration.
///
/// The storefront runs the default rule: with four or more stickers in the
/// cart the promotion can be applied, the four most expensive units stay at
/// full price and the next one gets 3% off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromotionRule {
    min_units: u32,
    full_price_units: usize,
    percent_off: Percentage,
}

impl PromotionRule {
    /// Units needed before the promotion can be toggled on.
    pub const DEFAULT_MIN_UNITS: u32 = 4;

    /// Units kept at full price ahead of the discounted one.
    pub const DEFAULT_FULL_PRICE_UNITS: usize = 4;

    /// Create a new rule.
    ///
    /// # Errors
    ///
    /// - [`PromotionRuleError::ZeroMinUnits`]: `min_units` is zero.
    /// - [`PromotionRuleError::PercentOutOfRange`]: `percent_off` is outside 0–100%.
    pub fn new(
        min_units: u32,
        full_price_units: usize,
        percent_off: Percentage,
    ) -> Result<Self, PromotionRuleError> {
        if min_units == 0 {
            return Err(PromotionRuleError::ZeroMinUnits);
        }

        let value = fraction(&percent_off);

        if value < Decimal::ZERO || value > Decimal::ONE {
            return Err(PromotionRuleError::PercentOutOfRange(value));
        }

        Ok(Self {
            min_units,
            full_price_units,
            percent_off,
        })
    }

    /// Units needed before the promotion becomes eligible
    pub fn min_units(&self) -> u32 {
        self.min_units
    }

    /// Number of top-priced units excluded from the discount
    pub fn full_price_units(&self) -> usize {
        self.full_price_units
    }

    /// Percentage taken off the discounted unit
    pub fn percent_off(&self) -> Percentage {
        self.percent_off
    }

    /// Whether the cart holds enough units for the promotion.
    pub fn is_eligible(&self, items: &[LineItem<'_>]) -> bool {
        total_units(items) >= u64::from(self.min_units)
    }
}

impl Default for PromotionRule {
    fn default() -> Self {
        Self {
            min_units: Self::DEFAULT_MIN_UNITS,
            full_price_units: Self::DEFAULT_FULL_PRICE_UNITS,
            percent_off: Percentage::from(Decimal::new(3, 2)),
        }
    }
}
