//! Pricing
//!
//! Turns cart line items into a subtotal, a promotional discount and a
//! per-line breakdown that reconciles exactly to the final total.
//!
//! When the promotion is eligible and applied, every line item is expanded
//! into individual units which are stably sorted by unit price, highest
//! first. The first [`PromotionRule::full_price_units`] units stay at full
//! price and the unit directly after them is the only one discounted. Units
//! with equal prices keep cart order, so the earliest line wins a tie.
//!
//! All arithmetic is done in integer minor units. The discount is rounded to
//! the minor unit once, and the discounted unit price is derived from it, so
//! nothing drifts when the breakdown is summed.

use rusty_money::{Money, MoneyError, iso::Currency};
use tracing::{debug, warn};

use crate::{
    discounts::percent_of_minor,
    items::{CartUnit, LineItem, expand_units},
    products::ProductId,
};

pub mod rule;

pub use rule::{PromotionRule, PromotionRuleError};

/// How a discounted line splits between full-price and discounted units.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountDetail<'a> {
    /// Units charged at full price
    pub regular_count: u32,

    /// Units charged at the discounted price
    pub discounted_count: u32,

    /// Full unit price
    pub regular_unit_price: Money<'a, Currency>,

    /// Unit price after the discount
    pub discounted_unit_price: Money<'a, Currency>,
}

/// Priced outcome for a single line item.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountOutcome<'a> {
    /// Product id of the line
    pub id: ProductId,

    /// Display name of the line
    pub name: String,

    /// Units on the line
    pub quantity: u32,

    /// Full unit price
    pub unit_price: Money<'a, Currency>,

    /// Amount charged for the whole line
    pub total_price: Money<'a, Currency>,

    /// Whether any unit on this line was discounted
    pub discounted: bool,

    /// Split between regular and discounted units, when discounted
    pub detail: Option<DiscountDetail<'a>>,
}

impl<'a> DiscountOutcome<'a> {
    fn full_price(item: &LineItem<'a>) -> Self {
        let unit_price = *item.unit_price();

        Self {
            id: item.id(),
            name: item.name().to_string(),
            quantity: item.quantity(),
            unit_price,
            total_price: Money::from_minor(item.total_minor(), unit_price.currency()),
            discounted: false,
            detail: None,
        }
    }

    fn with_discounted_unit(item: &LineItem<'a>, discount_minor: i64) -> Self {
        let unit_price = *item.unit_price();
        let currency = unit_price.currency();

        let regular_count = item.quantity().saturating_sub(1);
        let discounted_minor = unit_price.to_minor_units() - discount_minor;
        let total_minor =
            unit_price.to_minor_units() * i64::from(regular_count) + discounted_minor;

        Self {
            id: item.id(),
            name: item.name().to_string(),
            quantity: item.quantity(),
            unit_price,
            total_price: Money::from_minor(total_minor, currency),
            discounted: true,
            detail: Some(DiscountDetail {
                regular_count,
                discounted_count: 1,
                regular_unit_price: unit_price,
                discounted_unit_price: Money::from_minor(discounted_minor, currency),
            }),
        }
    }

    /// Line total before any discount.
    pub fn base_total(&self) -> Money<'a, Currency> {
        Money::from_minor(
            self.unit_price.to_minor_units() * i64::from(self.quantity),
            self.unit_price.currency(),
        )
    }

    /// Amount saved on this line.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.base_total().sub(self.total_price)
    }
}

/// The unit the promotion landed on.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountedUnit<'a> {
    /// Product id of the discounted unit
    pub id: ProductId,

    /// Display name of the discounted unit
    pub name: String,

    /// Price before the discount
    pub original_price: Money<'a, Currency>,

    /// Price after the discount
    pub discounted_price: Money<'a, Currency>,
}

/// Totals and breakdown for a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingResult<'a> {
    /// Sum of every line at full price
    pub subtotal: Money<'a, Currency>,

    /// Promotional discount
    pub discount: Money<'a, Currency>,

    /// Amount due, `subtotal - discount`
    pub final_total: Money<'a, Currency>,

    /// One outcome per line item, in cart order
    pub breakdown: Vec<DiscountOutcome<'a>>,

    /// The discounted unit, if the promotion took effect
    pub discounted_unit: Option<DiscountedUnit<'a>>,
}

impl PricingResult<'_> {
    /// Whether a discount was taken off the total.
    pub fn is_discounted(&self) -> bool {
        self.discounted_unit.is_some()
    }
}

/// The unit chosen for discount and the amount taken off it.
#[derive(Debug, Clone, Copy)]
struct Selection {
    unit: CartUnit,
    discount_minor: i64,
}

/// Pricing engine for a single promotion rule.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    rule: PromotionRule,
    currency: &'static Currency,
}

impl PricingEngine {
    /// Create an engine. `currency` is only used to price an empty cart.
    pub fn new(rule: PromotionRule, currency: &'static Currency) -> Self {
        Self { rule, currency }
    }

    /// Return the promotion rule
    pub fn rule(&self) -> &PromotionRule {
        &self.rule
    }

    /// Whether the cart holds enough units for the promotion.
    pub fn is_promo_eligible(&self, items: &[LineItem<'_>]) -> bool {
        self.rule.is_eligible(items)
    }

    /// Price the cart.
    ///
    /// The discount is only computed when the cart is both eligible and the
    /// promotion has been applied.
    #[tracing::instrument(
        level = "debug",
        name = "pricing.compute",
        skip(self, items),
        fields(lines = items.len())
    )]
    pub fn compute<'a>(
        &self,
        items: &[LineItem<'a>],
        promo_eligible: bool,
        promo_applied: bool,
    ) -> PricingResult<'a> {
        let fallback: &'a Currency = self.currency;
        let currency = items
            .first()
            .map_or(fallback, |item| item.unit_price().currency());

        debug_assert!(
            items.iter().all(|item| item.unit_price().currency() == currency),
            "line items must share a currency"
        );

        let subtotal_minor: i64 = items.iter().map(LineItem::total_minor).sum();

        let selection = if promo_eligible && promo_applied {
            self.select(items)
        } else {
            None
        };

        let breakdown = items
            .iter()
            .enumerate()
            .map(|(line, item)| match selection {
                Some(selection) if selection.unit.line == line => {
                    DiscountOutcome::with_discounted_unit(item, selection.discount_minor)
                }
                _ => DiscountOutcome::full_price(item),
            })
            .collect();

        let discounted_unit = selection.and_then(|selection| {
            items.get(selection.unit.line).map(|item| DiscountedUnit {
                id: item.id(),
                name: item.name().to_string(),
                original_price: *item.unit_price(),
                discounted_price: Money::from_minor(
                    selection.unit.unit_price - selection.discount_minor,
                    currency,
                ),
            })
        });

        let discount_minor = selection.map_or(0, |selection| selection.discount_minor);

        PricingResult {
            subtotal: Money::from_minor(subtotal_minor, currency),
            discount: Money::from_minor(discount_minor, currency),
            final_total: Money::from_minor(subtotal_minor - discount_minor, currency),
            breakdown,
            discounted_unit,
        }
    }

    /// Pick the unit directly after the full-price ones in price order.
    fn select(&self, items: &[LineItem<'_>]) -> Option<Selection> {
        let mut units = expand_units(items);

        // `sort_by` is stable: equal prices stay in cart order.
        units.sort_by(|a, b| b.unit_price.cmp(&a.unit_price));

        let Some(unit) = units.get(self.rule.full_price_units()).copied() else {
            debug!(
                units = units.len(),
                "not enough units for a discounted position"
            );

            return None;
        };

        match percent_of_minor(&self.rule.percent_off(), unit.unit_price) {
            Ok(discount_minor) => {
                debug!(
                    product = %unit.id,
                    unit_price = unit.unit_price,
                    discount = discount_minor,
                    "discounted unit selected"
                );

                Some(Selection {
                    unit,
                    discount_minor,
                })
            }
            Err(err) => {
                warn!(product = %unit.id, error = %err, "discount not representable; skipping");

                None
            }
        }
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(PromotionRule::default(), rusty_money::iso::USD)
    }
}

/// Price a cart with the storefront's default promotion rule.
pub fn compute_pricing<'a>(
    items: &[LineItem<'a>],
    promo_eligible: bool,
    promo_applied: bool,
) -> PricingResult<'a> {
    PricingEngine::default().compute(items, promo_eligible, promo_applied)
}

/// Whether the cart qualifies for the storefront's default promotion.
pub fn is_promo_eligible(items: &[LineItem<'_>]) -> bool {
    PromotionRule::default().is_eligible(items)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;

    fn line<'a>(id: u32, dollars: i64, quantity: u32) -> LineItem<'a> {
        LineItem::new(id, format!("Sticker {id}"), Money::from_minor(dollars * 100, USD), quantity)
    }

    fn breakdown_sum(result: &PricingResult<'_>) -> i64 {
        result
            .breakdown
            .iter()
            .map(|outcome| outcome.total_price.to_minor_units())
            .sum()
    }

    #[test]
    fn full_price_outcome_multiplies_quantity() {
        let outcome = DiscountOutcome::full_price(&line(1, 250, 2));

        assert_eq!(outcome.total_price, Money::from_minor(50_000, USD));
        assert!(!outcome.discounted);
        assert!(outcome.detail.is_none());
    }

    #[test]
    fn discounted_outcome_splits_regular_and_discounted_units() {
        let outcome = DiscountOutcome::with_discounted_unit(&line(1, 100, 3), 300);

        let detail = outcome.detail.clone();

        assert_eq!(outcome.total_price, Money::from_minor(29_700, USD));
        assert_eq!(
            detail,
            Some(DiscountDetail {
                regular_count: 2,
                discounted_count: 1,
                regular_unit_price: Money::from_minor(10_000, USD),
                discounted_unit_price: Money::from_minor(9_700, USD),
            })
        );
    }

    #[test]
    fn outcome_savings_is_base_minus_total() -> TestResult {
        let outcome = DiscountOutcome::with_discounted_unit(&line(1, 50, 2), 150);

        assert_eq!(outcome.base_total(), Money::from_minor(10_000, USD));
        assert_eq!(outcome.savings()?, Money::from_minor(150, USD));

        Ok(())
    }

    #[test]
    fn select_returns_none_below_discount_position() {
        let engine = PricingEngine::default();

        assert!(engine.select(&[line(1, 300, 4)]).is_none());
    }

    #[test]
    fn select_prefers_earlier_line_on_price_tie() {
        let engine = PricingEngine::default();
        let items = [line(1, 200, 4), line(2, 90, 1), line(3, 90, 1)];

        let selection = engine.select(&items).map(|selection| selection.unit.id);

        assert_eq!(selection, Some(ProductId(2)));
    }

    #[test]
    fn compute_uses_engine_currency_for_empty_cart() {
        let engine = PricingEngine::new(PromotionRule::default(), rusty_money::iso::GBP);
        let result = engine.compute(&[], false, true);

        assert_eq!(result.final_total.currency(), rusty_money::iso::GBP);
        assert_eq!(breakdown_sum(&result), 0);
    }

    #[test]
    fn compute_respects_custom_rule() -> TestResult {
        let rule = PromotionRule::new(
            2,
            1,
            decimal_percentage::Percentage::from(rust_decimal::Decimal::new(5, 1)),
        )?;
        let engine = PricingEngine::new(rule, USD);
        let items = [line(1, 10, 1), line(2, 30, 1)];

        let result = engine.compute(&items, engine.is_promo_eligible(&items), true);

        // 30 stays at full price, 10 is half off
        assert_eq!(result.discount, Money::from_minor(500, USD));
        assert_eq!(result.final_total, Money::from_minor(3_500, USD));
        assert_eq!(breakdown_sum(&result), 3_500);

        Ok(())
    }

    #[test]
    fn is_discounted_follows_discounted_unit() {
        let items = [line(1, 100, 5)];

        assert!(compute_pricing(&items, true, true).is_discounted());
        assert!(!compute_pricing(&items, true, false).is_discounted());
    }
}
