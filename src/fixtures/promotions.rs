//! Promotion Fixtures

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{fixtures::FixtureError, pricing::PromotionRule};

/// Wrapper for the promotion rule in YAML
#[derive(Debug, Deserialize)]
pub struct PromotionsFixture {
    /// The rule the storefront runs
    pub promotion: PromotionFixture,
}

/// Promotion rule fixture
#[derive(Debug, Deserialize)]
pub struct PromotionFixture {
    /// Units needed before the promotion can be applied
    #[serde(default = "default_min_units")]
    pub min_units: u32,

    /// Top-priced units kept at full price
    #[serde(default = "default_full_price_units")]
    pub full_price_units: usize,

    /// Percentage off the next unit (e.g., "3%" or "0.03")
    pub percent_off: String,
}

fn default_min_units() -> u32 {
    PromotionRule::DEFAULT_MIN_UNITS
}

fn default_full_price_units() -> usize {
    PromotionRule::DEFAULT_FULL_PRICE_UNITS
}

impl TryFrom<PromotionFixture> for PromotionRule {
    type Error = FixtureError;

    fn try_from(fixture: PromotionFixture) -> Result<Self, Self::Error> {
        let percent_off = parse_percentage(&fixture.percent_off)?;

        Ok(PromotionRule::new(
            fixture.min_units,
            fixture.full_price_units,
            percent_off,
        )?)
    }
}

/// Parse percentage string (e.g., "3%" or "0.03") into a `Percentage`
///
/// # Errors
///
/// Returns an error if the string cannot be parsed as a decimal.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    let (number, divisor) = match trimmed.strip_suffix('%') {
        Some(percent_str) => (percent_str.trim(), Decimal::ONE_HUNDRED),
        None => (trimmed, Decimal::ONE),
    };

    let value = number
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

    Ok(Percentage::from(value / divisor))
}

#[cfg(test)]
mod tests {
    use crate::{discounts::fraction, pricing::PromotionRuleError};

    use super::*;

    #[test]
    fn parse_percentage_accepts_percentage_format() -> Result<(), FixtureError> {
        let percent = parse_percentage("3%")?;

        assert_eq!(fraction(&percent), Decimal::new(3, 2));

        Ok(())
    }

    #[test]
    fn parse_percentage_accepts_decimal_format() -> Result<(), FixtureError> {
        let percent = parse_percentage("0.15")?;

        assert_eq!(fraction(&percent), Decimal::new(15, 2));

        Ok(())
    }

    #[test]
    fn parse_percentage_handles_whitespace() -> Result<(), FixtureError> {
        let percent = parse_percentage("  3 %  ")?;

        assert_eq!(fraction(&percent), Decimal::new(3, 2));

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_invalid_format() {
        let result = parse_percentage("three");

        assert!(matches!(result, Err(FixtureError::InvalidPercentage(_))));
    }

    #[test]
    fn promotion_fixture_uses_defaults() -> Result<(), FixtureError> {
        let fixture: PromotionsFixture = serde_norway::from_str("promotion:\n  percent_off: 3%\n")?;

        let rule = PromotionRule::try_from(fixture.promotion)?;

        assert_eq!(rule, PromotionRule::default());

        Ok(())
    }

    #[test]
    fn promotion_fixture_rejects_out_of_range_percentage() {
        let fixture = PromotionFixture {
            min_units: 4,
            full_price_units: 4,
            percent_off: "150%".to_string(),
        };

        assert!(matches!(
            PromotionRule::try_from(fixture),
            Err(FixtureError::Rule(PromotionRuleError::PercentOutOfRange(_)))
        ));
    }
}
