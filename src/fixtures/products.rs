//! Product Fixtures

use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    products::{Product, ProductId},
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Products, in display order
    pub products: Vec<ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product id
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Product category
    pub category: String,

    /// Product price (e.g., "2.50 USD")
    pub price: String,

    /// Image reference
    #[serde(default)]
    pub image: String,

    /// Product description
    #[serde(default)]
    pub description: String,
}

impl TryFrom<ProductFixture> for Product<'_> {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        Ok(Product {
            id: fixture.id,
            name: fixture.name,
            category: fixture.category,
            price: Money::from_minor(minor_units, currency),
            image: fixture.image,
            description: fixture.description,
        })
    }
}

/// Parse price string (e.g., "2.50 USD") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal or has more decimal places
/// than the currency, or if the currency code is not an ISO code.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = iso::find(currency_code)
        .ok_or_else(|| FixtureError::UnknownCurrency((*currency_code).to_string()))?;

    // Scaled by the currency's own exponent; sub-minor amounts are rejected.
    let minor_units = Money::from_decimal(amount, currency)
        .try_to_minor_units()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99USD");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_accepts_whole_and_fractional_amounts() -> Result<(), FixtureError> {
        let (whole, usd) = parse_price("250 USD")?;
        let (fractional, eur) = parse_price("2.50 EUR")?;

        assert_eq!(whole, 25_000);
        assert_eq!(usd, iso::USD);
        assert_eq!(fractional, 250);
        assert_eq!(eur, iso::EUR);

        Ok(())
    }

    #[test]
    fn parse_price_scales_by_currency_exponent() -> Result<(), FixtureError> {
        let (yen, jpy) = parse_price("1000 JPY")?;

        assert_eq!(yen, 1_000);
        assert_eq!(jpy, iso::JPY);

        Ok(())
    }

    #[test]
    fn parse_price_rejects_sub_minor_amounts() {
        let result = parse_price("2.505 USD");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn product_fixture_defaults_optional_fields() -> Result<(), FixtureError> {
        let yaml = r"
id: 4
name: Totem of Undying
category: Minecraft
price: 375.00 USD
";
        let fixture: ProductFixture = serde_norway::from_str(yaml)?;
        let product = Product::try_from(fixture)?;

        assert_eq!(product.id, ProductId(4));
        assert_eq!(product.price.to_minor_units(), 37_500);
        assert!(product.image.is_empty());

        Ok(())
    }
}
