//! Fixtures

use std::{fs, path::PathBuf};

use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::{Cart, CartError},
    catalog::{Catalog, CatalogError},
    fixtures::{
        carts::{CartFixture, CartLineFixture},
        products::ProductsFixture,
        promotions::PromotionsFixture,
    },
    pricing::{PricingEngine, PromotionRule, PromotionRuleError},
    products::Product,
};

pub mod carts;
pub mod products;
pub mod promotions;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// Catalog construction error
    #[error("Failed to build catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// Cart construction error
    #[error("Failed to build cart: {0}")]
    Cart(#[from] CartError),

    /// Promotion rule error
    #[error("Invalid promotion rule: {0}")]
    Rule(#[from] PromotionRuleError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Catalog, created with the currency of the first product loaded
    catalog: Option<Catalog<'a>>,

    /// Cart lines, resolved against the catalog when the cart is built
    cart_lines: Vec<CartLineFixture>,

    /// Promotion rule, if one was loaded
    rule: Option<PromotionRule>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: None,
            cart_lines: Vec::new(),
            rule: None,
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = fs::read_to_string(self.path("products", name))?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        for product_fixture in fixture.products {
            // Fixture prices are parsed against static ISO currencies.
            let product: Product<'static> = product_fixture.try_into()?;
            let currency = product.price.currency();

            let catalog = self.catalog.get_or_insert_with(|| Catalog::new(currency));

            if catalog.currency() != currency {
                return Err(FixtureError::CurrencyMismatch(
                    catalog.currency().iso_alpha_code.to_string(),
                    currency.iso_alpha_code.to_string(),
                ));
            }

            catalog.insert(product)?;
        }

        debug!(
            set = name,
            products = self.catalog.as_ref().map_or(0, Catalog::len),
            "loaded products"
        );

        Ok(self)
    }

    /// Load cart lines from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = fs::read_to_string(self.path("carts", name))?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        self.cart_lines.extend(fixture.items);

        Ok(self)
    }

    /// Load the promotion rule from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if the rule is invalid.
    pub fn load_promotion(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = fs::read_to_string(self.path("promotions", name))?;
        let fixture: PromotionsFixture = serde_norway::from_str(&contents)?;

        self.rule = Some(fixture.promotion.try_into()?);

        Ok(self)
    }

    /// Load a complete fixture set (products, cart, and promotion with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_products(name)?
            .load_cart(name)?
            .load_promotion(name)?;

        Ok(fixture)
    }

    /// Get the loaded catalog
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn catalog(&self) -> Result<&Catalog<'a>, FixtureError> {
        self.catalog.as_ref().ok_or(FixtureError::NoCurrency)
    }

    /// Build a cart from the loaded cart lines, in file order
    ///
    /// Repeated products accumulate onto a single line.
    ///
    /// # Errors
    ///
    /// Returns an error if no products are loaded, or a line references a
    /// product the catalog doesn't have.
    pub fn cart(&self) -> Result<Cart, FixtureError> {
        let catalog = self.catalog()?;
        let mut cart = Cart::new(catalog.currency());

        for line in &self.cart_lines {
            if line.quantity == 0 {
                continue;
            }

            let product = catalog.get(line.product)?;
            let existing = cart.quantity(product.id);

            cart.add(product)?;
            cart.update_quantity(product.id, existing.saturating_add(line.quantity))?;
        }

        Ok(cart)
    }

    /// The loaded promotion rule, or the storefront default
    pub fn rule(&self) -> PromotionRule {
        self.rule.unwrap_or_default()
    }

    /// A pricing engine for the loaded rule and currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn engine(&self) -> Result<PricingEngine, FixtureError> {
        Ok(PricingEngine::new(self.rule(), self.currency()?))
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.catalog().map(Catalog::currency)
    }

    fn path(&self, category: &str, name: &str) -> PathBuf {
        self.base_path.join(category).join(format!("{name}.yml"))
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use rusty_money::iso::{JPY, USD};
    use tempfile::TempDir;
    use testresult::TestResult;

    use crate::products::ProductId;

    use super::*;

    fn write_fixture(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    #[test]
    fn fixture_loads_products_cart_and_promotion() -> TestResult {
        let mut fixture = Fixture::new();

        fixture
            .load_products("stickers")?
            .load_cart("stickers")?
            .load_promotion("stickers")?;

        let catalog = fixture.catalog()?;

        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.get(ProductId(4))?.name, "Totem of Undying");
        assert_eq!(catalog.get(ProductId(4))?.price.to_minor_units(), 37_500);
        assert_eq!(fixture.currency()?, USD);
        assert_eq!(fixture.rule(), PromotionRule::default());

        Ok(())
    }

    #[test]
    fn fixture_from_set_builds_cart_in_file_order() -> TestResult {
        let fixture = Fixture::from_set("stickers")?;
        let cart = fixture.cart()?;

        let ids: Vec<ProductId> = cart.iter().map(|line| line.product).collect();

        assert_eq!(ids, vec![ProductId(1), ProductId(2), ProductId(3)]);
        assert_eq!(cart.total_units(), 5);

        Ok(())
    }

    #[test]
    fn fixture_no_currency_returns_error() {
        let fixture = Fixture::new();

        assert!(matches!(fixture.currency(), Err(FixtureError::NoCurrency)));
        assert!(matches!(fixture.cart(), Err(FixtureError::NoCurrency)));
    }

    #[test]
    fn fixture_rule_defaults_when_not_loaded() {
        let fixture = Fixture::new();

        assert_eq!(fixture.rule(), PromotionRule::default());
    }

    #[test]
    fn fixture_load_products_rejects_currency_mismatch() -> TestResult {
        let dir = TempDir::new()?;

        write_fixture(
            dir.path(),
            "products",
            "usd_set",
            "products:\n  - id: 1\n    name: Tulip\n    category: Flowers\n    price: 1.00 USD\n",
        )?;

        write_fixture(
            dir.path(),
            "products",
            "gbp_set",
            "products:\n  - id: 2\n    name: Daisy\n    category: Flowers\n    price: 1.00 GBP\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_products("usd_set")?;

        let result = fixture.load_products("gbp_set");

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, _))));

        Ok(())
    }

    #[test]
    fn fixture_load_products_builds_catalog_in_file_currency() -> TestResult {
        let dir = TempDir::new()?;

        write_fixture(
            dir.path(),
            "products",
            "yen",
            "products:\n  - id: 1\n    name: Tulip\n    category: Flowers\n    price: 1000 JPY\n  - id: 2\n    name: Daisy\n    category: Flowers\n    price: 150 JPY\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_products("yen")?;

        let catalog = fixture.catalog()?;

        assert_eq!(catalog.len(), 2);
        assert_eq!(fixture.currency()?, JPY);
        assert_eq!(catalog.get(ProductId(1))?.price.to_minor_units(), 1_000);
        assert_eq!(fixture.engine()?.compute(&[], false, false).final_total.currency(), JPY);

        Ok(())
    }

    #[test]
    fn fixture_cart_rejects_unknown_product() -> TestResult {
        let dir = TempDir::new()?;

        write_fixture(
            dir.path(),
            "products",
            "small",
            "products:\n  - id: 1\n    name: Tulip\n    category: Flowers\n    price: 1.00 USD\n",
        )?;

        write_fixture(dir.path(), "carts", "small", "items:\n  - product: 9\n")?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_products("small")?.load_cart("small")?;

        assert!(matches!(
            fixture.cart(),
            Err(FixtureError::Catalog(CatalogError::ProductNotFound(
                ProductId(9)
            )))
        ));

        Ok(())
    }

    #[test]
    fn fixture_cart_merges_repeated_products() -> TestResult {
        let dir = TempDir::new()?;

        write_fixture(
            dir.path(),
            "products",
            "repeat",
            "products:\n  - id: 1\n    name: Tulip\n    category: Flowers\n    price: 1.00 USD\n",
        )?;

        write_fixture(
            dir.path(),
            "carts",
            "repeat",
            "items:\n  - product: 1\n    quantity: 2\n  - product: 1\n    quantity: 3\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_products("repeat")?.load_cart("repeat")?;

        let cart = fixture.cart()?;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity(ProductId(1)), 5);

        Ok(())
    }

    #[test]
    fn fixture_default_matches_new() {
        let fixture = Fixture::default();

        assert_eq!(fixture.base_path, PathBuf::from("./fixtures"));
        assert!(fixture.catalog.is_none());
        assert!(fixture.cart_lines.is_empty());
    }
}
