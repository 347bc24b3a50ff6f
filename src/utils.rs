//! Utils

use clap::Parser;

use crate::catalog::{CatalogFilter, CategoryFilter, PriceRange};

/// Arguments for the checkout demo
#[derive(Debug, Parser)]
pub struct DemoArgs {
    /// Fixture set to use for the catalog, cart & promotion
    #[clap(short, long, default_value = "stickers")]
    pub fixture: String,

    /// Switch the promotion on before printing the receipt
    #[clap(short, long)]
    pub apply_promo: bool,

    /// Run the simulated payment and clear the cart
    #[clap(short, long)]
    pub pay: bool,

    /// Category to list from the catalog
    #[clap(short, long, default_value = "All")]
    pub category: String,

    /// Price range to list from the catalog (e.g. `200-400`, `1000-`)
    #[clap(short = 'r', long, default_value = "All")]
    pub price: PriceRange,
}

impl DemoArgs {
    /// Catalog filter built from the category and price arguments.
    pub fn catalog_filter(&self) -> CatalogFilter {
        CatalogFilter {
            category: CategoryFilter::named(self.category.as_str()),
            price: self.price,
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn defaults_list_everything_without_promo() -> TestResult {
        let args = DemoArgs::try_parse_from(["checkout"])?;

        assert_eq!(args.fixture, "stickers");
        assert!(!args.apply_promo);
        assert!(!args.pay);
        assert_eq!(args.catalog_filter(), CatalogFilter::default());

        Ok(())
    }

    #[test]
    fn parses_filters_and_flags() -> TestResult {
        let args = DemoArgs::try_parse_from([
            "checkout",
            "--apply-promo",
            "--category",
            "Minecraft",
            "--price",
            "200-400",
        ])?;

        assert!(args.apply_promo);
        assert_eq!(
            args.catalog_filter(),
            CatalogFilter {
                category: CategoryFilter::Named("Minecraft".to_string()),
                price: PriceRange::Between {
                    min: 200,
                    max: Some(400)
                },
            }
        );

        Ok(())
    }

    #[test]
    fn rejects_invalid_price_range() {
        assert!(DemoArgs::try_parse_from(["checkout", "--price", "cheap"]).is_err());
    }
}
