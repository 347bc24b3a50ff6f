//! Luxe prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine},
    catalog::{Catalog, CatalogError, CatalogFilter, CategoryFilter, PriceRange, PriceRangeError},
    checkout::{CheckoutAction, CheckoutError, CheckoutSession, CheckoutStep},
    discounts::DiscountError,
    fixtures::{Fixture, FixtureError},
    items::{CartUnit, LineItem},
    pricing::{
        DiscountOutcome, DiscountedUnit, PricingEngine, PricingResult, PromotionRule,
        PromotionRuleError, compute_pricing, is_promo_eligible,
    },
    products::{Product, ProductId, ProductKey},
    receipt::{Receipt, ReceiptError},
};
