//! Luxe
//!
//! Luxe is the pricing and checkout engine behind a sticker storefront: a
//! product catalog, a cart, and a checkout session that prices the cart with a
//! single quantity promotion.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod discounts;
pub mod fixtures;
pub mod items;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod utils;
