//! Sticker Checkout Example
//!
//! Loads a fixture set, lists the filtered catalog and prints the checkout
//! receipt for the fixture cart.
//!
//! Use `-f` to load a fixture set by name
//! Use `-a` to switch the promotion on
//! Use `-p` to run the simulated payment
//! Use `-c` and `-r` to filter the catalog listing by category and price range
//!
//! Set `RUST_LOG=luxe=debug` to trace the pricing engine.

use std::{
    io::{self, Write},
    time::Instant,
};

use anyhow::Result;
use clap::Parser;
use humanize_duration::{Truncate, prelude::DurationExt};
use tracing_subscriber::EnvFilter;

use luxe::{checkout::CheckoutSession, fixtures::Fixture, receipt::Receipt, utils::DemoArgs};

/// Sticker Checkout Example
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = DemoArgs::parse();

    let fixture = Fixture::from_set(&args.fixture)?;
    let catalog = fixture.catalog()?;
    let mut cart = fixture.cart()?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle, "LUXE LABELS")?;
    writeln!(handle, "Categories: {}", catalog.categories().join(", "))?;
    writeln!(handle)?;

    for product in catalog.filter(&args.catalog_filter()) {
        writeln!(
            handle,
            " {:>4}  {:<20} {:<12} {}",
            product.id.to_string(),
            product.name,
            product.category,
            product.price
        )?;
    }

    let mut session = CheckoutSession::new(fixture.engine()?);

    session.open();
    session.set_promo(args.apply_promo);

    let start = Instant::now();

    let items = cart.line_items(catalog)?;
    let eligible = session.is_promo_eligible(&items);
    let pricing = session.pricing(&items).clone();

    let elapsed = start.elapsed();

    writeln!(handle)?;

    Receipt::new(pricing, eligible, session.promo_applied(), fixture.rule())
        .write_to(&mut handle)?;

    writeln!(
        handle,
        " {} ({}s)",
        elapsed.human(Truncate::Nano),
        elapsed.as_secs_f32()
    )?;

    if args.pay {
        session.proceed_to_payment(&cart)?;
        session.submit_payment()?;
        session.complete_payment()?;

        let cleared = session.close(&mut cart);

        writeln!(
            handle,
            "\nPayment {}; cart cleared: {cleared}",
            session.step()
        )?;
    }

    Ok(())
}
