//! Receipt
//!
//! Terminal rendering of a [`PricingResult`]. Amounts are only formatted for
//! display here; everything upstream works in exact minor units.

use std::{fmt::Write, io};

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::{SmallVec, smallvec};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    discounts::fraction,
    pricing::{DiscountOutcome, PricingResult, PromotionRule},
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Priced order ready for display.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    pricing: PricingResult<'a>,
    promo_eligible: bool,
    promo_applied: bool,
    rule: PromotionRule,
}

impl<'a> Receipt<'a> {
    /// Create a receipt from a pricing result and the promotion state it was computed with.
    #[must_use]
    pub fn new(
        pricing: PricingResult<'a>,
        promo_eligible: bool,
        promo_applied: bool,
        rule: PromotionRule,
    ) -> Self {
        Self {
            pricing,
            promo_eligible,
            promo_applied,
            rule,
        }
    }

    /// The pricing result being displayed
    #[must_use]
    pub fn pricing(&self) -> &PricingResult<'a> {
        &self.pricing
    }

    /// Total cost before the promotion
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.pricing.subtotal
    }

    /// Amount due
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.pricing.final_total
    }

    /// Currency used for all monetary values.
    #[must_use]
    pub fn currency(&self) -> &'a Currency {
        self.pricing.final_total.currency()
    }

    /// Calculate the savings made by applying the promotion.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.pricing.subtotal.sub(self.pricing.final_total)
    }

    /// Calculates the savings as a percentage of the subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings_percent(&self) -> Result<Percentage, MoneyError> {
        let savings_minor = self.savings()?.to_minor_units();
        let subtotal_minor = self.subtotal().to_minor_units();

        if subtotal_minor == 0 {
            return Ok(Percentage::from(Decimal::ZERO));
        }

        let savings_dec = Decimal::from_i64(savings_minor).unwrap_or(Decimal::ZERO);
        let subtotal_dec = Decimal::from_i64(subtotal_minor).unwrap_or(Decimal::ZERO);

        Ok(Percentage::from(savings_dec / subtotal_dec))
    }

    /// Writes the receipt table and summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        push_receipt_header(&mut builder);

        let mut color_ops: SmallVec<[(usize, usize, Color); 32]> = smallvec![];

        for (idx, outcome) in self.pricing.breakdown.iter().enumerate() {
            append_outcome_row(&mut builder, &mut color_ops, idx, outcome)?;
        }

        write_receipt_table(&mut out, builder, self.pricing.breakdown.len(), color_ops)?;
        write_receipt_summary(&mut out, self)?;

        Ok(())
    }
}

fn push_receipt_header(builder: &mut Builder) {
    builder.push_record([
        "",
        "Item",
        "Qty",
        "Unit Price",
        "Base Price",
        "Final Price",
        "Savings",
    ]);
}

fn append_outcome_row(
    builder: &mut Builder,
    color_ops: &mut SmallVec<[(usize, usize, Color); 32]>,
    idx: usize,
    outcome: &DiscountOutcome<'_>,
) -> Result<(), ReceiptError> {
    let row = idx + 1; // header is row 0

    let (final_price, savings) = match &outcome.detail {
        Some(detail) => (
            format!("{}", outcome.total_price),
            format!(
                "-{} ({} × {})",
                outcome.savings()?,
                detail.discounted_count,
                detail.discounted_unit_price
            ),
        ),
        None => (String::new(), String::new()),
    };

    builder.push_record([
        format!("#{:<3}", idx + 1),
        outcome.name.clone(),
        outcome.quantity.to_string(),
        format!("{}", outcome.unit_price),
        format!("{}", outcome.base_total()),
        final_price,
        savings,
    ]);

    color_ops.push((row, 3, color_dark_grey()));

    if outcome.discounted {
        color_ops.push((row, 5, Color::FG_GREEN));
    }

    Ok(())
}

fn write_receipt_table(
    out: &mut impl io::Write,
    builder: Builder,
    rows: usize,
    color_ops: SmallVec<[(usize, usize, Color); 32]>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    for row in 2..=rows {
        theme.insert_horizontal_line(row, separator);
    }

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..7), Alignment::right());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    receipt: &Receipt<'_>,
) -> Result<(), ReceiptError> {
    let pricing = receipt.pricing();

    let mut lines: SmallVec<[(String, String); 5]> = smallvec![(
        " Subtotal:".to_string(),
        format!("{}  ", pricing.subtotal)
    )];

    if let Some(unit) = &pricing.discounted_unit {
        lines.push((
            " Promo Discount:".to_string(),
            format!("-{}  ", pricing.discount),
        ));

        lines.push((
            " Discounted:".to_string(),
            format!(
                "{} {} → {}  ",
                unit.name, unit.original_price, unit.discounted_price
            ),
        ));
    }

    lines.push((
        " \x1b[1mTotal:\x1b[0m".to_string(),
        format!("\x1b[1m{}  \x1b[0m", pricing.final_total),
    ));

    if receipt.savings()?.to_minor_units() > 0 {
        let savings_percent_points =
            percent_points_from_fractional_percentage(receipt.savings_percent()?);

        lines.push((
            " Savings:".to_string(),
            format!("({savings_percent_points:.2}%) {}  ", receipt.savings()?),
        ));
    }

    let label_width = lines
        .iter()
        .map(|(label, _)| visible_width(label))
        .max()
        .unwrap_or(0);

    let value_width = lines
        .iter()
        .map(|(_, value)| visible_width(value))
        .max()
        .unwrap_or(0);

    for (label, value) in &lines {
        write_summary_line(out, label, value, label_width, value_width)?;
    }

    if let Some(hint) = promo_hint(receipt) {
        writeln!(out, "\n {hint}").map_err(|_err| ReceiptError::IO)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

/// Explains the promotion state when it didn't take effect.
fn promo_hint(receipt: &Receipt<'_>) -> Option<String> {
    let rule = &receipt.rule;
    let percent_points = percent_points_from_fractional_percentage(rule.percent_off()).normalize();
    let position = rule.full_price_units() + 1;

    match (receipt.promo_eligible, receipt.promo_applied) {
        (true, false) => Some(format!(
            "Promo available: {percent_points}% off sticker #{position}, sorted by price"
        )),
        (true, true) if !receipt.pricing.is_discounted() => Some(format!(
            "Promo applied: add sticker #{position} to get {percent_points}% off it"
        )),
        _ => None,
    }
}

/// Converts a fractional percentage to percent points for display.
fn percent_points_from_fractional_percentage(percentage: Percentage) -> Decimal {
    // `Percentage` is a fraction (e.g. 0.25), so multiply by 100 to print percent points.
    (fraction(&percentage) * Decimal::ONE_HUNDRED).round_dp(2)
}

/// Wraps runs of UTF-8 box-drawing characters in ANSI dark-grey escape codes.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}
