//! Receipt
//!
//! Plain-text tables for the product listing, the cart and completed orders. Rendering only;
//! every number comes from the pricing functions.

use std::io;

use rusty_money::{Money, MoneyError, iso::Currency};
use tabled::{
    Table,
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    coupons::{Coupon, CouponDiscount},
    discounts::{DiscountError, line_discount_percent, line_total},
    pricing::{CartTotals, PricingError},
    products::Product,
    session::{OrderReceipt, Session},
    stock::remaining_stock,
};

/// Errors that can occur when writing a table.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Totalling the cart failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// A line total could not be computed.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Writing to the output failed.
    #[error("Failed to write receipt: {0}")]
    Io(#[from] io::Error),
}

/// Write the product listing with remaining stock for the session's cart.
///
/// # Errors
///
/// Returns [`ReceiptError::Io`] if writing fails.
pub fn write_products(
    mut out: impl io::Write,
    session: &Session,
    products: &[&Product],
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["Id", "Name", "Price", "Remaining", "Tiers", ""]);

    for product in products {
        let remaining = remaining_stock(session.cart(), product);

        let tiers = product
            .discounts
            .iter()
            .map(|tier| format!("{}+ -{}%", tier.quantity(), (tier.rate() * 100.0).round()))
            .collect::<Vec<_>>()
            .join(", ");

        let status = match (remaining, product.is_recommended) {
            (0, _) => "SOLD OUT",
            (1..=5, _) => "Low stock",
            (_, Some(true)) => "Recommended",
            _ => "",
        };

        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            money(product.price, session.currency()).to_string(),
            remaining.to_string(),
            tiers,
            status.to_string(),
        ]);
    }

    writeln!(out, "{}", render(builder, 2..4))?;

    Ok(())
}

/// Write the cart lines followed by the checkout summary.
///
/// # Errors
///
/// Returns an error if totalling fails or writing fails.
pub fn write_cart(mut out: impl io::Write, session: &Session) -> Result<(), ReceiptError> {
    if session.cart().is_empty() {
        writeln!(out, "Cart is empty")?;
        return Ok(());
    }

    let currency = session.currency();
    let mut builder = Builder::default();

    builder.push_record(["Item", "Qty", "Unit Price", "Line Total", "Discount"]);

    for line in session.cart() {
        let percent = line_discount_percent(line)?;

        builder.push_record([
            line.product().name.clone(),
            line.quantity().to_string(),
            money(line.product().price, currency).to_string(),
            line_total(line, currency)?.to_string(),
            if percent > 0 {
                format!("-{percent}%")
            } else {
                String::new()
            },
        ]);
    }

    writeln!(out, "{}", render(builder, 1..5))?;

    if let Some(coupon) = session.selected_coupon() {
        writeln!(out, " Coupon:    {}", describe_coupon(coupon, currency))?;
    }

    write_summary(&mut out, &session.totals()?)
}

/// Write the coupon catalog, marking the selected coupon.
///
/// # Errors
///
/// Returns [`ReceiptError::Io`] if writing fails.
pub fn write_coupons(mut out: impl io::Write, session: &Session) -> Result<(), ReceiptError> {
    let selected = session.selected_coupon().map(Coupon::code);
    let mut builder = Builder::default();

    builder.push_record(["", "Code", "Name", "Discount"]);

    for coupon in session.coupons() {
        builder.push_record([
            if Some(coupon.code()) == selected {
                "*".to_string()
            } else {
                String::new()
            },
            coupon.code().to_string(),
            coupon.name().to_string(),
            describe_coupon(coupon, session.currency()),
        ]);
    }

    writeln!(out, "{}", render(builder, 3..4))?;

    Ok(())
}

/// Write the confirmation for a completed order.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_order(
    mut out: impl io::Write,
    receipt: &OrderReceipt<'_>,
) -> Result<(), ReceiptError> {
    writeln!(out, "Order {} placed at {}", receipt.number, receipt.placed_at)?;
    writeln!(out, " Items:     {}", receipt.item_count)?;

    if let Some(code) = &receipt.coupon {
        writeln!(out, " Coupon:    {code}")?;
    }

    write_summary(&mut out, &receipt.totals)
}

/// Human-readable discount, e.g. `₩5,000 off` or `10% off`.
pub fn describe_coupon(coupon: &Coupon, currency: &Currency) -> String {
    match coupon.discount() {
        CouponDiscount::Amount(value) => format!("{} off", money(value, currency)),
        CouponDiscount::Percentage(percent) => format!("{percent}% off"),
    }
}

fn write_summary(out: &mut impl io::Write, totals: &CartTotals<'_>) -> Result<(), ReceiptError> {
    let savings = totals.savings()?;

    writeln!(out, " Subtotal:  {}", totals.total_before_discount())?;

    if savings.to_minor_units() > 0 {
        writeln!(out, " Savings:   -{savings}")?;
    }

    writeln!(out, " \x1b[1mTotal:     {}\x1b[0m", totals.total_after_discount())?;

    Ok(())
}

fn money(minor: u64, currency: &Currency) -> Money<'_, Currency> {
    Money::from_minor(i64::try_from(minor).unwrap_or(i64::MAX), currency)
}

fn render(builder: Builder, numeric: std::ops::Range<usize>) -> Table {
    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Alignment::left());
    table.modify(Columns::new(numeric), Alignment::right());

    table
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::KRW;
    use testresult::TestResult;

    use crate::{
        coupons::CouponCode,
        products::{ProductId, TierDiscount},
    };

    use super::*;

    fn session() -> TestResult<Session> {
        Ok(Session::new(
            vec![
                Product::new("p1", "Widget", 10_000, 20)
                    .with_discounts([TierDiscount::new(10, 0.1)?]),
                Product::new("p2", "Gadget", 20_000, 0),
            ],
            vec![Coupon::new(
                "5000 off",
                "AMOUNT5000",
                CouponDiscount::Amount(5_000),
            )],
            KRW,
        ))
    }

    #[test]
    fn write_cart_empty() -> TestResult {
        let mut out = Vec::new();

        write_cart(&mut out, &session()?)?;

        assert_eq!(String::from_utf8(out)?, "Cart is empty\n");

        Ok(())
    }

    #[test]
    fn write_cart_lists_lines_and_coupon() -> TestResult {
        let id = ProductId::from("p1");
        let session = session()?
            .add_to_cart(&id)?
            .update_quantity(&id, 10)?
            .apply_coupon(&CouponCode::from("AMOUNT5000"))?;

        let mut out = Vec::new();
        write_cart(&mut out, &session)?;
        let text = String::from_utf8(out)?;

        assert!(text.contains("Widget"));
        assert!(text.contains("-10%"));
        assert!(text.contains("Coupon:"));
        assert!(text.contains("Total:"));

        Ok(())
    }

    #[test]
    fn write_products_marks_sold_out() -> TestResult {
        let session = session()?;
        let products: Vec<&Product> = session.products().iter().collect();

        let mut out = Vec::new();
        write_products(&mut out, &session, &products)?;

        assert!(String::from_utf8(out)?.contains("SOLD OUT"));

        Ok(())
    }

    #[test]
    fn write_coupons_marks_selection() -> TestResult {
        let session = session()?.apply_coupon(&CouponCode::from("AMOUNT5000"))?;

        let mut out = Vec::new();
        write_coupons(&mut out, &session)?;
        let text = String::from_utf8(out)?;

        assert!(text.contains("AMOUNT5000"));
        assert!(text.contains('*'));

        Ok(())
    }

    #[test]
    fn describe_percentage_coupon() {
        let coupon = Coupon::new("10% off", "PERCENT10", CouponDiscount::Percentage(10));

        assert_eq!(describe_coupon(&coupon, KRW), "10% off");
    }
}
