//! Coupon Fixtures

use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{
    coupons::{Coupon, CouponDiscount},
    fixtures::{FixtureError, products::parse_price},
};

/// Coupon Fixture
#[derive(Debug, Deserialize)]
pub struct CouponFixture {
    /// Display name
    pub name: String,

    /// Unique code
    pub code: String,

    /// Either a price ("5000 KRW") or a whole percentage ("10%")
    pub discount: String,
}

impl CouponFixture {
    /// Convert into a [`Coupon`], returning the currency of an amount discount.
    ///
    /// # Errors
    ///
    /// Returns an error if the discount is neither a valid price nor a whole percentage from 0
    /// to 100.
    pub fn into_coupon(self) -> Result<(Coupon, Option<&'static Currency>), FixtureError> {
        let (discount, currency) = parse_discount(&self.discount)?;

        Ok((Coupon::new(self.name, self.code, discount), currency))
    }
}

/// Parse a coupon discount: "10%" is a percentage, anything else is read as a price.
///
/// # Errors
///
/// Returns an error if the percentage is not a whole number or the price is invalid.
pub fn parse_discount(
    s: &str,
) -> Result<(CouponDiscount, Option<&'static Currency>), FixtureError> {
    let trimmed = s.trim();

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        let value = percent_str
            .trim()
            .parse::<u64>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        return Ok((CouponDiscount::percentage(value)?, None));
    }

    let (amount, currency) = parse_price(trimmed)?;

    Ok((CouponDiscount::Amount(amount), Some(currency)))
}
