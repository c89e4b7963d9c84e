//! Discounts
//!
//! Volume tier resolution for a single cart line. The best qualifying tier wins and its rate is
//! applied flat to the whole line; tiers are never blended or stacked.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{cart::CartLineItem, products::TierDiscount};

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Amount could not be represented in minor units.
    #[error("discounted amount overflowed or was not finite")]
    Overflow,
}

/// Resolve the rate for `quantity` from a tier table.
///
/// Among tiers whose threshold is at most `quantity`, the one with the largest threshold wins.
/// Returns 0% when no tier qualifies.
pub fn resolve_rate(discounts: &[TierDiscount], quantity: u32) -> Percentage {
    discounts
        .iter()
        .filter(|tier| tier.quantity() <= quantity)
        .max_by_key(|tier| tier.quantity())
        .map_or_else(|| Percentage::from(0.0), |tier| Percentage::from(tier.rate()))
}

/// Undiscounted price of a line (`price * quantity`) in minor units.
///
/// # Errors
///
/// Returns [`DiscountError::Overflow`] if the product does not fit in an `i64`.
pub fn gross_minor(item: &CartLineItem) -> Result<i64, DiscountError> {
    i64::try_from(item.product().price)
        .ok()
        .and_then(|price| price.checked_mul(i64::from(item.quantity())))
        .ok_or(DiscountError::Overflow)
}

/// Price of a line after its volume tier, rounded half away from zero to whole minor units.
///
/// # Errors
///
/// Returns [`DiscountError::Overflow`] if the line total cannot be represented in minor units.
pub fn line_total<'a>(
    item: &CartLineItem,
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, DiscountError> {
    let gross = gross_minor(item)?;
    let rate = resolve_rate(&item.product().discounts, item.quantity());

    let minor = scale_minor(gross, Decimal::ONE - rate * Decimal::ONE)?;

    Ok(Money::from_minor(minor, currency))
}

/// Whole-percent discount shown next to a line, e.g. `10` for a 10% tier.
///
/// Derived from the rounded line total, so it reflects what the customer actually saves. Lines
/// without a discount (or with a zero price) report 0.
///
/// # Errors
///
/// Returns [`DiscountError::Overflow`] if the line total cannot be represented in minor units.
pub fn line_discount_percent(item: &CartLineItem) -> Result<u32, DiscountError> {
    let gross = gross_minor(item)?;

    if gross == 0 {
        return Ok(0);
    }

    let rate = resolve_rate(&item.product().discounts, item.quantity());
    let total = scale_minor(gross, Decimal::ONE - rate * Decimal::ONE)?;

    let saved = Decimal::from(gross - total)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(Decimal::from(gross)))
        .ok_or(DiscountError::Overflow)?;

    saved
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .ok_or(DiscountError::Overflow)
}

/// Multiply a minor unit amount by `factor`, rounding half away from zero.
fn scale_minor(minor: i64, factor: Decimal) -> Result<i64, DiscountError> {
    Decimal::from(minor)
        .checked_mul(factor)
        .ok_or(DiscountError::Overflow)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::Overflow)
}
