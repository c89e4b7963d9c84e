//! Pricing
//!
//! Totals are recomputed from the cart and the selected coupon on every read. Nothing here is
//! cached, so a total can never be stale with respect to the cart it was computed from.

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    cart::Cart,
    coupons::{Coupon, CouponError, apply_coupon},
    discounts::{DiscountError, gross_minor, line_total},
};

/// Errors that can occur while totalling a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Per-line discount calculation failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// The selected coupon failed for a reason other than the minimum order.
    #[error(transparent)]
    Coupon(#[from] CouponError),
}

/// Totals for a cart and its selected coupon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals<'a> {
    total_before_discount: Money<'a, Currency>,
    subtotal_after_item_discounts: Money<'a, Currency>,
    total_after_discount: Money<'a, Currency>,
}

impl<'a> CartTotals<'a> {
    /// Sum of `price * quantity` over all lines, before any discount.
    pub fn total_before_discount(&self) -> Money<'a, Currency> {
        self.total_before_discount
    }

    /// Sum of line totals after volume tiers, before the coupon.
    pub fn subtotal_after_item_discounts(&self) -> Money<'a, Currency> {
        self.subtotal_after_item_discounts
    }

    /// Amount payable.
    pub fn total_after_discount(&self) -> Money<'a, Currency> {
        self.total_after_discount
    }

    /// Combined tier and coupon savings.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.total_before_discount.sub(self.total_after_discount)
    }
}

/// Total the cart, then apply the selected coupon to the post-tier subtotal.
///
/// A percentage coupon whose minimum is no longer met leaves the subtotal as is; eligibility is
/// enforced when the coupon is selected, not on every read.
///
/// # Errors
///
/// Returns a [`PricingError`] if a line total overflows, money arithmetic fails, or the coupon
/// fails for any reason other than [`CouponError::Ineligible`].
pub fn calculate_total<'a>(
    cart: &Cart,
    coupon: Option<&Coupon>,
    currency: &'a Currency,
) -> Result<CartTotals<'a>, PricingError> {
    let zero = Money::from_minor(0, currency);

    let (total_before_discount, subtotal_after_item_discounts) =
        cart.iter().try_fold((zero, zero), |(before, after), line| {
            let gross = Money::from_minor(gross_minor(line)?, currency);
            let discounted = line_total(line, currency)?;

            Ok::<_, PricingError>((before.add(gross)?, after.add(discounted)?))
        })?;

    let total_after_discount = match coupon {
        Some(coupon) => settle_coupon(
            subtotal_after_item_discounts,
            apply_coupon(subtotal_after_item_discounts, coupon),
        )?,
        None => subtotal_after_item_discounts,
    };

    Ok(CartTotals {
        total_before_discount,
        subtotal_after_item_discounts,
        total_after_discount,
    })
}

/// An ineligible coupon contributes nothing; any other coupon failure is an error.
fn settle_coupon<'a>(
    subtotal: Money<'a, Currency>,
    outcome: Result<Money<'a, Currency>, CouponError>,
) -> Result<Money<'a, Currency>, PricingError> {
    match outcome {
        Ok(total) => Ok(total),
        Err(CouponError::Ineligible { .. }) => Ok(subtotal),
        Err(error) => Err(error.into()),
    }
}
