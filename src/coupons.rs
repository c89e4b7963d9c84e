//! Coupons
//!
//! A coupon takes either a flat amount or a whole percentage off the cart total after volume
//! tiers. Percentage coupons need a minimum order of [`PERCENTAGE_MINIMUM_ORDER`] minor units.

use std::fmt;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest post-tier total, in minor units, that a percentage coupon applies to.
pub const PERCENTAGE_MINIMUM_ORDER: i64 = 10_000;

/// Errors related to coupons and the coupon catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponError {
    /// The order total is below the percentage coupon minimum.
    #[error("percentage coupons need an order of at least {minimum}, order is {total}")]
    Ineligible {
        /// Required total in minor units
        minimum: i64,
        /// Actual total in minor units
        total: i64,
    },

    /// Another coupon already uses this code.
    #[error("coupon code {0} already exists")]
    DuplicateCode(CouponCode),

    /// No coupon with this code is in the catalog.
    #[error("coupon {0} not found")]
    NotFound(CouponCode),

    /// Percentage discounts are whole percents from 0 to 100.
    #[error("percentage discount must be between 0 and 100, got {0}")]
    InvalidPercentage(u64),

    /// Amount arithmetic overflowed.
    #[error("coupon arithmetic overflowed")]
    Overflow,
}

/// Coupon code; unique within a coupon catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouponCode(String);

impl CouponCode {
    /// Create a coupon code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Borrow the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CouponCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for CouponCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a coupon takes off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponDiscount {
    /// Subtract a fixed number of minor units, never going below zero.
    Amount(u64),

    /// Take a whole percentage (0 to 100) off, rounding the result down.
    Percentage(u8),
}

impl CouponDiscount {
    /// Build a percentage discount.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::InvalidPercentage`] if `value` is above 100.
    pub fn percentage(value: u64) -> Result<Self, CouponError> {
        u8::try_from(value)
            .ok()
            .filter(|percent| *percent <= 100)
            .map(Self::Percentage)
            .ok_or(CouponError::InvalidPercentage(value))
    }
}

/// Coupon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CouponRecord", into = "CouponRecord")]
pub struct Coupon {
    name: String,
    code: CouponCode,
    discount: CouponDiscount,
}

impl Coupon {
    /// Create a coupon.
    pub fn new(
        name: impl Into<String>,
        code: impl Into<CouponCode>,
        discount: CouponDiscount,
    ) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            discount,
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unique code
    pub fn code(&self) -> &CouponCode {
        &self.code
    }

    /// Discount
    pub fn discount(&self) -> CouponDiscount {
        self.discount
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum DiscountType {
    Amount,
    Percentage,
}

/// Persisted coupon shape: a string tag plus a bare value.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CouponRecord {
    name: String,
    code: CouponCode,
    discount_type: DiscountType,
    discount_value: u64,
}

impl TryFrom<CouponRecord> for Coupon {
    type Error = CouponError;

    fn try_from(record: CouponRecord) -> Result<Self, Self::Error> {
        let discount = match record.discount_type {
            DiscountType::Amount => CouponDiscount::Amount(record.discount_value),
            DiscountType::Percentage => CouponDiscount::percentage(record.discount_value)?,
        };

        Ok(Self::new(record.name, record.code, discount))
    }
}

impl From<Coupon> for CouponRecord {
    fn from(coupon: Coupon) -> Self {
        let (discount_type, discount_value) = match coupon.discount {
            CouponDiscount::Amount(value) => (DiscountType::Amount, value),
            CouponDiscount::Percentage(value) => (DiscountType::Percentage, u64::from(value)),
        };

        Self {
            name: coupon.name,
            code: coupon.code,
            discount_type,
            discount_value,
        }
    }
}

/// Apply `coupon` to a total that already includes volume tier discounts.
///
/// # Errors
///
/// - [`CouponError::Ineligible`]: a percentage coupon on a total below
///   [`PERCENTAGE_MINIMUM_ORDER`]. The total is unchanged and the coupon must not be selected.
/// - [`CouponError::Overflow`]: the amount does not fit in minor units.
pub fn apply_coupon<'a>(
    total: Money<'a, Currency>,
    coupon: &Coupon,
) -> Result<Money<'a, Currency>, CouponError> {
    let minor = total.to_minor_units();

    let discounted = match coupon.discount {
        CouponDiscount::Amount(value) => {
            let value = i64::try_from(value).unwrap_or(i64::MAX);

            minor.saturating_sub(value).max(0)
        }
        CouponDiscount::Percentage(percent) => {
            if minor < PERCENTAGE_MINIMUM_ORDER {
                return Err(CouponError::Ineligible {
                    minimum: PERCENTAGE_MINIMUM_ORDER,
                    total: minor,
                });
            }

            Decimal::from(minor)
                .checked_mul(Decimal::from(100 - percent.min(100)))
                .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
                .and_then(|scaled| scaled.floor().to_i64())
                .ok_or(CouponError::Overflow)?
                .max(0)
        }
    };

    Ok(Money::from_minor(discounted, total.currency()))
}

/// Find a coupon by code.
pub fn find_coupon<'c>(coupons: &'c [Coupon], code: &CouponCode) -> Option<&'c Coupon> {
    coupons.iter().find(|coupon| &coupon.code == code)
}

/// Append a coupon to the catalog.
///
/// # Errors
///
/// Returns [`CouponError::DuplicateCode`] if the code is already taken.
pub fn add_coupon(coupons: &[Coupon], coupon: Coupon) -> Result<Vec<Coupon>, CouponError> {
    if find_coupon(coupons, &coupon.code).is_some() {
        return Err(CouponError::DuplicateCode(coupon.code));
    }

    let mut next = coupons.to_vec();
    next.push(coupon);

    Ok(next)
}

/// Remove a coupon from the catalog. Absent codes leave the catalog unchanged.
pub fn delete_coupon(coupons: &[Coupon], code: &CouponCode) -> Vec<Coupon> {
    coupons
        .iter()
        .filter(|coupon| &coupon.code != code)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::KRW;
    use testresult::TestResult;

    use super::*;

    fn ten_percent() -> Coupon {
        Coupon::new("10% off", "PERCENT10", CouponDiscount::Percentage(10))
    }

    fn five_thousand_off() -> Coupon {
        Coupon::new("5000 off", "AMOUNT5000", CouponDiscount::Amount(5_000))
    }

    #[test]
    fn percentage_below_minimum_is_ineligible() {
        let result = apply_coupon(Money::from_minor(9_999, KRW), &ten_percent());

        assert_eq!(
            result,
            Err(CouponError::Ineligible {
                minimum: 10_000,
                total: 9_999
            })
        );
    }

    #[test]
    fn percentage_at_minimum_applies() -> TestResult {
        let total = apply_coupon(Money::from_minor(10_000, KRW), &ten_percent())?;

        assert_eq!(total, Money::from_minor(9_000, KRW));

        Ok(())
    }

    #[test]
    fn percentage_above_minimum_applies() -> TestResult {
        let total = apply_coupon(Money::from_minor(50_000, KRW), &ten_percent())?;

        assert_eq!(total, Money::from_minor(45_000, KRW));

        Ok(())
    }

    #[test]
    fn percentage_result_is_floored() -> TestResult {
        let coupon = Coupon::new("15% off", "PERCENT15", CouponDiscount::Percentage(15));

        // 10_001 * 0.85 = 8500.85
        let total = apply_coupon(Money::from_minor(10_001, KRW), &coupon)?;

        assert_eq!(total, Money::from_minor(8_500, KRW));

        Ok(())
    }

    #[test]
    fn full_percentage_reaches_zero() -> TestResult {
        let coupon = Coupon::new("Free", "FREE", CouponDiscount::Percentage(100));

        let total = apply_coupon(Money::from_minor(20_000, KRW), &coupon)?;

        assert_eq!(total, Money::from_minor(0, KRW));

        Ok(())
    }

    #[test]
    fn amount_subtracts_value() -> TestResult {
        let total = apply_coupon(Money::from_minor(12_000, KRW), &five_thousand_off())?;

        assert_eq!(total, Money::from_minor(7_000, KRW));

        Ok(())
    }

    #[test]
    fn amount_clamps_at_zero() -> TestResult {
        let total = apply_coupon(Money::from_minor(3_000, KRW), &five_thousand_off())?;

        assert_eq!(total, Money::from_minor(0, KRW));

        Ok(())
    }

    #[test]
    fn amount_has_no_minimum() -> TestResult {
        let coupon = Coupon::new("100 off", "AMOUNT100", CouponDiscount::Amount(100));

        let total = apply_coupon(Money::from_minor(500, KRW), &coupon)?;

        assert_eq!(total, Money::from_minor(400, KRW));

        Ok(())
    }

    #[test]
    fn percentage_constructor_rejects_above_hundred() {
        assert_eq!(
            CouponDiscount::percentage(101),
            Err(CouponError::InvalidPercentage(101))
        );
        assert_eq!(
            CouponDiscount::percentage(100),
            Ok(CouponDiscount::Percentage(100))
        );
    }

    #[test]
    fn add_coupon_rejects_duplicate_code() -> TestResult {
        let coupons = add_coupon(&[], ten_percent())?;

        let clash = Coupon::new("Other", "PERCENT10", CouponDiscount::Amount(1));

        let result = add_coupon(&coupons, clash);

        assert_eq!(
            result,
            Err(CouponError::DuplicateCode(CouponCode::from("PERCENT10")))
        );

        Ok(())
    }

    #[test]
    fn delete_coupon_removes_by_code() -> TestResult {
        let coupons = add_coupon(&[ten_percent()], five_thousand_off())?;

        let remaining = delete_coupon(&coupons, &CouponCode::from("PERCENT10"));

        assert_eq!(remaining, vec![five_thousand_off()]);
        assert_eq!(delete_coupon(&remaining, &CouponCode::from("NOPE")), remaining);

        Ok(())
    }

    #[test]
    fn serializes_with_string_tag() -> TestResult {
        let value = serde_json::to_value(ten_percent())?;

        assert_eq!(
            value,
            serde_json::json!({
                "name": "10% off",
                "code": "PERCENT10",
                "discountType": "percentage",
                "discountValue": 10
            })
        );

        Ok(())
    }

    #[test]
    fn deserializes_amount_coupon() -> TestResult {
        let json = r#"{ "name": "5000 off", "code": "AMOUNT5000",
                        "discountType": "amount", "discountValue": 5000 }"#;

        let coupon: Coupon = serde_json::from_str(json)?;

        assert_eq!(coupon, five_thousand_off());

        Ok(())
    }

    #[test]
    fn deserialize_rejects_percentage_above_hundred() {
        let json = r#"{ "name": "Too much", "code": "X",
                        "discountType": "percentage", "discountValue": 150 }"#;

        assert!(serde_json::from_str::<Coupon>(json).is_err());
    }
}
