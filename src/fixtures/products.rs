//! Product Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{
    fixtures::{FixtureError, parse_currency},
    products::{Product, TierDiscount},
};

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product id
    pub id: String,

    /// Product name
    pub name: String,

    /// Product price (e.g., "10000 KRW")
    pub price: String,

    /// Units in stock
    pub stock: u32,

    /// Volume tiers
    #[serde(default)]
    pub discounts: Vec<TierFixture>,

    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,

    /// Highlighted in listings
    #[serde(default)]
    pub recommended: Option<bool>,
}

/// Tier Fixture
#[derive(Debug, Deserialize)]
pub struct TierFixture {
    /// Quantity threshold
    pub quantity: u32,

    /// Rate, as "10%" or "0.1"
    pub rate: String,
}

impl ProductFixture {
    /// Convert into a [`Product`], returning the currency its price was written in.
    ///
    /// # Errors
    ///
    /// Returns an error if the price, a rate, or a tier is invalid.
    pub fn into_product(self) -> Result<(Product, &'static Currency), FixtureError> {
        let (price, currency) = parse_price(&self.price)?;

        let discounts = self
            .discounts
            .iter()
            .map(|tier| Ok(TierDiscount::new(tier.quantity, parse_rate(&tier.rate)?)?))
            .collect::<Result<Vec<_>, FixtureError>>()?;

        let product = Product {
            id: self.id.into(),
            name: self.name,
            price,
            stock: self.stock,
            discounts,
            description: self.description,
            is_recommended: self.recommended,
        };

        Ok((product, currency))
    }
}

/// Parse price string (e.g., "10000 KRW" or "2.99 GBP") into minor units and currency.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if the amount is
/// negative or has more precision than the currency's minor unit, or if the currency code is
/// not recognized.
pub fn parse_price(s: &str) -> Result<(u64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = parse_currency(currency_code)?;

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::from(10u64.pow(currency.exponent)))
        .filter(|value| value.fract().is_zero())
        .and_then(|value| value.to_u64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Parse a rate string (e.g., "15%" or "0.15") into a fraction.
///
/// # Errors
///
/// Returns an error if the string cannot be parsed as a number.
pub fn parse_rate(s: &str) -> Result<f64, FixtureError> {
    let trimmed = s.trim();

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        let value = percent_str
            .trim()
            .parse::<f64>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(value / 100.0)
    } else {
        trimmed
            .parse::<f64>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, KRW};

    use super::*;

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("10000KRW");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_scales_by_currency_exponent() -> Result<(), FixtureError> {
        let (krw_minor, krw) = parse_price("10000 KRW")?;
        let (gbp_minor, gbp) = parse_price("2.50 GBP")?;

        assert_eq!(krw_minor, 10_000);
        assert_eq!(krw, KRW);
        assert_eq!(gbp_minor, 250);
        assert_eq!(gbp, GBP);

        Ok(())
    }

    #[test]
    fn parse_price_rejects_fractional_won() {
        assert!(matches!(
            parse_price("10.5 KRW"),
            Err(FixtureError::InvalidPrice(_))
        ));
    }

    #[test]
    fn parse_price_rejects_negative_amount() {
        assert!(matches!(
            parse_price("-1 KRW"),
            Err(FixtureError::InvalidPrice(_))
        ));
    }

    #[test]
    fn parse_rate_accepts_both_formats() -> Result<(), FixtureError> {
        assert!((parse_rate("15%")? - 0.15).abs() < f64::EPSILON);
        assert!((parse_rate(" 0.15 ")? - 0.15).abs() < f64::EPSILON);

        Ok(())
    }

    #[test]
    fn parse_rate_rejects_invalid_format() {
        assert!(matches!(
            parse_rate("lots"),
            Err(FixtureError::InvalidPercentage(_))
        ));
    }

    #[test]
    fn into_product_rejects_rate_out_of_range() {
        let fixture = ProductFixture {
            id: "p1".to_string(),
            name: "Widget".to_string(),
            price: "100 KRW".to_string(),
            stock: 1,
            discounts: vec![TierFixture {
                quantity: 5,
                rate: "150%".to_string(),
            }],
            description: None,
            recommended: None,
        };

        assert!(matches!(
            fixture.into_product(),
            Err(FixtureError::Product(_))
        ));
    }
}
