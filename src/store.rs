//! Store
//!
//! A session persisted as a single JSON document. The engine never touches this module; it is
//! the outer layer the CLI wires around it.
//!
//! ```json
//! {
//!   "currency": "KRW",
//!   "products": [{ "id": "p1", "name": "...", "price": 10000, "stock": 20, "discounts": [] }],
//!   "coupons": [
//!     { "name": "...", "code": "PERCENT10", "discountType": "percentage", "discountValue": 10 }
//!   ],
//!   "cart": [{ "product": { "id": "p1", "...": "..." }, "quantity": 2 }],
//!   "selectedCoupon": "PERCENT10"
//! }
//! ```
//!
//! `cart` is omitted while the cart is empty and `selectedCoupon` while nothing is selected.

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::Cart,
    coupons::{Coupon, CouponCode},
    fixtures::{FixtureError, parse_currency},
    products::Product,
    session::Session,
};

/// Errors reading or writing persisted state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error reading or writing the state file
    #[error("Failed to access state file: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding or decoding error
    #[error("Invalid state document: {0}")]
    Json(#[from] serde_json::Error),

    /// The stored currency code is not supported
    #[error(transparent)]
    Currency(#[from] FixtureError),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredState {
    currency: String,

    products: Vec<Product>,

    coupons: Vec<Coupon>,

    #[serde(default, skip_serializing_if = "Cart::is_empty")]
    cart: Cart,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected_coupon: Option<CouponCode>,
}

impl From<&Session> for StoredState {
    fn from(session: &Session) -> Self {
        Self {
            currency: session.currency().iso_alpha_code.to_string(),
            products: session.products().to_vec(),
            coupons: session.coupons().to_vec(),
            cart: session.cart().clone(),
            selected_coupon: session.selected_coupon().map(|coupon| coupon.code().clone()),
        }
    }
}

/// Encode a session as a JSON document.
///
/// # Errors
///
/// Returns [`StoreError::Json`] if encoding fails.
pub fn to_json(session: &Session) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(&StoredState::from(session))?)
}

/// Decode a session from a JSON document.
///
/// # Errors
///
/// Returns an error if the document is malformed, breaks a cart invariant, or names an
/// unsupported currency.
pub fn from_json(contents: &str) -> Result<Session, StoreError> {
    let state: StoredState = serde_json::from_str(contents)?;
    let currency = parse_currency(&state.currency)?;

    Ok(Session::new(state.products, state.coupons, currency)
        .with_cart(state.cart)
        .with_selected_coupon(state.selected_coupon))
}

/// Load a session from `path`, or `None` if the file does not exist yet.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or decoded.
pub fn load(path: &Path) -> Result<Option<Session>, StoreError> {
    match fs::read_to_string(path) {
        Ok(contents) => from_json(&contents).map(Some),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Write a session to `path`, replacing any previous contents.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn save(path: &Path, session: &Session) -> Result<(), StoreError> {
    fs::write(path, to_json(session)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::KRW;
    use testresult::TestResult;

    use crate::{
        coupons::CouponDiscount,
        products::{ProductId, TierDiscount},
    };

    use super::*;

    fn session() -> TestResult<Session> {
        Ok(Session::new(
            vec![
                Product::new("p1", "Widget", 10_000, 20)
                    .with_discounts([TierDiscount::new(10, 0.1)?]),
            ],
            vec![Coupon::new(
                "10% off",
                "PERCENT10",
                CouponDiscount::Percentage(10),
            )],
            KRW,
        ))
    }

    #[test]
    fn empty_cart_and_selection_are_omitted() -> TestResult {
        let value: serde_json::Value = serde_json::from_str(&to_json(&session()?)?)?;

        assert!(value.get("cart").is_none());
        assert!(value.get("selectedCoupon").is_none());
        assert_eq!(value.get("currency"), Some(&serde_json::json!("KRW")));

        Ok(())
    }

    #[test]
    fn save_then_load_restores_cart_and_selection() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("state.json");

        let session = session()?
            .add_to_cart(&ProductId::from("p1"))?
            .apply_coupon(&CouponCode::from("PERCENT10"))?;

        save(&path, &session)?;
        let restored = load(&path)?.ok_or("state file missing")?;

        assert_eq!(restored, session);

        Ok(())
    }

    #[test]
    fn load_missing_file_is_none() -> TestResult {
        let dir = tempfile::tempdir()?;

        assert!(load(&dir.path().join("absent.json"))?.is_none());

        Ok(())
    }

    #[test]
    fn from_json_rejects_cart_above_stock() {
        let json = r#"{
            "currency": "KRW",
            "products": [],
            "coupons": [],
            "cart": [
                { "product": { "id": "p1", "name": "W", "price": 1, "stock": 1 }, "quantity": 2 }
            ]
        }"#;

        assert!(matches!(from_json(json), Err(StoreError::Json(_))));
    }

    #[test]
    fn from_json_rejects_unknown_currency() {
        let json = r#"{ "currency": "XYZ", "products": [], "coupons": [] }"#;

        assert!(matches!(from_json(json), Err(StoreError::Currency(_))));
    }
}
