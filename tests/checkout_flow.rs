//! End-to-end checkout against the bundled seed catalog.
//!
//! Catalog (KRW, stock 20 each):
//!
//! - p1: ₩10,000, 10+ -10%, 20+ -20%
//! - p2: ₩20,000, 10+ -15%
//! - p3: ₩30,000, 10+ -20%, 30+ -25%
//!
//! Coupons: `AMOUNT5000` (₩5,000 off), `PERCENT10` (10% off, ₩10,000 minimum order).

use jiff::Timestamp;
use rusty_money::{Money, iso::KRW};
use testresult::TestResult;

use tally::{
    cart::CartError,
    coupons::{CouponCode, CouponError},
    fixtures::Catalog,
    products::ProductId,
    session::{Session, SessionError},
    store,
};

fn session() -> TestResult<Session> {
    Ok(Catalog::load(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures"), "default")?.into_session())
}

#[test]
fn tiered_cart_with_percentage_coupon_checks_out() -> TestResult {
    let p1 = ProductId::from("p1");
    let p2 = ProductId::from("p2");

    let session = session()?
        .add_to_cart(&p1)?
        .update_quantity(&p1, 10)?
        .add_to_cart(&p2)?
        .update_quantity(&p2, 10)?
        .apply_coupon(&CouponCode::from("PERCENT10"))?;

    let totals = session.totals()?;

    // 90,000 + 170,000 after tiers, then 10% off
    assert_eq!(totals.total_before_discount(), Money::from_minor(300_000, KRW));
    assert_eq!(totals.subtotal_after_item_discounts(), Money::from_minor(260_000, KRW));
    assert_eq!(totals.total_after_discount(), Money::from_minor(234_000, KRW));

    assert_eq!(session.remaining_stock(&p1), Some(10));
    assert_eq!(session.remaining_stock(&p2), Some(10));

    let placed_at = Timestamp::from_second(1_718_000_000)?;
    let (session, order) = session.complete_order(placed_at)?;

    assert_eq!(order.number, "ORD-1718000000000");
    assert_eq!(order.item_count, 20);
    assert_eq!(order.coupon, Some(CouponCode::from("PERCENT10")));
    assert_eq!(order.totals.total_after_discount(), Money::from_minor(234_000, KRW));

    assert!(session.cart().is_empty());
    assert!(session.selected_coupon().is_none());
    assert_eq!(session.remaining_stock(&p1), Some(20));

    Ok(())
}

#[test]
fn amount_coupon_on_single_item() -> TestResult {
    let session = session()?
        .add_to_cart(&ProductId::from("p1"))?
        .apply_coupon(&CouponCode::from("AMOUNT5000"))?;

    assert_eq!(session.totals()?.total_after_discount(), Money::from_minor(5_000, KRW));

    Ok(())
}

#[test]
fn percentage_coupon_rejected_on_empty_cart() -> TestResult {
    let result = session()?.apply_coupon(&CouponCode::from("PERCENT10"));

    assert!(matches!(
        result,
        Err(SessionError::Coupon(CouponError::Ineligible {
            minimum: 10_000,
            total: 0
        }))
    ));

    Ok(())
}

#[test]
fn adding_past_stock_is_rejected() -> TestResult {
    let p3 = ProductId::from("p3");
    let session = session()?.add_to_cart(&p3)?.update_quantity(&p3, 20)?;

    assert_eq!(session.remaining_stock(&p3), Some(0));
    assert!(matches!(
        session.add_to_cart(&p3),
        Err(SessionError::Cart(CartError::StockLimitExceeded { max: 20, .. }))
    ));
    assert!(matches!(
        session.update_quantity(&p3, 21),
        Err(SessionError::Cart(CartError::StockLimitExceeded { max: 20, .. }))
    ));

    Ok(())
}

#[test]
fn sold_out_product_without_a_line_is_insufficient_stock() -> TestResult {
    let p1 = ProductId::from("p1");
    let session = session()?.update_stock(&p1, 0)?;

    assert_eq!(session.remaining_stock(&p1), Some(0));
    assert!(matches!(
        session.add_to_cart(&p1),
        Err(SessionError::Cart(CartError::InsufficientStock { .. }))
    ));
    assert!(session.cart().is_empty());

    Ok(())
}

#[test]
fn removing_last_line_keeps_selected_coupon_but_totals_zero() -> TestResult {
    let p1 = ProductId::from("p1");
    let session = session()?
        .add_to_cart(&p1)?
        .apply_coupon(&CouponCode::from("AMOUNT5000"))?
        .remove_from_cart(&p1);

    assert!(session.cart().is_empty());
    assert!(session.selected_coupon().is_some());
    assert_eq!(session.totals()?.total_after_discount(), Money::from_minor(0, KRW));

    Ok(())
}

#[test]
fn state_survives_a_save_and_load() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tally.json");

    let p2 = ProductId::from("p2");
    let session = session()?
        .add_to_cart(&p2)?
        .update_quantity(&p2, 12)?
        .apply_coupon(&CouponCode::from("PERCENT10"))?;

    store::save(&path, &session)?;
    let restored = store::load(&path)?.ok_or("state file missing")?;

    assert_eq!(restored.totals()?, session.totals()?);
    assert_eq!(restored.remaining_stock(&p2), Some(8));

    Ok(())
}
