//! Tally prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLineItem},
    coupons::{Coupon, CouponCode, CouponDiscount, CouponError, PERCENTAGE_MINIMUM_ORDER},
    discounts::{DiscountError, line_total, resolve_rate},
    fixtures::{Catalog, FixtureError},
    pricing::{CartTotals, PricingError, calculate_total},
    products::{Product, ProductError, ProductId, ProductUpdate, TierDiscount},
    session::{OrderReceipt, Session, SessionError},
    stock::remaining_stock,
    store::StoreError,
};
