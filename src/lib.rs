//! Tally
//!
//! Tally is the pricing core of a shopping cart: stock-safe cart mutations, volume tier
//! discounts, single-coupon resolution and the final payable total.
//!
//! Every operation takes the current state by reference and returns the next state, or a typed
//! error naming the rule that rejected it. Nothing is cached and nothing is mutated in place.

pub mod cart;
pub mod coupons;
pub mod discounts;
pub mod fixtures;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod session;
pub mod stock;
pub mod store;
