//! Session
//!
//! The explicit state a caller threads through every operation: the product and coupon
//! catalogs, the cart, and the code of the selected coupon. The selection is a relation into
//! the coupon catalog, so deleting a coupon can never leave it dangling.
//!
//! Operations borrow the current session and return the next one. A rejected operation
//! returns a [`SessionError`] and the caller keeps the session it already had.

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    cart::{Cart, CartError},
    coupons::{self, Coupon, CouponCode, CouponError},
    pricing::{CartTotals, PricingError, calculate_total},
    products::{self, Product, ProductError, ProductId, ProductUpdate, TierDiscount},
    stock,
};

/// Any rejection a session operation can produce.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    /// Cart stock rule
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Coupon rule or coupon catalog error
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// Product catalog error
    #[error(transparent)]
    Product(#[from] ProductError),

    /// Totalling failed
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Summary of a completed order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderReceipt<'a> {
    /// Order number derived from the completion time, e.g. `ORD-1718000000000`
    pub number: String,

    /// When the order was completed
    pub placed_at: Timestamp,

    /// Units purchased
    pub item_count: u64,

    /// Coupon that was applied, if any
    pub coupon: Option<CouponCode>,

    /// Final totals
    pub totals: CartTotals<'a>,
}

/// Session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    products: Vec<Product>,
    coupons: Vec<Coupon>,
    cart: Cart,
    selected_coupon: Option<CouponCode>,
    currency: &'static Currency,
}

impl Session {
    /// Start a session with an empty cart and no coupon selected.
    pub fn new(products: Vec<Product>, coupons: Vec<Coupon>, currency: &'static Currency) -> Self {
        Self {
            products,
            coupons,
            cart: Cart::new(),
            selected_coupon: None,
            currency,
        }
    }

    /// Resume with a previously stored cart.
    #[must_use]
    pub fn with_cart(mut self, cart: Cart) -> Self {
        self.cart = cart;
        self
    }

    /// Resume with a previously selected coupon. Codes missing from the catalog are dropped.
    #[must_use]
    pub fn with_selected_coupon(mut self, code: Option<CouponCode>) -> Self {
        self.selected_coupon = code.filter(|code| {
            let known = coupons::find_coupon(&self.coupons, code).is_some();
            if !known {
                warn!(coupon_code = %code, "dropping selection of unknown coupon");
            }
            known
        });
        self
    }

    /// Product catalog
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Coupon catalog
    pub fn coupons(&self) -> &[Coupon] {
        &self.coupons
    }

    /// Cart
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Catalog currency
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// The selected coupon, resolved against the catalog.
    pub fn selected_coupon(&self) -> Option<&Coupon> {
        self.selected_coupon
            .as_ref()
            .and_then(|code| coupons::find_coupon(&self.coupons, code))
    }

    /// Units of a product still available to add, or `None` for unknown products.
    pub fn remaining_stock(&self, product_id: &ProductId) -> Option<u32> {
        products::find_product(&self.products, product_id)
            .map(|product| stock::remaining_stock(&self.cart, product))
    }

    /// Current totals.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line total overflows or money arithmetic fails.
    pub fn totals(&self) -> Result<CartTotals<'static>, PricingError> {
        calculate_total(&self.cart, self.selected_coupon(), self.currency)
    }

    /// Add one unit of a catalog product to the cart.
    ///
    /// # Errors
    ///
    /// - [`ProductError::NotFound`]: the id is not in the catalog.
    /// - [`CartError::InsufficientStock`] / [`CartError::StockLimitExceeded`]: stock rules.
    pub fn add_to_cart(&self, product_id: &ProductId) -> Result<Self, SessionError> {
        let product = products::find_product(&self.products, product_id)
            .ok_or_else(|| ProductError::NotFound(product_id.clone()))?;

        let cart = self.cart.add(product).inspect_err(|error| {
            debug!(product_id = %product_id, %error, "add to cart rejected");
        })?;

        debug!(
            product_id = %product_id,
            quantity = stock::quantity_in_cart(&cart, product_id),
            "added to cart"
        );

        Ok(self.with(|next| next.cart = cart))
    }

    /// Set a line's quantity; zero or below removes it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::StockLimitExceeded`] if the quantity is above the product's stock.
    pub fn update_quantity(
        &self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<Self, SessionError> {
        let cart = self
            .cart
            .update_quantity(&self.products, product_id, quantity)
            .inspect_err(|error| {
                debug!(product_id = %product_id, quantity, %error, "quantity update rejected");
            })?;

        debug!(product_id = %product_id, quantity, "quantity updated");

        Ok(self.with(|next| next.cart = cart))
    }

    /// Remove a product's line from the cart.
    #[must_use]
    pub fn remove_from_cart(&self, product_id: &ProductId) -> Self {
        debug!(product_id = %product_id, "removed from cart");

        self.with(|next| next.cart = self.cart.remove(product_id))
    }

    /// Select a coupon, replacing any previous selection.
    ///
    /// # Errors
    ///
    /// - [`CouponError::NotFound`]: the code is not in the catalog.
    /// - [`CouponError::Ineligible`]: a percentage coupon below the minimum order.
    /// - [`PricingError`]: the cart could not be totalled.
    pub fn apply_coupon(&self, code: &CouponCode) -> Result<Self, SessionError> {
        let coupon = coupons::find_coupon(&self.coupons, code)
            .ok_or_else(|| CouponError::NotFound(code.clone()))?;

        let subtotal = calculate_total(&self.cart, None, self.currency)?
            .subtotal_after_item_discounts();

        coupons::apply_coupon(subtotal, coupon).inspect_err(|error| {
            debug!(coupon_code = %code, %error, "coupon rejected");
        })?;

        debug!(coupon_code = %code, "coupon applied");

        Ok(self.with(|next| next.selected_coupon = Some(code.clone())))
    }

    /// Deselect the current coupon, if any.
    #[must_use]
    pub fn clear_coupon(&self) -> Self {
        self.with(|next| next.selected_coupon = None)
    }

    /// Complete the order: report final totals, then empty the cart and clear the coupon.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the cart could not be totalled.
    pub fn complete_order(
        &self,
        placed_at: Timestamp,
    ) -> Result<(Self, OrderReceipt<'static>), SessionError> {
        let totals = self.totals()?;

        let receipt = OrderReceipt {
            number: format!("ORD-{}", placed_at.as_millisecond()),
            placed_at,
            item_count: self.cart.item_count(),
            coupon: self.selected_coupon().map(|coupon| coupon.code().clone()),
            totals,
        };

        debug!(
            order = %receipt.number,
            total = %totals.total_after_discount(),
            "order completed"
        );

        let next = self.with(|next| {
            next.cart = next.cart.clear();
            next.selected_coupon = None;
        });

        Ok((next, receipt))
    }

    /// Add a coupon to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::DuplicateCode`] if the code is already taken.
    pub fn add_coupon(&self, coupon: Coupon) -> Result<Self, SessionError> {
        let coupons = coupons::add_coupon(&self.coupons, coupon)?;

        Ok(self.with(|next| next.coupons = coupons))
    }

    /// Delete a coupon from the catalog, clearing the selection if it pointed at it.
    #[must_use]
    pub fn delete_coupon(&self, code: &CouponCode) -> Self {
        self.with(|next| {
            next.coupons = coupons::delete_coupon(&self.coupons, code);

            if next.selected_coupon.as_ref() == Some(code) {
                debug!(coupon_code = %code, "selected coupon deleted; selection cleared");
                next.selected_coupon = None;
            }
        })
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductError`] for duplicate ids or unordered tiers.
    pub fn add_product(&self, product: Product) -> Result<Self, SessionError> {
        let products = products::add_product(&self.products, product)?;

        Ok(self.with(|next| next.products = products))
    }

    /// Partially update a catalog product. Cart lines keep the snapshot taken when added.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductError`] for unknown ids or unordered tiers.
    pub fn update_product(
        &self,
        product_id: &ProductId,
        update: ProductUpdate,
    ) -> Result<Self, SessionError> {
        let products = products::update_product(&self.products, product_id, update)?;

        Ok(self.with(|next| next.products = products))
    }

    /// Delete a catalog product.
    #[must_use]
    pub fn delete_product(&self, product_id: &ProductId) -> Self {
        self.with(|next| next.products = products::delete_product(&self.products, product_id))
    }

    /// Set a catalog product's stock level.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::NotFound`] for unknown ids.
    pub fn update_stock(&self, product_id: &ProductId, stock: u32) -> Result<Self, SessionError> {
        let products = products::update_stock(&self.products, product_id, stock)?;

        Ok(self.with(|next| next.products = products))
    }

    /// Add a volume tier to a catalog product.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductError`] for unknown ids or duplicate thresholds.
    pub fn add_tier(
        &self,
        product_id: &ProductId,
        tier: TierDiscount,
    ) -> Result<Self, SessionError> {
        let products = products::add_tier(&self.products, product_id, tier)?;

        Ok(self.with(|next| next.products = products))
    }

    /// Remove a volume tier from a catalog product.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::NotFound`] for unknown ids.
    pub fn remove_tier(&self, product_id: &ProductId, quantity: u32) -> Result<Self, SessionError> {
        let products = products::remove_tier(&self.products, product_id, quantity)?;

        Ok(self.with(|next| next.products = products))
    }

    /// Savings shown on the checkout summary.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the cart could not be totalled.
    pub fn savings(&self) -> Result<Money<'static, Currency>, PricingError> {
        Ok(self.totals()?.savings()?)
    }

    fn with(&self, change: impl FnOnce(&mut Self)) -> Self {
        let mut next = self.clone();
        change(&mut next);
        next
    }
}
