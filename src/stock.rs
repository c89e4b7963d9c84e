//! Stock
//!
//! Remaining stock is derived from the catalog level minus what the cart already holds. Callers
//! check it before mutating the cart rather than clamping afterwards.

use crate::{
    cart::Cart,
    products::{Product, ProductId},
};

/// Quantity of `product_id` currently committed in the cart (0 when absent).
pub fn quantity_in_cart(cart: &Cart, product_id: &ProductId) -> u32 {
    cart.line(product_id).map_or(0, |line| line.quantity())
}

/// Units of `product` still available to add to the cart.
pub fn remaining_stock(cart: &Cart, product: &Product) -> u32 {
    product
        .stock
        .saturating_sub(quantity_in_cart(cart, &product.id))
}

/// Whether at least one more unit of `product` may be added.
pub fn is_available(cart: &Cart, product: &Product) -> bool {
    remaining_stock(cart, product) > 0
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn remaining_stock_without_line_is_full_stock() {
        let product = Product::new("p1", "Widget", 100, 5);

        assert_eq!(remaining_stock(&Cart::new(), &product), 5);
        assert!(is_available(&Cart::new(), &product));
    }

    #[test]
    fn remaining_stock_subtracts_cart_quantity() -> TestResult {
        let product = Product::new("p1", "Widget", 100, 5);
        let cart = Cart::new().add(&product)?.add(&product)?;

        assert_eq!(quantity_in_cart(&cart, &product.id), 2);
        assert_eq!(remaining_stock(&cart, &product), 3);

        Ok(())
    }

    #[test]
    fn remaining_stock_never_underflows_after_restock_down() -> TestResult {
        let product = Product::new("p1", "Widget", 100, 3);
        let cart = Cart::new().add(&product)?.add(&product)?.add(&product)?;

        let reduced = Product {
            stock: 1,
            ..product
        };

        assert_eq!(remaining_stock(&cart, &reduced), 0);
        assert!(!is_available(&cart, &reduced));

        Ok(())
    }

    #[test]
    fn sold_out_product_has_no_remaining_stock() {
        let product = Product::new("p1", "Widget", 100, 0);

        assert_eq!(remaining_stock(&Cart::new(), &product), 0);
    }
}
