//! Cart
//!
//! An ordered list of line items, at most one per product. Every operation is a pure
//! transformation: it borrows the current cart and returns the next one, or a [`CartError`]
//! describing the stock rule that blocked it. The input cart is never modified.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    products::{Product, ProductId, find_product},
    stock,
};

/// Stock rules that can reject a cart mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Nothing left to add for this product.
    #[error("product {product_id} is out of stock")]
    InsufficientStock {
        /// Product that was being added
        product_id: ProductId,
    },

    /// The requested quantity is above the product's stock level.
    #[error("only {max} of product {product_id} in stock")]
    StockLimitExceeded {
        /// Product whose quantity was being raised
        product_id: ProductId,
        /// Highest quantity the cart may hold
        max: u32,
    },

    /// A cart was built with two lines for the same product.
    #[error("product {0} appears on more than one cart line")]
    DuplicateLine(ProductId),
}

/// One product's entry in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    product: Product,
    quantity: NonZeroU32,
}

impl CartLineItem {
    /// Create a line holding a single unit of `product`.
    pub fn new(product: Product) -> Self {
        Self {
            product,
            quantity: NonZeroU32::MIN,
        }
    }

    /// Create a line with an explicit quantity.
    pub fn with_quantity(product: Product, quantity: NonZeroU32) -> Self {
        Self { product, quantity }
    }

    /// Snapshot of the product taken when the line was added.
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Quantity on this line; always at least one.
    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }
}

/// Cart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartLineItem>", into = "Vec<CartLineItem>")]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cart from existing lines.
    ///
    /// # Errors
    ///
    /// - [`CartError::DuplicateLine`]: two lines share a product id.
    /// - [`CartError::StockLimitExceeded`]: a line holds more than its product's stock.
    pub fn with_items(items: impl Into<Vec<CartLineItem>>) -> Result<Self, CartError> {
        let items = items.into();

        items.iter().enumerate().try_for_each(|(i, line)| {
            let id = &line.product.id;

            if items.iter().take(i).any(|earlier| &earlier.product.id == id) {
                return Err(CartError::DuplicateLine(id.clone()));
            }

            if line.quantity() > line.product.stock {
                return Err(CartError::StockLimitExceeded {
                    product_id: id.clone(),
                    max: line.product.stock,
                });
            }

            Ok(())
        })?;

        Ok(Self { items })
    }

    /// Add one unit of `product`, appending a new line if the product is not in the cart yet.
    ///
    /// # Errors
    ///
    /// - [`CartError::InsufficientStock`]: the product has no remaining stock.
    /// - [`CartError::StockLimitExceeded`]: one more unit would exceed the product's stock.
    pub fn add(&self, product: &Product) -> Result<Self, CartError> {
        if self.line(&product.id).is_none() {
            if !stock::is_available(self, product) {
                return Err(CartError::InsufficientStock {
                    product_id: product.id.clone(),
                });
            }

            let mut items = self.items.clone();
            items.push(CartLineItem::new(product.clone()));

            return Ok(Self { items });
        }

        self.replace_quantity(&product.id, |current| {
            current
                .checked_add(1)
                .filter(|proposed| proposed.get() <= product.stock)
                .ok_or_else(|| CartError::StockLimitExceeded {
                    product_id: product.id.clone(),
                    max: product.stock,
                })
        })
    }

    /// Drop the line for `product_id`. Absent ids leave the cart unchanged.
    #[must_use]
    pub fn remove(&self, product_id: &ProductId) -> Self {
        Self {
            items: self
                .items
                .iter()
                .filter(|line| &line.product.id != product_id)
                .cloned()
                .collect(),
        }
    }

    /// Set the quantity of a line, validated against the catalog's current stock.
    ///
    /// A quantity of zero or below removes the line. Products unknown to `products`, and
    /// products without a line, leave the cart unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::StockLimitExceeded`] if `new_quantity` is above the product's stock.
    pub fn update_quantity(
        &self,
        products: &[Product],
        product_id: &ProductId,
        new_quantity: i64,
    ) -> Result<Self, CartError> {
        if new_quantity <= 0 {
            return Ok(self.remove(product_id));
        }

        let Some(product) = find_product(products, product_id) else {
            return Ok(self.clone());
        };

        // Anything above u32::MAX is above every stock level too.
        let Some(quantity) = u32::try_from(new_quantity)
            .ok()
            .and_then(NonZeroU32::new)
            .filter(|quantity| quantity.get() <= product.stock)
        else {
            return Err(CartError::StockLimitExceeded {
                product_id: product_id.clone(),
                max: product.stock,
            });
        };

        if self.line(product_id).is_none() {
            return Ok(self.clone());
        }

        self.replace_quantity(product_id, |_| Ok(quantity))
    }

    /// Empty the cart.
    #[must_use]
    pub fn clear(&self) -> Self {
        Self::new()
    }

    /// Get the line for a product.
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLineItem> {
        self.items
            .iter()
            .find(|line| &line.product.id == product_id)
    }

    /// Iterate over lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLineItem> {
        self.items.iter()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity())).sum()
    }

    fn replace_quantity(
        &self,
        product_id: &ProductId,
        next: impl FnOnce(NonZeroU32) -> Result<NonZeroU32, CartError>,
    ) -> Result<Self, CartError> {
        let mut items = self.items.clone();

        if let Some(line) = items.iter_mut().find(|line| &line.product.id == product_id) {
            line.quantity = next(line.quantity)?;
        }

        Ok(Self { items })
    }
}

impl TryFrom<Vec<CartLineItem>> for Cart {
    type Error = CartError;

    fn try_from(items: Vec<CartLineItem>) -> Result<Self, Self::Error> {
        Self::with_items(items)
    }
}

impl From<Cart> for Vec<CartLineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'c> IntoIterator for &'c Cart {
    type Item = &'c CartLineItem;
    type IntoIter = std::slice::Iter<'c, CartLineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
