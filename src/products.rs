//! Products

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by product catalog transformations.
#[derive(Debug, Error, PartialEq)]
pub enum ProductError {
    /// A product with this id is already in the catalog.
    #[error("product {0} already exists")]
    DuplicateId(ProductId),

    /// No product with this id is in the catalog.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// A tier threshold must be positive and its rate must lie in `[0, 1)`.
    #[error("invalid discount tier: quantity {quantity}, rate {rate}")]
    InvalidTier {
        /// Offending quantity threshold
        quantity: u32,
        /// Offending rate
        rate: f64,
    },

    /// Tier thresholds must be strictly increasing.
    #[error("discount tiers for product {0} are not strictly increasing")]
    UnorderedTiers(ProductId),

    /// A tier with this threshold already exists on the product.
    #[error("product {product_id} already has a tier at quantity {quantity}")]
    DuplicateTier {
        /// Product the tier was added to
        product_id: ProductId,
        /// Threshold that collided
        quantity: u32,
    },
}

/// Product identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A quantity threshold paired with the rate it unlocks for the whole line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TierRecord", into = "TierRecord")]
pub struct TierDiscount {
    quantity: u32,
    rate: f64,
}

#[derive(Serialize, Deserialize)]
struct TierRecord {
    quantity: u32,
    rate: f64,
}

impl TierDiscount {
    /// Create a tier.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::InvalidTier`] if `quantity` is zero or `rate` is not a finite
    /// value in `[0, 1)`.
    pub fn new(quantity: u32, rate: f64) -> Result<Self, ProductError> {
        if quantity == 0 || !rate.is_finite() || !(0.0..1.0).contains(&rate) {
            return Err(ProductError::InvalidTier { quantity, rate });
        }

        Ok(Self { quantity, rate })
    }

    /// Quantity threshold at which this tier starts to apply.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Fractional discount rate, e.g. `0.1` for 10% off.
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl TryFrom<TierRecord> for TierDiscount {
    type Error = ProductError;

    fn try_from(record: TierRecord) -> Result<Self, Self::Error> {
        Self::new(record.quantity, record.rate)
    }
}

impl From<TierDiscount> for TierRecord {
    fn from(tier: TierDiscount) -> Self {
        Self {
            quantity: tier.quantity,
            rate: tier.rate,
        }
    }
}

/// Product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product id
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Unit price in the catalog currency's smallest unit
    pub price: u64,

    /// Units available for sale
    pub stock: u32,

    /// Volume discount tiers, thresholds strictly increasing
    #[serde(default)]
    pub discounts: Vec<TierDiscount>,

    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Highlighted in product listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_recommended: Option<bool>,
}

impl Product {
    /// Create a product with no discount tiers.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: u64, stock: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            stock,
            discounts: Vec::new(),
            description: None,
            is_recommended: None,
        }
    }

    /// Replace the discount tiers.
    #[must_use]
    pub fn with_discounts(mut self, discounts: impl Into<Vec<TierDiscount>>) -> Self {
        self.discounts = discounts.into();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check the tier table is strictly increasing by threshold.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::UnorderedTiers`] when two adjacent tiers are out of order or
    /// share a threshold.
    pub fn validate(&self) -> Result<(), ProductError> {
        let ordered = self
            .discounts
            .windows(2)
            .all(|pair| matches!(pair, [a, b] if a.quantity() < b.quantity()));

        if ordered {
            Ok(())
        } else {
            Err(ProductError::UnorderedTiers(self.id.clone()))
        }
    }

    /// Whether the name or description contains `term`, ignoring case.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();

        self.name.to_lowercase().contains(&term)
            || self
                .description
                .as_deref()
                .is_some_and(|description| description.to_lowercase().contains(&term))
    }
}

/// Partial update applied by [`update_product`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    /// New name
    pub name: Option<String>,
    /// New unit price
    pub price: Option<u64>,
    /// New stock level
    pub stock: Option<u32>,
    /// New tier table
    pub discounts: Option<Vec<TierDiscount>>,
    /// New description
    pub description: Option<String>,
    /// New recommended flag
    pub is_recommended: Option<bool>,
}

/// Find a product by id.
pub fn find_product<'p>(products: &'p [Product], id: &ProductId) -> Option<&'p Product> {
    products.iter().find(|product| &product.id == id)
}

/// Append a product to the catalog.
///
/// # Errors
///
/// - [`ProductError::DuplicateId`]: the id is already taken.
/// - [`ProductError::UnorderedTiers`]: the product's tier table is not strictly increasing.
pub fn add_product(products: &[Product], product: Product) -> Result<Vec<Product>, ProductError> {
    if find_product(products, &product.id).is_some() {
        return Err(ProductError::DuplicateId(product.id));
    }

    product.validate()?;

    let mut next = products.to_vec();
    next.push(product);

    Ok(next)
}

/// Apply a partial update to a product.
///
/// # Errors
///
/// - [`ProductError::NotFound`]: no product has this id.
/// - [`ProductError::UnorderedTiers`]: the updated tier table is not strictly increasing.
pub fn update_product(
    products: &[Product],
    id: &ProductId,
    update: ProductUpdate,
) -> Result<Vec<Product>, ProductError> {
    map_product(products, id, |product| {
        let ProductUpdate {
            name,
            price,
            stock,
            discounts,
            description,
            is_recommended,
        } = update;

        if let Some(name) = name {
            product.name = name;
        }
        if let Some(price) = price {
            product.price = price;
        }
        if let Some(stock) = stock {
            product.stock = stock;
        }
        if let Some(discounts) = discounts {
            product.discounts = discounts;
        }
        if description.is_some() {
            product.description = description;
        }
        if is_recommended.is_some() {
            product.is_recommended = is_recommended;
        }

        product.validate()
    })
}

/// Remove a product from the catalog. Absent ids leave the catalog unchanged.
pub fn delete_product(products: &[Product], id: &ProductId) -> Vec<Product> {
    products
        .iter()
        .filter(|product| &product.id != id)
        .cloned()
        .collect()
}

/// Set a product's stock level.
///
/// # Errors
///
/// Returns [`ProductError::NotFound`] if no product has this id.
pub fn update_stock(
    products: &[Product],
    id: &ProductId,
    stock: u32,
) -> Result<Vec<Product>, ProductError> {
    map_product(products, id, |product| {
        product.stock = stock;
        Ok(())
    })
}

/// Insert a tier into a product's table, keeping thresholds ordered.
///
/// # Errors
///
/// - [`ProductError::NotFound`]: no product has this id.
/// - [`ProductError::DuplicateTier`]: a tier already exists at this threshold.
pub fn add_tier(
    products: &[Product],
    id: &ProductId,
    tier: TierDiscount,
) -> Result<Vec<Product>, ProductError> {
    map_product(products, id, |product| {
        match product
            .discounts
            .binary_search_by_key(&tier.quantity(), TierDiscount::quantity)
        {
            Ok(_) => Err(ProductError::DuplicateTier {
                product_id: product.id.clone(),
                quantity: tier.quantity(),
            }),
            Err(position) => {
                product.discounts.insert(position, tier);
                Ok(())
            }
        }
    })
}

/// Remove the tier at `quantity` from a product. Missing thresholds are ignored.
///
/// # Errors
///
/// Returns [`ProductError::NotFound`] if no product has this id.
pub fn remove_tier(
    products: &[Product],
    id: &ProductId,
    quantity: u32,
) -> Result<Vec<Product>, ProductError> {
    map_product(products, id, |product| {
        product.discounts.retain(|tier| tier.quantity() != quantity);
        Ok(())
    })
}

/// Products whose name or description contains `term`. An empty term matches everything.
pub fn search<'p>(products: &'p [Product], term: &str) -> Vec<&'p Product> {
    let term = term.trim();

    products
        .iter()
        .filter(|product| term.is_empty() || product.matches(term))
        .collect()
}

fn map_product(
    products: &[Product],
    id: &ProductId,
    apply: impl FnOnce(&mut Product) -> Result<(), ProductError>,
) -> Result<Vec<Product>, ProductError> {
    let mut next = products.to_vec();

    let product = next
        .iter_mut()
        .find(|product| &product.id == id)
        .ok_or_else(|| ProductError::NotFound(id.clone()))?;

    apply(product)?;

    Ok(next)
}
