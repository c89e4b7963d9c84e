//! Fixtures
//!
//! Seed catalogs written in YAML. A fixture set named `default` lives at
//! `<base>/catalog/default.yml` and holds the products and coupons a fresh session starts with.

use std::{fs, path::PathBuf};

use rusty_money::iso::{Currency, EUR, GBP, KRW, USD};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    coupons::{Coupon, CouponError, add_coupon},
    fixtures::{coupons::CouponFixture, products::ProductFixture},
    products::{Product, ProductError, add_product},
    session::Session,
};

pub mod coupons;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between prices
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No priced entries, so the catalog currency is unknown
    #[error("No products loaded; currency unknown")]
    NoCurrency,

    /// Product rejected by the catalog
    #[error(transparent)]
    Product(#[from] ProductError),

    /// Coupon rejected by the catalog
    #[error(transparent)]
    Coupon(#[from] CouponError),
}

#[derive(Debug, Deserialize)]
struct CatalogFixture {
    #[serde(default)]
    products: Vec<ProductFixture>,

    #[serde(default)]
    coupons: Vec<CouponFixture>,
}

/// A parsed seed catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    coupons: Vec<Coupon>,
    currency: &'static Currency,
}

impl Catalog {
    /// Load `<base_path>/catalog/<name>.yml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if prices mix currencies.
    pub fn load(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let file_path = base_path
            .into()
            .join("catalog")
            .join(format!("{name}.yml"));

        let contents = fs::read_to_string(&file_path)?;

        Self::from_yaml(&contents)
    }

    /// Parse a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, a price or rate is invalid, prices mix
    /// currencies, or a product id or coupon code is duplicated.
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        let fixture: CatalogFixture = serde_norway::from_str(contents)?;

        let mut currency: Option<&'static Currency> = None;
        let mut catalog_products = Vec::with_capacity(fixture.products.len());

        for product_fixture in fixture.products {
            let (product, product_currency) = product_fixture.into_product()?;

            ensure_currency(&mut currency, product_currency)?;

            catalog_products = add_product(&catalog_products, product)?;
        }

        let mut catalog_coupons = Vec::with_capacity(fixture.coupons.len());

        for coupon_fixture in fixture.coupons {
            let (coupon, coupon_currency) = coupon_fixture.into_coupon()?;

            if let Some(coupon_currency) = coupon_currency {
                ensure_currency(&mut currency, coupon_currency)?;
            }

            catalog_coupons = add_coupon(&catalog_coupons, coupon)?;
        }

        Ok(Self {
            products: catalog_products,
            coupons: catalog_coupons,
            currency: currency.ok_or(FixtureError::NoCurrency)?,
        })
    }

    /// Get all products
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Get all coupons
    pub fn coupons(&self) -> &[Coupon] {
        &self.coupons
    }

    /// Catalog currency, taken from the fixture's prices
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Start a session over this catalog.
    pub fn into_session(self) -> Session {
        Session::new(self.products, self.coupons, self.currency)
    }
}

/// Resolve an ISO currency code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for codes outside the supported set.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "KRW" => Ok(KRW),
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

fn ensure_currency(
    current: &mut Option<&'static Currency>,
    found: &'static Currency,
) -> Result<(), FixtureError> {
    match *current {
        Some(existing) if existing != found => Err(FixtureError::CurrencyMismatch(
            existing.iso_alpha_code.to_string(),
            found.iso_alpha_code.to_string(),
        )),
        Some(_) => Ok(()),
        None => {
            *current = Some(found);
            Ok(())
        }
    }
}
