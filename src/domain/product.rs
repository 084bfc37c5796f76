use crate::error::CheckoutError;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Unit price of a product.
///
/// Wraps `rust_decimal::Decimal` so a negative price can never be stored.
/// Decoded from its string form so CSV and JSON keep the exact digits given.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, CheckoutError> {
        if value < Decimal::ZERO {
            Err(CheckoutError::InvalidPrice(value))
        } else {
            Ok(Self(value))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = rust_decimal::serde::str::deserialize(deserializer)?;
        Price::new(value).map_err(serde::de::Error::custom)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Price {
    /// Extended price of a line: unit price times quantity.
    ///
    /// `None` when the product does not fit in a `Decimal`.
    pub fn line_total(self, qty: u32) -> Option<Decimal> {
        self.0.checked_mul(Decimal::from(qty))
    }
}

/// A row of the product table.
///
/// The SKU is the unique key; name and price are set once by catalog-add,
/// quantity is only ever decremented by a committed purchase.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Product {
    pub sku: String,
    pub name: String,
    pub price: Price,
    pub qty: u32,
}

impl Product {
    pub fn new(sku: impl Into<String>, name: impl Into<String>, price: Price, qty: u32) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            price,
            qty,
        }
    }
}
