use crate::error::CheckoutError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One requested line: a SKU and how many units to take.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct PurchaseLineItem {
    pub sku: String,
    pub qty: u32,
}

impl PurchaseLineItem {
    pub fn new(sku: impl Into<String>, qty: u32) -> Self {
        Self {
            sku: sku.into(),
            qty,
        }
    }
}

/// Inbound purchase: who is buying and the ordered line items.
///
/// Missing fields decode as empty so that the pre-transaction checks in
/// [`PurchaseRequest::validate`] report them instead of the decoder.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct PurchaseRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<PurchaseLineItem>,
}

impl PurchaseRequest {
    pub fn new(user_id: impl Into<String>, items: Vec<PurchaseLineItem>) -> Self {
        Self {
            user_id: user_id.into(),
            items,
        }
    }

    /// Checks everything that can be decided without touching the store.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.user_id.is_empty() {
            return Err(CheckoutError::MissingUser);
        }
        if self.items.is_empty() {
            return Err(CheckoutError::EmptyOrder);
        }
        if let Some(item) = self.items.iter().find(|item| item.qty == 0) {
            return Err(CheckoutError::InvalidQuantity {
                sku: item.sku.clone(),
            });
        }
        Ok(())
    }
}

/// Result of a committed purchase.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PurchaseReceipt {
    pub user_id: String,
    /// The request's line items, echoed in request order.
    pub items_purchased: Vec<PurchaseLineItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}
