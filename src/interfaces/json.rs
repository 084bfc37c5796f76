//! JSON request/response shaping for the purchase operation.
//!
//! Decodes an inbound body into a [`PurchaseRequest`] and turns the
//! transactor's outcome into a status code plus either the receipt or an
//! `{"error": ...}` body. Routing and serving are left to whatever transport
//! embeds this.

use crate::application::transactor::PurchaseTransactor;
use crate::domain::purchase::{PurchaseReceipt, PurchaseRequest};
use crate::error::{CheckoutError, Result};
use serde::{Deserialize, Serialize};

pub const STATUS_OK: u16 = 200;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(untagged)]
pub enum ResponseBody {
    Receipt(PurchaseReceipt),
    Error(ErrorBody),
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct Response {
    pub status: u16,
    pub body: ResponseBody,
}

impl From<PurchaseReceipt> for Response {
    fn from(receipt: PurchaseReceipt) -> Self {
        Self {
            status: STATUS_OK,
            body: ResponseBody::Receipt(receipt),
        }
    }
}

impl From<&CheckoutError> for Response {
    fn from(err: &CheckoutError) -> Self {
        Self {
            status: err.kind().status_code(),
            body: ResponseBody::Error(ErrorBody {
                error: err.to_string(),
            }),
        }
    }
}

pub fn decode_purchase_request(body: &[u8]) -> Result<PurchaseRequest> {
    serde_json::from_slice(body).map_err(CheckoutError::InvalidBody)
}

/// Runs one purchase end to end: decode, purchase, encode.
pub async fn handle_purchase(transactor: &PurchaseTransactor, body: &[u8]) -> Response {
    let outcome = match decode_purchase_request(body) {
        Ok(request) => transactor.purchase(request).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(receipt) => receipt.into(),
        Err(e) => (&e).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::{Price, Product};
    use crate::infrastructure::in_memory::InMemoryProductStore;
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};

    fn transactor() -> PurchaseTransactor {
        PurchaseTransactor::new(Box::new(InMemoryProductStore::from_products(vec![
            Product::new("120P90", "Widget", Price::new(dec!(10.0)).unwrap(), 5),
            Product::new("43N23P", "Gadget", Price::new(dec!(20.0)).unwrap(), 2),
        ])))
    }

    fn body_json(response: &Response) -> Value {
        serde_json::to_value(&response.body).unwrap()
    }

    #[tokio::test]
    async fn test_receipt_wire_shape() {
        let body = br#"{"user_id":"999","items":[{"sku":"120P90","qty":2},{"sku":"43N23P","qty":1}]}"#;
        let response = handle_purchase(&transactor(), body).await;

        assert_eq!(response.status, 200);
        assert_eq!(
            body_json(&response),
            json!({
                "user_id": "999",
                "items_purchased": [{"sku": "120P90", "qty": 2}, {"sku": "43N23P", "qty": 1}],
                "total_price": 40.0
            })
        );
    }

    #[tokio::test]
    async fn test_error_bodies_and_statuses() {
        let transactor = transactor();
        let cases: Vec<(&str, u16, &str)> = vec![
            ("invalid-json", 400, "invalid JSON body"),
            (
                r#"{"user_id":"","items":[{"sku":"120P90","qty":1}]}"#,
                400,
                "user id required",
            ),
            (r#"{"user_id":"999","items":[]}"#, 400, "no items provided"),
            (r#"{"user_id":"999"}"#, 400, "no items provided"),
            (
                r#"{"user_id":"999","items":[{"sku":"UNKNOWN","qty":1}]}"#,
                400,
                "product not found or error scanning for sku: UNKNOWN",
            ),
            (
                r#"{"user_id":"999","items":[{"sku":"43N23P","qty":3}]}"#,
                400,
                "insufficient quantity for sku: 43N23P",
            ),
            (
                r#"{"user_id":"999","items":[{"qty":1}]}"#,
                400,
                "invalid JSON body",
            ),
        ];

        for (body, status, message) in cases {
            let response = handle_purchase(&transactor, body.as_bytes()).await;
            assert_eq!(response.status, status, "status for {}", message);
            assert_eq!(body_json(&response), json!({ "error": message }));
        }
    }

    #[test]
    fn test_infrastructure_errors_map_to_500() {
        use crate::error::StoreError;

        let err = CheckoutError::CommitFailed(StoreError::Backend("down".into()));
        let response = Response::from(&err);
        assert_eq!(response.status, 500);
        assert_eq!(
            response.body,
            ResponseBody::Error(ErrorBody {
                error: "transaction commit failed".into()
            })
        );
    }
}
