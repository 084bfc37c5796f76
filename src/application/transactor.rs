use crate::domain::ports::{ProductStoreBox, StoreTransaction};
use crate::domain::purchase::{PurchaseReceipt, PurchaseRequest};
use crate::error::{CheckoutError, ErrorKind, Result};
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

/// Executes multi-item purchases as single all-or-nothing store transactions.
///
/// The transactor keeps no state of its own besides the injected store, so one
/// instance can be shared (e.g. behind an `Arc`) by any number of concurrent
/// purchases. Consistency between them comes entirely from the store's row
/// locks.
pub struct PurchaseTransactor {
    store: ProductStoreBox,
}

impl PurchaseTransactor {
    /// Creates a new `PurchaseTransactor` over `store`.
    pub fn new(store: ProductStoreBox) -> Self {
        Self { store }
    }

    /// Purchases every line of `request` or nothing at all.
    ///
    /// Lines are locked in request order, each with an exclusive row lock that
    /// is held until the transaction ends. The first line that fails stops the
    /// purchase; the transaction is rolled back and that line's error returned.
    ///
    /// If the returned future is dropped mid-flight, the open transaction is
    /// dropped with it and the store discards its staged writes.
    #[tracing::instrument(skip_all, fields(user_id = %request.user_id, lines = request.items.len()))]
    pub async fn purchase(&self, request: PurchaseRequest) -> Result<PurchaseReceipt> {
        if let Err(e) = request.validate() {
            debug!(error = %e, "purchase rejected before opening a transaction");
            return Err(e);
        }

        let mut txn = self.store.begin().await.map_err(|e| {
            error!(error = %e, "could not start transaction");
            CheckoutError::TransactionStart(e)
        })?;

        let applied = Self::apply_lines(&mut txn, &request).await;
        let total_price = match applied {
            Ok(total) => total,
            Err(e) => {
                Self::abort(txn).await;
                match e.kind() {
                    ErrorKind::Infrastructure => error!(error = %e, "purchase failed"),
                    _ => warn!(error = %e, "purchase rejected"),
                }
                return Err(e);
            }
        };

        txn.commit().await.map_err(|e| {
            // The store may or may not have applied the batch; nothing to do but report it.
            error!(error = %e, "transaction commit failed");
            CheckoutError::CommitFailed(e)
        })?;

        info!(%total_price, "purchase committed");
        Ok(PurchaseReceipt {
            user_id: request.user_id,
            items_purchased: request.items,
            total_price,
        })
    }

    /// Locks, checks and decrements each line, returning the running total.
    async fn apply_lines(
        txn: &mut Box<dyn StoreTransaction>,
        request: &PurchaseRequest,
    ) -> Result<Decimal> {
        let mut total = Decimal::ZERO;

        for item in &request.items {
            let row = txn
                .lock_for_update(&item.sku)
                .await
                .map_err(|e| CheckoutError::ProductNotFound {
                    sku: item.sku.clone(),
                    source: Some(e),
                })?
                .ok_or_else(|| CheckoutError::ProductNotFound {
                    sku: item.sku.clone(),
                    source: None,
                })?;
            debug!(sku = %item.sku, available = row.qty, requested = item.qty, "row locked");

            if row.qty < item.qty {
                return Err(CheckoutError::InsufficientStock {
                    sku: item.sku.clone(),
                    requested: item.qty,
                    available: row.qty,
                });
            }

            txn.decrement_quantity(&item.sku, item.qty)
                .await
                .map_err(|e| CheckoutError::StoreWriteFailed {
                    sku: item.sku.clone(),
                    source: e,
                })?;

            total = row
                .price
                .line_total(item.qty)
                .and_then(|line| total.checked_add(line))
                .ok_or_else(|| CheckoutError::TotalOverflow {
                    sku: item.sku.clone(),
                })?;
        }

        Ok(total)
    }

    async fn abort(txn: Box<dyn StoreTransaction>) {
        if let Err(e) = txn.rollback().await {
            error!(error = %e, "rollback failed, ignoring");
        }
    }
}
