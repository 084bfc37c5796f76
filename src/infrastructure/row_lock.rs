use crate::error::StoreError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Exclusive hold on one product row. Dropping it releases the row.
pub type RowGuard = OwnedMutexGuard<()>;

/// Per-SKU exclusive locks, the in-process equivalent of `SELECT ... FOR UPDATE`.
///
/// Waiters on a row are served in FIFO order (tokio's mutex is fair), so
/// contending purchases against one SKU are totally ordered. Rows are never
/// deleted, so the table only grows with the catalog.
#[derive(Clone, Default)]
pub struct RowLocks {
    rows: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
    wait_timeout: Option<Duration>,
}

impl RowLocks {
    pub fn new(wait_timeout: Option<Duration>) -> Self {
        Self {
            rows: Arc::default(),
            wait_timeout,
        }
    }

    /// Waits for the row lock on `sku`, giving up after the configured timeout.
    ///
    /// Cancel-safe: dropping the returned future before it resolves leaves the
    /// row untouched.
    pub async fn acquire(&self, sku: &str) -> Result<RowGuard, StoreError> {
        let row = {
            let mut rows = self.rows.lock().await;
            rows.entry(sku.to_string()).or_default().clone()
        };

        match self.wait_timeout {
            Some(limit) => tokio::time::timeout(limit, row.lock_owned())
                .await
                .map_err(|_| {
                    tracing::warn!(sku, timeout_ms = limit.as_millis() as u64, "row lock wait timed out");
                    StoreError::LockTimeout(sku.to_string())
                }),
            None => Ok(row.lock_owned().await),
        }
    }
}
