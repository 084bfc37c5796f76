use super::row_lock::{RowGuard, RowLocks};
use crate::config::StoreConfig;
use crate::domain::ports::{LockedRow, ProductStore, StoreTransaction};
use crate::domain::product::{Price, Product};
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type ProductTable = Arc<RwLock<HashMap<String, Product>>>;

/// A thread-safe in-memory product table.
///
/// Committed rows live in `Arc<RwLock<HashMap<String, Product>>>`; purchase
/// transactions serialize on per-row locks and only touch the table when they
/// commit. Clones share the same table.
#[derive(Clone)]
pub struct InMemoryProductStore {
    products: ProductTable,
    locks: RowLocks,
}

impl InMemoryProductStore {
    /// Creates a new, empty store with the default lock-wait timeout.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            products: ProductTable::default(),
            locks: RowLocks::new(config.lock_wait_timeout),
        }
    }

    /// Creates a store pre-populated with `products`. Later duplicates of a SKU win.
    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        let store = Self::new();
        let table = products
            .into_iter()
            .map(|product| (product.sku.clone(), product))
            .collect();
        Self {
            products: Arc::new(RwLock::new(table)),
            ..store
        }
    }
}

impl Default for InMemoryProductStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
        Ok(Box::new(InMemoryTransaction {
            products: Arc::clone(&self.products),
            locks: self.locks.clone(),
            held: HashMap::new(),
        }))
    }

    async fn insert(&self, product: Product) -> Result<(), StoreError> {
        let mut products = self.products.write().await;
        if products.contains_key(&product.sku) {
            return Err(StoreError::DuplicateSku(product.sku));
        }
        products.insert(product.sku.clone(), product);
        Ok(())
    }

    async fn get(&self, sku: &str) -> Result<Option<Product>, StoreError> {
        let products = self.products.read().await;
        Ok(products.get(sku).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().await;
        let mut all: Vec<Product> = products.values().cloned().collect();
        all.sort_by(|a, b| a.sku.cmp(&b.sku));
        Ok(all)
    }
}

/// A row this transaction holds, with its staged quantity.
struct HeldRow {
    _guard: RowGuard,
    price: Price,
    qty: u32,
    dirty: bool,
}

/// Transaction over an [`InMemoryProductStore`].
///
/// Dropping it discards the staged quantities and releases every held row,
/// which is all a rollback needs to do here.
pub struct InMemoryTransaction {
    products: ProductTable,
    locks: RowLocks,
    held: HashMap<String, HeldRow>,
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn lock_for_update(&mut self, sku: &str) -> Result<Option<LockedRow>, StoreError> {
        if let Some(row) = self.held.get(sku) {
            return Ok(Some(LockedRow {
                price: row.price,
                qty: row.qty,
            }));
        }

        if !self.products.read().await.contains_key(sku) {
            return Ok(None);
        }

        let guard = self.locks.acquire(sku).await?;
        // Re-read under the lock so we see whatever the previous holder committed.
        let Some(product) = self.products.read().await.get(sku).cloned() else {
            return Ok(None);
        };

        let locked = LockedRow {
            price: product.price,
            qty: product.qty,
        };
        self.held.insert(
            sku.to_string(),
            HeldRow {
                _guard: guard,
                price: product.price,
                qty: product.qty,
                dirty: false,
            },
        );
        Ok(Some(locked))
    }

    async fn decrement_quantity(&mut self, sku: &str, amount: u32) -> Result<(), StoreError> {
        let row = self
            .held
            .get_mut(sku)
            .ok_or_else(|| StoreError::NotLocked(sku.to_string()))?;

        row.qty = row
            .qty
            .checked_sub(amount)
            .ok_or_else(|| StoreError::ConditionFailed {
                sku: sku.to_string(),
                requested: amount,
                available: row.qty,
            })?;
        row.dirty = true;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut products = self.products.write().await;
        for (sku, row) in self.held.iter().filter(|(_, row)| row.dirty) {
            let product = products
                .get_mut(sku)
                .ok_or_else(|| StoreError::Backend(format!("row {} vanished during commit", sku)))?;
            product.qty = row.qty;
        }
        // Row guards drop with `self`, after the table already holds the new values.
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
