use super::product::{Price, Product};
use crate::error::StoreError;
use async_trait::async_trait;

/// Snapshot of a product row taken under its exclusive lock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockedRow {
    pub price: Price,
    pub qty: u32,
}

/// Product table keyed by unique SKU.
///
/// Purchases go through [`ProductStore::begin`]; the catalog operations are
/// single-statement and run outside any purchase transaction.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError>;
    async fn insert(&self, product: Product) -> Result<(), StoreError>;
    /// Reads the last committed state of one row, without locking it.
    async fn get(&self, sku: &str) -> Result<Option<Product>, StoreError>;
    async fn list(&self) -> Result<Vec<Product>, StoreError>;
}

/// An open transaction against a [`ProductStore`].
///
/// Writes are staged and become visible to other transactions only on
/// [`commit`](StoreTransaction::commit). Row locks are held until the
/// transaction ends.
///
/// Implementations must roll back when dropped without a commit: staged writes
/// are discarded and every row lock is released. This is what keeps a
/// cancelled purchase from leaving partial decrements behind.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Locks the row for `sku` exclusively and returns its current values.
    ///
    /// Blocks while another transaction holds the lock. Locking a row this
    /// transaction already holds returns immediately and reflects its own
    /// staged writes. `Ok(None)` means no such SKU.
    async fn lock_for_update(&mut self, sku: &str) -> Result<Option<LockedRow>, StoreError>;

    /// Stages `qty -= amount` for a row locked by this transaction.
    ///
    /// Fails without staging anything if the row would go negative.
    async fn decrement_quantity(&mut self, sku: &str, amount: u32) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

pub type ProductStoreBox = Box<dyn ProductStore>;
