use super::row_lock::{RowGuard, RowLocks};
use crate::config::StoreConfig;
use crate::domain::ports::{LockedRow, ProductStore, StoreTransaction};
use crate::domain::product::Product;
use crate::error::StoreError;
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options, WriteBatch};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Column Family holding one JSON-encoded [`Product`] per SKU.
pub const CF_PRODUCTS: &str = "products";

/// A persistent product table backed by RocksDB.
///
/// RocksDB has no row locks of its own, so purchase transactions serialize on
/// the same [`RowLocks`] the in-memory store uses and publish their writes as a
/// single atomic `WriteBatch` on commit.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    locks: RowLocks,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "products" column family exists.
    pub fn open<P: AsRef<Path>>(path: P, config: StoreConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_products = ColumnFamilyDescriptor::new(CF_PRODUCTS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_products])?;

        Ok(Self {
            db: Arc::new(db),
            locks: RowLocks::new(config.lock_wait_timeout),
        })
    }
}

fn products_cf(db: &DB) -> Result<&ColumnFamily, StoreError> {
    db.cf_handle(CF_PRODUCTS)
        .ok_or_else(|| StoreError::Backend("Products column family not found".to_string()))
}

fn read_product(db: &DB, sku: &str) -> Result<Option<Product>, StoreError> {
    let cf = products_cf(db)?;
    match db.get_cf(cf, sku.as_bytes())? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

#[async_trait]
impl ProductStore for RocksDBStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
        Ok(Box::new(RocksDBTransaction {
            db: Arc::clone(&self.db),
            locks: self.locks.clone(),
            held: HashMap::new(),
        }))
    }

    async fn insert(&self, product: Product) -> Result<(), StoreError> {
        // Hold the row so two concurrent inserts of one SKU cannot both pass the check.
        let _guard = self.locks.acquire(&product.sku).await?;
        if read_product(&self.db, &product.sku)?.is_some() {
            return Err(StoreError::DuplicateSku(product.sku));
        }

        let cf = products_cf(&self.db)?;
        let value = serde_json::to_vec(&product)?;
        self.db.put_cf(cf, product.sku.as_bytes(), value)?;
        Ok(())
    }

    async fn get(&self, sku: &str) -> Result<Option<Product>, StoreError> {
        read_product(&self.db, sku)
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let cf = products_cf(&self.db)?;

        let mut products = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            products.push(serde_json::from_slice(&value)?);
        }
        // Keys are SKU bytes, so iteration order is already SKU order.
        Ok(products)
    }
}

struct HeldRow {
    _guard: RowGuard,
    product: Product,
    dirty: bool,
}

/// Transaction over a [`RocksDBStore`]. Nothing reaches disk before commit,
/// so dropping it is a complete rollback.
pub struct RocksDBTransaction {
    db: Arc<DB>,
    locks: RowLocks,
    held: HashMap<String, HeldRow>,
}

#[async_trait]
impl StoreTransaction for RocksDBTransaction {
    async fn lock_for_update(&mut self, sku: &str) -> Result<Option<LockedRow>, StoreError> {
        if let Some(row) = self.held.get(sku) {
            return Ok(Some(LockedRow {
                price: row.product.price,
                qty: row.product.qty,
            }));
        }

        if read_product(&self.db, sku)?.is_none() {
            return Ok(None);
        }

        let guard = self.locks.acquire(sku).await?;
        let Some(product) = read_product(&self.db, sku)? else {
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
                product,
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

        row.product.qty =
            row.product
                .qty
                .checked_sub(amount)
                .ok_or_else(|| StoreError::ConditionFailed {
                    sku: sku.to_string(),
                    requested: amount,
                    available: row.product.qty,
                })?;
        row.dirty = true;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let cf = products_cf(&self.db)?;

        let mut batch = WriteBatch::default();
        for (sku, row) in self.held.iter().filter(|(_, row)| row.dirty) {
            batch.put_cf(cf, sku.as_bytes(), serde_json::to_vec(&row.product)?);
        }
        self.db.write(batch)?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
