#![allow(dead_code)]

use async_trait::async_trait;
use checkout::domain::ports::{LockedRow, ProductStore, StoreTransaction};
use checkout::domain::product::{Price, Product};
use checkout::domain::purchase::{PurchaseLineItem, PurchaseRequest};
use checkout::error::StoreError;
use checkout::infrastructure::in_memory::InMemoryProductStore;
use rust_decimal_macros::dec;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// Every interaction the transactor has with the store, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Begin,
    Lock(String),
    Decrement(String, u32),
    Commit,
    Rollback,
    /// Transaction dropped without commit or rollback.
    Dropped,
}

pub fn lock(sku: &str) -> Call {
    Call::Lock(sku.to_string())
}

pub fn decrement(sku: &str, qty: u32) -> Call {
    Call::Decrement(sku.to_string(), qty)
}

/// Which store operations should fail.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub begin: bool,
    pub lock: Option<String>,
    pub decrement: Option<String>,
    pub commit: bool,
    pub rollback: bool,
}

/// A store double that records every call and injects failures, backed by a
/// real [`InMemoryProductStore`] so row state can still be checked.
#[derive(Clone)]
pub struct ScriptedStore {
    pub inner: InMemoryProductStore,
    calls: Arc<Mutex<Vec<Call>>>,
    faults: Faults,
}

impl ScriptedStore {
    pub fn new(products: Vec<Product>) -> Self {
        Self::with_faults(products, Faults::default())
    }

    pub fn with_faults(products: Vec<Product>, faults: Faults) -> Self {
        Self {
            inner: InMemoryProductStore::from_products(products),
            calls: Arc::default(),
            faults,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub async fn qty(&self, sku: &str) -> u32 {
        self.inner.get(sku).await.unwrap().unwrap().qty
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ProductStore for ScriptedStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
        self.record(Call::Begin);
        if self.faults.begin {
            return Err(StoreError::Backend("connection refused".into()));
        }
        Ok(Box::new(ScriptedTransaction {
            inner: Some(self.inner.begin().await?),
            calls: Arc::clone(&self.calls),
            faults: self.faults.clone(),
        }))
    }

    async fn insert(&self, product: Product) -> Result<(), StoreError> {
        self.inner.insert(product).await
    }

    async fn get(&self, sku: &str) -> Result<Option<Product>, StoreError> {
        self.inner.get(sku).await
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        self.inner.list().await
    }
}

struct ScriptedTransaction {
    inner: Option<Box<dyn StoreTransaction>>,
    calls: Arc<Mutex<Vec<Call>>>,
    faults: Faults,
}

impl ScriptedTransaction {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn inner(&mut self) -> Result<&mut Box<dyn StoreTransaction>, StoreError> {
        self.inner
            .as_mut()
            .ok_or_else(|| StoreError::Backend("transaction already finished".into()))
    }
}

#[async_trait]
impl StoreTransaction for ScriptedTransaction {
    async fn lock_for_update(&mut self, sku: &str) -> Result<Option<LockedRow>, StoreError> {
        self.record(lock(sku));
        if self.faults.lock.as_deref() == Some(sku) {
            return Err(StoreError::Backend("scan failed".into()));
        }
        self.inner()?.lock_for_update(sku).await
    }

    async fn decrement_quantity(&mut self, sku: &str, amount: u32) -> Result<(), StoreError> {
        self.record(decrement(sku, amount));
        if self.faults.decrement.as_deref() == Some(sku) {
            return Err(StoreError::Backend("write failed".into()));
        }
        self.inner()?.decrement_quantity(sku, amount).await
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        self.record(Call::Commit);
        let inner = self
            .inner
            .take()
            .ok_or_else(|| StoreError::Backend("transaction already finished".into()))?;
        if self.faults.commit {
            // Inner transaction is dropped, so nothing is applied.
            return Err(StoreError::Backend("commit rejected".into()));
        }
        inner.commit().await
    }

    async fn rollback(mut self: Box<Self>) -> Result<(), StoreError> {
        self.record(Call::Rollback);
        let inner = self.inner.take();
        if self.faults.rollback {
            return Err(StoreError::Backend("rollback failed".into()));
        }
        match inner {
            Some(inner) => inner.rollback().await,
            None => Ok(()),
        }
    }
}

impl Drop for ScriptedTransaction {
    fn drop(&mut self) {
        if self.inner.is_some() {
            self.record(Call::Dropped);
        }
    }
}

/// Widget 120P90 at 10.0 x5 and gadget 43N23P at 20.0 x2.
pub fn catalog() -> Vec<Product> {
    vec![
        Product::new("120P90", "Widget", Price::new(dec!(10.0)).unwrap(), 5),
        Product::new("43N23P", "Gadget", Price::new(dec!(20.0)).unwrap(), 2),
    ]
}

pub fn request(user_id: &str, lines: &[(&str, u32)]) -> PurchaseRequest {
    PurchaseRequest::new(
        user_id,
        lines
            .iter()
            .map(|(sku, qty)| PurchaseLineItem::new(*sku, *qty))
            .collect(),
    )
}

pub fn catalog_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "sku,name,price,qty").unwrap();
    writeln!(file, "120P90,Widget,10.0,5").unwrap();
    writeln!(file, "43N23P,Gadget,20.0,2").unwrap();
    file.flush().unwrap();
    file
}

pub fn requests_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}
