//! Storage backends implementing [`ProductStore`](crate::domain::ports::ProductStore).

pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod row_lock;
