//! Application layer: the purchase transactor and the catalog service.
//!
//! Both are written against the [`ProductStore`](crate::domain::ports::ProductStore)
//! port and receive their store by injection, so any backend (or a test double)
//! can sit underneath.

pub mod catalog;
pub mod transactor;
