//! Domain types and the storage port the purchase engine is written against.

pub mod ports;
pub mod product;
pub mod purchase;
