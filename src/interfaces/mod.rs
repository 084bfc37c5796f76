//! Edges of the crate: JSON transport shaping and CSV catalog I/O.

pub mod csv;
pub mod json;
