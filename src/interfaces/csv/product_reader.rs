use crate::domain::product::Product;
use crate::error::{CheckoutError, Result};
use std::io::Read;

/// Reads catalog rows (`sku,name,price,qty`) from a CSV source.
///
/// Wraps `csv::Reader` and yields one `Result<Product>` per record, so a bad
/// row can be reported without abandoning the rest of the file.
pub struct ProductReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ProductReader<R> {
    /// Creates a new `ProductReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes products.
    pub fn products(self) -> impl Iterator<Item = Result<Product>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(CheckoutError::from))
    }
}
