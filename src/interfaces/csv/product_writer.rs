use crate::domain::product::Product;
use crate::error::Result;
use std::io::Write;

/// Writes catalog rows as CSV with a `sku,name,price,qty` header.
pub struct ProductWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ProductWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_products(&mut self, products: impl IntoIterator<Item = Product>) -> Result<()> {
        let mut wrote_any = false;
        for product in products {
            self.writer.serialize(product)?;
            wrote_any = true;
        }
        if !wrote_any {
            // serialize() emits the header with the first row; keep it for an empty catalog too.
            self.writer.write_record(["sku", "name", "price", "qty"])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
