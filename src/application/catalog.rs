use crate::domain::ports::ProductStoreBox;
use crate::domain::product::Product;
use crate::error::{CheckoutError, Result};
use tracing::{info, warn};

/// Thin read/insert access to the product table, outside any purchase.
pub struct Catalog {
    store: ProductStoreBox,
}

impl Catalog {
    pub fn new(store: ProductStoreBox) -> Self {
        Self { store }
    }

    /// All products, ordered by SKU.
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        self.store.list().await.map_err(CheckoutError::ProductList)
    }

    /// Looks up one product by SKU. Takes no row lock.
    pub async fn product(&self, sku: &str) -> Result<Option<Product>> {
        self.store.get(sku).await.map_err(CheckoutError::ProductList)
    }

    /// Adds a new product. Fails if the SKU already exists.
    pub async fn add_product(&self, product: Product) -> Result<()> {
        let sku = product.sku.clone();
        match self.store.insert(product).await {
            Ok(()) => {
                info!(%sku, "product added");
                Ok(())
            }
            Err(source) => {
                warn!(%sku, error = %source, "unable to add product");
                Err(CheckoutError::ProductAdd { sku, source })
            }
        }
    }
}
