use thiserror::Error;

/// Failures reported by a [`ProductStore`](crate::domain::ports::ProductStore) backend.
///
/// These never reach callers directly; the transactor wraps them in the
/// [`CheckoutError`] variant matching the step that failed.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("timed out waiting for row lock on sku {0}")]
    LockTimeout(String),
    #[error("row for sku {0} is not locked by this transaction")]
    NotLocked(String),
    #[error("conditional decrement rejected for sku {sku}: requested {requested}, available {available}")]
    ConditionFailed {
        sku: String,
        requested: u32,
        available: u32,
    },
    #[error("sku {0} already exists")]
    DuplicateSku(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Coarse classification of a [`CheckoutError`], used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any store interaction.
    Validation,
    NotFound,
    BusinessRule,
    /// Store or environment trouble, not caller error.
    Infrastructure,
}

impl ErrorKind {
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Validation | ErrorKind::NotFound | ErrorKind::BusinessRule => 400,
            ErrorKind::Infrastructure => 500,
        }
    }
}

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("user id required")]
    MissingUser,
    #[error("no items provided")]
    EmptyOrder,
    #[error("invalid JSON body")]
    InvalidBody(#[source] serde_json::Error),
    #[error("quantity must be positive for sku: {sku}")]
    InvalidQuantity { sku: String },
    #[error("price must not be negative: {0}")]
    InvalidPrice(rust_decimal::Decimal),
    #[error("product not found or error scanning for sku: {sku}")]
    ProductNotFound {
        sku: String,
        source: Option<StoreError>,
    },
    #[error("insufficient quantity for sku: {sku}")]
    InsufficientStock {
        sku: String,
        requested: u32,
        available: u32,
    },
    #[error("total price out of range at sku: {sku}")]
    TotalOverflow { sku: String },
    #[error("could not start transaction")]
    TransactionStart(#[source] StoreError),
    #[error("failed to update quantity for sku: {sku}")]
    StoreWriteFailed { sku: String, source: StoreError },
    #[error("transaction commit failed")]
    CommitFailed(#[source] StoreError),
    #[error("unable to add new product")]
    ProductAdd { sku: String, source: StoreError },
    #[error("error with fetching products")]
    ProductList(#[source] StoreError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CheckoutError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckoutError::MissingUser
            | CheckoutError::EmptyOrder
            | CheckoutError::InvalidBody(_)
            | CheckoutError::InvalidQuantity { .. }
            | CheckoutError::InvalidPrice(_)
            | CheckoutError::TotalOverflow { .. } => ErrorKind::Validation,
            CheckoutError::ProductNotFound { .. } => ErrorKind::NotFound,
            CheckoutError::InsufficientStock { .. } | CheckoutError::ProductAdd { .. } => {
                ErrorKind::BusinessRule
            }
            CheckoutError::TransactionStart(_)
            | CheckoutError::StoreWriteFailed { .. }
            | CheckoutError::CommitFailed(_)
            | CheckoutError::ProductList(_)
            | CheckoutError::Csv(_)
            | CheckoutError::Io(_) => ErrorKind::Infrastructure,
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckoutError>;
