use common::ProductId;
use thiserror::Error;

/// Errors that can occur when interacting with the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The product does not exist.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// The product exists but is unpublished or flagged unavailable.
    #[error("product {0} is not available for purchase")]
    ProductUnavailable(ProductId),

    /// A reservation asked for more stock than the product holds.
    #[error(
        "insufficient stock for product {product_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: ProductId,
        available: u32,
        requested: u32,
    },

    /// A registration reused an email address.
    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    /// A stored row could not be decoded into a record.
    #[error("record decode error: {0}")]
    Decode(String),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for record store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
