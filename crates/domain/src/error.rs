//! Domain error types.

use record_store::{OrderStatus, StoreError};
use thiserror::Error;

/// Errors that can occur during workflow and catalog operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A request failed validation before any mutation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The principal's role is not allowed to perform this operation.
    #[error("access denied: only {allowed} may perform this operation")]
    Forbidden { allowed: String },

    /// The order does not exist — or belongs to someone else, which is
    /// deliberately indistinguishable.
    #[error("order not found")]
    OrderNotFound,

    /// The shop does not exist — or belongs to someone else.
    #[error("shop not found")]
    ShopNotFound,

    /// The shop has not been approved by an admin yet.
    #[error("shop is not approved yet")]
    ShopNotApproved,

    /// The product does not exist — or belongs to someone else.
    #[error("product not found")]
    ProductNotFound,

    /// The requested status change is not allowed from the current state.
    #[error("order cannot move from {from} to {to}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// An error occurred in the record store.
    #[error(transparent)]
    Store(#[from] StoreError),
}
