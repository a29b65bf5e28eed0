use common::OrderId;
use thiserror::Error;

/// Errors that can occur when interacting with the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists under the given order id.
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// The backing store failed or rejected the call.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored item is missing attributes or carries mistyped values.
    #[error("malformed stored record: {0}")]
    Malformed(String),
}

/// Result type for record store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
