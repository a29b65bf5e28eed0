//! Domain error types.

use common::OrderId;
use record_store::StoreError;
use thiserror::Error;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed or out-of-range input.
    #[error("validation error: {0}")]
    Validation(String),

    /// No order exists with the given id.
    #[error("Order with ID {0} not found")]
    NotFound(OrderId),

    /// The record store failed.
    #[error("record store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for DomainError {
    /// Promotes the store's existence failure to the domain's NotFound;
    /// everything else stays an upstream store error.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => DomainError::NotFound(id),
            other => DomainError::Store(other),
        }
    }
}
