use async_trait::async_trait;
use common::OrderId;

use crate::record::{Order, OrderPatch};
use crate::Result;

/// Core trait for order record stores.
///
/// A record store persists exactly one item per order under a key derived
/// from the order id. All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Writes the full record under its derived key.
    ///
    /// Overwrites any existing value unconditionally; last writer wins,
    /// no version or conditional check.
    async fn put(&self, order: &Order) -> Result<()>;

    /// Point lookup by id.
    ///
    /// A missing key is `Ok(None)`, never an error.
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;

    /// Returns every record under the order namespace prefix.
    ///
    /// No pagination: callers must assume the namespace fits in a single
    /// bounded response.
    async fn list_all(&self) -> Result<Vec<Order>>;

    /// Applies a sparse update to an existing record.
    ///
    /// The write is conditional on the record existing; an absent id fails
    /// with [`StoreError::NotFound`](crate::StoreError::NotFound) without
    /// writing. Every field present in the patch is set, `updated_at` is
    /// always set to the current time, and the fully merged record is
    /// returned. Callers supply an already-recomputed `total_price` when
    /// quantity or unit price is among the updated fields.
    async fn apply_patch(&self, id: OrderId, patch: OrderPatch) -> Result<Order>;

    /// Deletes the record, conditional on it existing.
    ///
    /// Deleting an absent id fails with
    /// [`StoreError::NotFound`](crate::StoreError::NotFound). Hard delete,
    /// no tombstone.
    async fn delete(&self, id: OrderId) -> Result<()>;
}
