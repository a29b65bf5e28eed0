use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::OrderId;
use tokio::sync::RwLock;

use crate::record::{Order, OrderPatch};
use crate::store::RecordStore;
use crate::{Result, StoreError};

/// In-memory record store.
///
/// Serves as the local default backend and as the reference implementation
/// for tests; provides the same interface as the DynamoDB implementation.
/// The patch and delete paths run inside a single write-lock critical
/// section, matching the conditional-write semantics of the remote store.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryRecordStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records stored.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Clears all records.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn put(&self, order: &Order) -> Result<()> {
        self.records.write().await.insert(order.id, order.clone());
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Order>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn apply_patch(&self, id: OrderId, patch: OrderPatch) -> Result<Order> {
        let mut records = self.records.write().await;
        let order = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        patch.apply_to(order, Utc::now());
        Ok(order.clone())
    }

    async fn delete(&self, id: OrderId) -> Result<()> {
        let mut records = self.records.write().await;
        records.remove(&id).ok_or(StoreError::NotFound(id))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::OrderStatus;

    fn create_test_order(quantity: u32, unit_price: f64) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::new(),
            customer_name: "John Doe".to_string(),
            customer_email: "john@example.com".to_string(),
            product_name: "Wheelchair".to_string(),
            quantity,
            unit_price,
            total_price: f64::from(quantity) * unit_price,
            status: OrderStatus::Pending,
            shipping_address: None,
            created_at: now,
            updated_at: now,
            pdf_file_name: None,
            pdf_file_path: None,
            pdf_file_size: None,
        }
    }

    #[tokio::test]
    async fn put_and_get_roundtrip() {
        let store = InMemoryRecordStore::new();
        let order = create_test_order(2, 100.0);

        store.put(&order).await.unwrap();

        let loaded = store.get(order.id).await.unwrap();
        assert_eq!(loaded, Some(order));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = InMemoryRecordStore::new();
        let result = store.get(OrderId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn put_overwrites_existing_record() {
        let store = InMemoryRecordStore::new();
        let mut order = create_test_order(1, 50.0);
        store.put(&order).await.unwrap();

        order.quantity = 3;
        order.total_price = 150.0;
        store.put(&order).await.unwrap();

        let loaded = store.get(order.id).await.unwrap().unwrap();
        assert_eq!(loaded.quantity, 3);
        assert_eq!(store.record_count().await, 1);
    }

    #[tokio::test]
    async fn list_all_returns_every_record() {
        let store = InMemoryRecordStore::new();
        let a = create_test_order(1, 10.0);
        let b = create_test_order(2, 20.0);
        store.put(&a).await.unwrap();
        store.put(&b).await.unwrap();

        let mut ids: Vec<_> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        ids.sort_by_key(|id| id.to_string());
        let mut expected = vec![a.id, b.id];
        expected.sort_by_key(|id| id.to_string());
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn apply_patch_merges_and_advances_updated_at() {
        let store = InMemoryRecordStore::new();
        let order = create_test_order(2, 100.0);
        store.put(&order).await.unwrap();

        let patch = OrderPatch {
            shipping_address: Some("123 Main St".to_string()),
            ..OrderPatch::default()
        };
        let updated = store.apply_patch(order.id, patch).await.unwrap();

        assert_eq!(updated.shipping_address.as_deref(), Some("123 Main St"));
        assert_eq!(updated.quantity, 2);
        assert_eq!(updated.unit_price, 100.0);
        assert_eq!(updated.total_price, 200.0);
        assert_eq!(updated.created_at, order.created_at);
        assert!(updated.updated_at >= order.updated_at);
    }

    #[tokio::test]
    async fn apply_patch_on_absent_id_is_not_found() {
        let store = InMemoryRecordStore::new();
        let result = store
            .apply_patch(OrderId::new(), OrderPatch::default())
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert_eq!(store.record_count().await, 0);
    }

    #[tokio::test]
    async fn delete_then_get_returns_none() {
        let store = InMemoryRecordStore::new();
        let order = create_test_order(1, 5.0);
        store.put(&order).await.unwrap();

        store.delete(order.id).await.unwrap();

        assert!(store.get(order.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_on_absent_id_is_not_found() {
        let store = InMemoryRecordStore::new();
        let result = store.delete(OrderId::new()).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
