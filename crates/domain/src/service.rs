//! Order service providing the business rules over the record store.

use chrono::Utc;
use common::OrderId;
use record_store::{Order, OrderPatch, RecordStore};

use crate::error::DomainError;
use crate::input::{CreateOrder, UpdateOrder};

/// Service for managing orders.
///
/// Layers defaults, the derived total, timestamps, and existence handling
/// over a [`RecordStore`].
pub struct OrderService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates an order with a fresh id.
    ///
    /// Defaults status to pending, derives the total, and stamps both
    /// timestamps with the same instant.
    #[tracing::instrument(skip(self, input))]
    pub async fn create(&self, input: CreateOrder) -> Result<Order, DomainError> {
        input.validate()?;

        let now = Utc::now();
        let order = Order {
            id: OrderId::new(),
            total_price: f64::from(input.quantity) * input.unit_price,
            customer_name: input.customer_name,
            customer_email: input.customer_email,
            product_name: input.product_name,
            quantity: input.quantity,
            unit_price: input.unit_price,
            status: input.status.unwrap_or_default(),
            shipping_address: input.shipping_address,
            created_at: now,
            updated_at: now,
            pdf_file_name: None,
            pdf_file_path: None,
            pdf_file_size: None,
        };

        self.store.put(&order).await?;
        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(id = %order.id, "order created");
        Ok(order)
    }

    /// Returns every stored order.
    #[tracing::instrument(skip(self))]
    pub async fn find_all(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.store.list_all().await?)
    }

    /// Loads an order by id, failing with NotFound for unknown ids.
    #[tracing::instrument(skip(self))]
    pub async fn find_one(&self, id: OrderId) -> Result<Order, DomainError> {
        self.store
            .get(id)
            .await?
            .ok_or(DomainError::NotFound(id))
    }

    /// Applies a partial update.
    ///
    /// When quantity or unit price is among the supplied fields the total is
    /// recomputed from the new value where supplied and the stored value
    /// otherwise. Returns the fully merged record.
    #[tracing::instrument(skip(self, input))]
    pub async fn update(&self, id: OrderId, input: UpdateOrder) -> Result<Order, DomainError> {
        input.validate()?;

        let existing = self.find_one(id).await?;

        let total_price = input.affects_total().then(|| {
            let quantity = input.quantity.unwrap_or(existing.quantity);
            let unit_price = input.unit_price.unwrap_or(existing.unit_price);
            f64::from(quantity) * unit_price
        });

        let patch = OrderPatch {
            customer_name: input.customer_name,
            customer_email: input.customer_email,
            product_name: input.product_name,
            quantity: input.quantity,
            unit_price: input.unit_price,
            total_price,
            status: input.status,
            shipping_address: input.shipping_address,
            ..OrderPatch::default()
        };

        let updated = self.store.apply_patch(id, patch).await?;
        metrics::counter!("orders_updated_total").increment(1);
        tracing::info!(%id, "order updated");
        Ok(updated)
    }

    /// Deletes an order, failing with NotFound for unknown ids.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: OrderId) -> Result<(), DomainError> {
        self.store.delete(id).await?;
        metrics::counter!("orders_deleted_total").increment(1);
        tracing::info!(%id, "order deleted");
        Ok(())
    }
}
