//! The persisted order record and its sparse-update form.

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

/// Namespace prefix for order keys in the backing store.
pub const KEY_PREFIX: &str = "ORDER#";

/// Derives the storage key for an order id.
///
/// The store holds one item per order under this single key.
pub fn storage_key(id: OrderId) -> String {
    format!("{KEY_PREFIX}{id}")
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Returns the status name as stored and serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parses a stored status name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted order record.
///
/// `total_price` is derived (`quantity × unit_price`) and holds at rest;
/// `created_at` is set once, `updated_at` advances on every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_file_size: Option<u64>,
}

impl Order {
    /// Returns the storage key for this record.
    pub fn key(&self) -> String {
        storage_key(self.id)
    }
}

/// Sparse update for an order record.
///
/// Enumerates only the updatable fields; identity and the creation timestamp
/// cannot be expressed here at all, so a patch can never overwrite them.
/// `total_price` is set by the caller when quantity or unit price changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub product_name: Option<String>,
    pub quantity: Option<u32>,
    pub unit_price: Option<f64>,
    pub total_price: Option<f64>,
    pub status: Option<OrderStatus>,
    pub shipping_address: Option<String>,
    pub pdf_file_name: Option<String>,
    pub pdf_file_path: Option<String>,
    pub pdf_file_size: Option<u64>,
}

impl OrderPatch {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.customer_name.is_none()
            && self.customer_email.is_none()
            && self.product_name.is_none()
            && self.quantity.is_none()
            && self.unit_price.is_none()
            && self.total_price.is_none()
            && self.status.is_none()
            && self.shipping_address.is_none()
            && self.pdf_file_name.is_none()
            && self.pdf_file_path.is_none()
            && self.pdf_file_size.is_none()
    }

    /// Merges this patch into a record, touching `updated_at`.
    ///
    /// Fields not present in the patch keep their prior value.
    pub fn apply_to(&self, order: &mut Order, now: DateTime<Utc>) {
        if let Some(v) = &self.customer_name {
            order.customer_name = v.clone();
        }
        if let Some(v) = &self.customer_email {
            order.customer_email = v.clone();
        }
        if let Some(v) = &self.product_name {
            order.product_name = v.clone();
        }
        if let Some(v) = self.quantity {
            order.quantity = v;
        }
        if let Some(v) = self.unit_price {
            order.unit_price = v;
        }
        if let Some(v) = self.total_price {
            order.total_price = v;
        }
        if let Some(v) = self.status {
            order.status = v;
        }
        if let Some(v) = &self.shipping_address {
            order.shipping_address = Some(v.clone());
        }
        if let Some(v) = &self.pdf_file_name {
            order.pdf_file_name = Some(v.clone());
        }
        if let Some(v) = &self.pdf_file_path {
            order.pdf_file_path = Some(v.clone());
        }
        if let Some(v) = self.pdf_file_size {
            order.pdf_file_size = Some(v);
        }
        order.updated_at = now;
    }
}
