//! DynamoDB-backed record store.
//!
//! One item per order under a single string partition key
//! `pk = "ORDER#" + id`; no sort key. Attributes carry the wire-format
//! (camelCase) field names.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use chrono::{DateTime, Utc};
use common::OrderId;
use tracing::debug;

use crate::record::{KEY_PREFIX, Order, OrderPatch, OrderStatus, storage_key};
use crate::store::RecordStore;
use crate::{Result, StoreError};

/// Record store backed by a DynamoDB table.
#[derive(Clone)]
pub struct DynamoRecordStore {
    client: Client,
    table_name: String,
}

impl DynamoRecordStore {
    /// Creates a store over an existing client and table.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Connects using the ambient AWS configuration.
    ///
    /// `endpoint_url` overrides the endpoint for local tables.
    pub async fn connect(table_name: impl Into<String>, endpoint_url: Option<&str>) -> Self {
        let base = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_dynamodb::config::Builder::from(&base);
        if let Some(url) = endpoint_url {
            builder = builder.endpoint_url(url);
        }
        Self::new(Client::from_conf(builder.build()), table_name)
    }

    /// Returns the table this store reads and writes.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl RecordStore for DynamoRecordStore {
    async fn put(&self, order: &Order) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(order)))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("put_item failed: {e}")))?;

        debug!(id = %order.id, "order record written");
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("pk", AttributeValue::S(storage_key(id)))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("get_item failed: {e}")))?;

        match output.item {
            Some(item) => Ok(Some(from_item(&item)?)),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<Order>> {
        let output = self
            .client
            .scan()
            .table_name(&self.table_name)
            .filter_expression("begins_with(pk, :prefix)")
            .expression_attribute_values(":prefix", AttributeValue::S(KEY_PREFIX.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("scan failed: {e}")))?;

        output
            .items
            .unwrap_or_default()
            .iter()
            .map(from_item)
            .collect()
    }

    async fn apply_patch(&self, id: OrderId, patch: OrderPatch) -> Result<Order> {
        let mut update = UpdateExpression::default();
        if let Some(v) = &patch.customer_name {
            update.set("customerName", AttributeValue::S(v.clone()));
        }
        if let Some(v) = &patch.customer_email {
            update.set("customerEmail", AttributeValue::S(v.clone()));
        }
        if let Some(v) = &patch.product_name {
            update.set("productName", AttributeValue::S(v.clone()));
        }
        if let Some(v) = patch.quantity {
            update.set("quantity", AttributeValue::N(v.to_string()));
        }
        if let Some(v) = patch.unit_price {
            update.set("unitPrice", AttributeValue::N(v.to_string()));
        }
        if let Some(v) = patch.total_price {
            update.set("totalPrice", AttributeValue::N(v.to_string()));
        }
        if let Some(v) = patch.status {
            update.set("status", AttributeValue::S(v.as_str().to_string()));
        }
        if let Some(v) = &patch.shipping_address {
            update.set("shippingAddress", AttributeValue::S(v.clone()));
        }
        if let Some(v) = &patch.pdf_file_name {
            update.set("pdfFileName", AttributeValue::S(v.clone()));
        }
        if let Some(v) = &patch.pdf_file_path {
            update.set("pdfFilePath", AttributeValue::S(v.clone()));
        }
        if let Some(v) = patch.pdf_file_size {
            update.set("pdfFileSize", AttributeValue::N(v.to_string()));
        }
        // The mutation timestamp is set on every patch, empty or not.
        update.set("updatedAt", AttributeValue::S(Utc::now().to_rfc3339()));

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("pk", AttributeValue::S(storage_key(id)))
            .update_expression(update.expression())
            .set_expression_attribute_names(Some(update.names))
            .set_expression_attribute_values(Some(update.values))
            .condition_expression("attribute_exists(pk)")
            .return_values(ReturnValue::AllNew)
            .send()
            .await;

        match result {
            Ok(output) => {
                let attrs = output.attributes.ok_or_else(|| {
                    StoreError::Malformed("update returned no attributes".to_string())
                })?;
                debug!(%id, "order record patched");
                from_item(&attrs)
            }
            Err(err) => {
                let service = err.into_service_error();
                if service.is_conditional_check_failed_exception() {
                    Err(StoreError::NotFound(id))
                } else {
                    Err(StoreError::Backend(format!("update_item failed: {service}")))
                }
            }
        }
    }

    async fn delete(&self, id: OrderId) -> Result<()> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key("pk", AttributeValue::S(storage_key(id)))
            .condition_expression("attribute_exists(pk)")
            .send()
            .await;

        match result {
            Ok(_) => {
                debug!(%id, "order record deleted");
                Ok(())
            }
            Err(err) => {
                let service = err.into_service_error();
                if service.is_conditional_check_failed_exception() {
                    Err(StoreError::NotFound(id))
                } else {
                    Err(StoreError::Backend(format!("delete_item failed: {service}")))
                }
            }
        }
    }
}

/// Accumulates a dynamic `SET` expression from a typed patch.
///
/// Attribute names go through placeholders so reserved words (`status`)
/// are safe to set.
#[derive(Default)]
struct UpdateExpression {
    clauses: Vec<String>,
    names: HashMap<String, String>,
    values: HashMap<String, AttributeValue>,
}

impl UpdateExpression {
    fn set(&mut self, attr: &str, value: AttributeValue) {
        let idx = self.clauses.len();
        let name = format!("#f{idx}");
        let placeholder = format!(":v{idx}");
        self.clauses.push(format!("{name} = {placeholder}"));
        self.names.insert(name, attr.to_string());
        self.values.insert(placeholder, value);
    }

    fn expression(&self) -> String {
        format!("SET {}", self.clauses.join(", "))
    }
}

fn to_item(order: &Order) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();
    item.insert("pk".to_string(), AttributeValue::S(order.key()));
    item.insert("id".to_string(), AttributeValue::S(order.id.to_string()));
    item.insert(
        "customerName".to_string(),
        AttributeValue::S(order.customer_name.clone()),
    );
    item.insert(
        "customerEmail".to_string(),
        AttributeValue::S(order.customer_email.clone()),
    );
    item.insert(
        "productName".to_string(),
        AttributeValue::S(order.product_name.clone()),
    );
    item.insert(
        "quantity".to_string(),
        AttributeValue::N(order.quantity.to_string()),
    );
    item.insert(
        "unitPrice".to_string(),
        AttributeValue::N(order.unit_price.to_string()),
    );
    item.insert(
        "totalPrice".to_string(),
        AttributeValue::N(order.total_price.to_string()),
    );
    item.insert(
        "status".to_string(),
        AttributeValue::S(order.status.as_str().to_string()),
    );
    if let Some(address) = &order.shipping_address {
        item.insert(
            "shippingAddress".to_string(),
            AttributeValue::S(address.clone()),
        );
    }
    item.insert(
        "createdAt".to_string(),
        AttributeValue::S(order.created_at.to_rfc3339()),
    );
    item.insert(
        "updatedAt".to_string(),
        AttributeValue::S(order.updated_at.to_rfc3339()),
    );
    if let Some(name) = &order.pdf_file_name {
        item.insert("pdfFileName".to_string(), AttributeValue::S(name.clone()));
    }
    if let Some(path) = &order.pdf_file_path {
        item.insert("pdfFilePath".to_string(), AttributeValue::S(path.clone()));
    }
    if let Some(size) = order.pdf_file_size {
        item.insert(
            "pdfFileSize".to_string(),
            AttributeValue::N(size.to_string()),
        );
    }
    item
}

fn from_item(item: &HashMap<String, AttributeValue>) -> Result<Order> {
    let id = OrderId::parse(string_attr(item, "id")?)
        .map_err(|e| StoreError::Malformed(format!("id: {e}")))?;
    let status_raw = string_attr(item, "status")?;
    let status = OrderStatus::parse(status_raw)
        .ok_or_else(|| StoreError::Malformed(format!("unknown status {status_raw:?}")))?;

    Ok(Order {
        id,
        customer_name: string_attr(item, "customerName")?.to_string(),
        customer_email: string_attr(item, "customerEmail")?.to_string(),
        product_name: string_attr(item, "productName")?.to_string(),
        quantity: number_attr(item, "quantity")?,
        unit_price: number_attr(item, "unitPrice")?,
        total_price: number_attr(item, "totalPrice")?,
        status,
        shipping_address: optional_string_attr(item, "shippingAddress"),
        created_at: timestamp_attr(item, "createdAt")?,
        updated_at: timestamp_attr(item, "updatedAt")?,
        pdf_file_name: optional_string_attr(item, "pdfFileName"),
        pdf_file_path: optional_string_attr(item, "pdfFilePath"),
        pdf_file_size: optional_number_attr(item, "pdfFileSize")?,
    })
}

fn string_attr<'a>(item: &'a HashMap<String, AttributeValue>, name: &str) -> Result<&'a str> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .map(String::as_str)
        .ok_or_else(|| StoreError::Malformed(format!("missing string attribute {name}")))
}

fn optional_string_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).cloned()
}

fn number_attr<T: std::str::FromStr>(
    item: &HashMap<String, AttributeValue>,
    name: &str,
) -> Result<T> {
    item.get(name)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| StoreError::Malformed(format!("missing number attribute {name}")))
}

fn optional_number_attr<T: std::str::FromStr>(
    item: &HashMap<String, AttributeValue>,
    name: &str,
) -> Result<Option<T>> {
    match item.get(name) {
        None => Ok(None),
        Some(v) => v
            .as_n()
            .ok()
            .and_then(|n| n.parse().ok())
            .map(Some)
            .ok_or_else(|| StoreError::Malformed(format!("mistyped number attribute {name}"))),
    }
}

fn timestamp_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Result<DateTime<Utc>> {
    let raw = string_attr(item, name)?;
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Malformed(format!("{name}: {e}")))
}
