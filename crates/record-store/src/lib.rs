pub mod dynamo;
pub mod error;
pub mod memory;
pub mod record;
pub mod store;

pub use common::OrderId;
pub use dynamo::DynamoRecordStore;
pub use error::{Result, StoreError};
pub use memory::InMemoryRecordStore;
pub use record::{KEY_PREFIX, Order, OrderPatch, OrderStatus, storage_key};
pub use store::RecordStore;
