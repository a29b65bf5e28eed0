pub mod error;
pub mod input;
pub mod service;

pub use common::OrderId;
pub use error::DomainError;
pub use input::{CreateOrder, UpdateOrder};
pub use service::OrderService;
