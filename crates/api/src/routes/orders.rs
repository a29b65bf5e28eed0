//! Order CRUD endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::OrderId;
use domain::{CreateOrder, OrderService, UpdateOrder};
use intake::DocumentIntake;
use record_store::{Order, RecordStore};

use crate::auth::ApiKeySet;
use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: RecordStore> {
    pub order_service: OrderService<S>,
    pub intake: DocumentIntake,
    pub api_keys: ApiKeySet,
}

/// POST /orders — create a new order.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateOrder>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let order = state.order_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders — list every order.
#[tracing::instrument(skip(state))]
pub async fn list<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state.order_service.find_all().await?;
    Ok(Json(orders))
}

/// GET /orders/:id — load an order by ID.
#[tracing::instrument(skip(state))]
pub async fn get<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.order_service.find_one(order_id).await?;
    Ok(Json(order))
}

/// PATCH /orders/:id — partially update an order.
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateOrder>, JsonRejection>,
) -> Result<Json<Order>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let Json(input) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let order = state.order_service.update(order_id, input).await?;
    Ok(Json(order))
}

/// DELETE /orders/:id — delete an order.
#[tracing::instrument(skip(state))]
pub async fn remove<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let order_id = parse_order_id(&id)?;
    state.order_service.remove(order_id).await?;
    Ok(StatusCode::OK)
}

/// Order ids are opaque on the wire; anything that cannot name a stored
/// record is simply not found.
fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    OrderId::parse(id).map_err(|_| ApiError::NotFound(format!("Order with ID {id} not found")))
}
