//! HTTP API server for order management and document intake.
//!
//! Provides the REST surface over the order domain service and the PDF
//! intake pipeline, with API-key auth, structured logging (tracing), and
//! Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use domain::OrderService;
use intake::DocumentIntake;
use metrics_exporter_prometheus::PrometheusHandle;
use record_store::RecordStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::ApiKeySet;
use routes::orders::AppState;

/// Largest accepted upload body.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: RecordStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let api_keys = state.api_keys.clone();

    Router::new()
        .route(
            "/orders",
            post(routes::orders::create::<S>).get(routes::orders::list::<S>),
        )
        .route(
            "/orders/{id}",
            get(routes::orders::get::<S>)
                .patch(routes::orders::update::<S>)
                .delete(routes::orders::remove::<S>),
        )
        .route(
            "/orders/upload-pdf",
            post(routes::upload::upload_pdf::<S>)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/orders/health/check", get(routes::health::check))
        .layer(middleware::from_fn_with_state(
            api_keys,
            auth::require_api_key,
        ))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the shared application state.
pub fn create_state<S: RecordStore + 'static>(
    store: S,
    intake: DocumentIntake,
    api_keys: ApiKeySet,
) -> Arc<AppState<S>> {
    Arc::new(AppState {
        order_service: OrderService::new(store),
        intake,
        api_keys,
    })
}
