//! API server entry point.

use std::sync::Arc;

use api::auth::ApiKeySet;
use api::config::Config;
use intake::{
    DocumentIntake, EmbeddedTextExtractor, HttpCompletionClient, HttpCompletionConfig,
    IntakeConfig, TesseractCli,
};
use metrics_exporter_prometheus::PrometheusHandle;
use record_store::{DynamoRecordStore, InMemoryRecordStore, RecordStore};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn build_intake(config: &Config) -> DocumentIntake {
    let completion = HttpCompletionClient::new(HttpCompletionConfig {
        endpoint: config.completion_endpoint.clone(),
        api_key: config.completion_api_key.clone(),
        model: config.completion_model.clone(),
        ..HttpCompletionConfig::default()
    })
    .expect("failed to build completion client");

    DocumentIntake::new(
        Arc::new(EmbeddedTextExtractor),
        Arc::new(TesseractCli::new(config.tesseract_bin.clone())),
        Arc::new(completion),
        IntakeConfig {
            ocr_language: config.ocr_language.clone(),
        },
    )
}

async fn serve<S: RecordStore + 'static>(
    store: S,
    config: Config,
    metrics_handle: PrometheusHandle,
) {
    let api_keys = ApiKeySet::from_list(&config.allowed_api_keys);
    if api_keys.is_empty() {
        tracing::warn!("no API keys configured; every /orders request will be rejected");
    }

    let intake = build_intake(&config);
    let state = api::create_state(store, intake, api_keys);
    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Select the store backend and run
    let config = Config::from_env();
    match config.orders_table.clone() {
        Some(table) => {
            tracing::info!(%table, "using the DynamoDB record store");
            let store = DynamoRecordStore::connect(table, config.aws_endpoint_url.as_deref()).await;
            serve(store, config, metrics_handle).await;
        }
        None => {
            tracing::info!("ORDERS_TABLE not set, using the in-memory record store");
            serve(InMemoryRecordStore::new(), config, metrics_handle).await;
        }
    }
}
