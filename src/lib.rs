//! Followgraph - per-client follow graph explorer
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - Record management and analysis pages                     │
//! │  - Rendered network artifacts                               │
//! │  - Health and metrics                                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Record import and maintenance                            │
//! │  - Build / filter / rank / render pipeline                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - SQLite (sqlx), one file per client                       │
//! │  - Artifact directory                                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers and HTML pages
//! - `service`: Business logic layer
//! - `graph`: Edge derivation, filtering, ranking, layout and rendering
//! - `data`: Per-client record stores
//! - `storage`: Rendered artifact storage
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod service;
pub mod storage;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// Cloned for each request. Client stores are opened lazily, so nothing
/// here touches a client's data until that client makes a request.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Per-client record stores
    pub stores: Arc<data::ClientStores>,

    /// Rendered network artifacts
    pub plots: Arc<storage::PlotStore>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Create the client data directory
    /// 2. Create the artifact directory
    ///
    /// # Errors
    /// Returns error if either directory cannot be created
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        tokio::fs::create_dir_all(&config.storage.data_dir).await?;
        let stores = data::ClientStores::new(
            config.storage.data_dir.clone(),
            config.storage.store_limits(),
        );
        tracing::info!(
            data_dir = %config.storage.data_dir.display(),
            max_open = config.storage.max_open_stores,
            "Client stores ready"
        );

        let plots = storage::PlotStore::new(config.storage.plots_dir.clone())
            .await?
            .with_retention(config.storage.plot_retention());
        tracing::info!(
            plots_dir = %config.storage.plots_dir.display(),
            max_plots = config.storage.max_plots,
            "Plot store ready"
        );

        Ok(Self {
            config: Arc::new(config),
            stores: Arc::new(stores),
            plots: Arc::new(plots),
        })
    }
}

/// Spawn the background sweep of idle client stores and old artifacts.
///
/// Runs every `storage.sweep_interval_secs` until the runtime shuts down.
pub fn spawn_sweeper(state: &AppState) -> tokio::task::JoinHandle<()> {
    let stores = state.stores.clone();
    let plots = state.plots.clone();
    let interval = state.config.storage.sweep_interval();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            sweep(&stores, &plots).await;
        }
    })
}

/// One sweep: close idle client stores and prune old artifacts.
pub async fn sweep(stores: &data::ClientStores, plots: &storage::PlotStore) {
    let closed = stores.prune_idle().await;
    match plots.prune().await {
        Ok(removed) => {
            tracing::debug!(closed, removed, "Sweep complete");
        }
        Err(error) => {
            tracing::error!(%error, "Plot pruning failed");
        }
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments. Serve it with
/// `into_make_service_with_connect_info::<SocketAddr>()` so pages can tell
/// clients apart.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{
        compression::CompressionLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
    };

    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(api::pages_router())
        .layer(axum::extract::DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .merge(api::metrics_router())
}

async fn health_check() -> &'static str {
    "OK"
}
