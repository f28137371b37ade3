//! AstroVision API Server
//!
//! HTTP front end for waste and space object detection.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use detection_core::FrameSampler;
use inference_engine::ModelRegistry;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use pipeline::DetectionService;
use std::sync::Arc;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod error;
mod routes;
mod settings;

pub use error::{ApiError, ErrorBody};
pub use routes::health::HealthResponse;
pub use settings::ServerConfig;

/// Server startup errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Metrics setup failed: {0}")]
    Metrics(String),

    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state shared across handlers
pub struct AppState {
    /// Detection orchestrator over the loaded models
    pub service: Arc<DetectionService>,
    /// Prometheus handle when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(service: DetectionService) -> Self {
        Self {
            service: Arc::new(service),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/detect", post(routes::detect::detect))
        .route("/health", get(routes::health::health))
        .route("/metrics", get(routes::metrics::render))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Initialize logging, `RUST_LOG` overrides the `info` default
pub fn init_logging(json: bool) -> Result<(), ServerError> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| ServerError::Logging(e.to_string()))
}

/// Load models and serve until Ctrl-C
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics(e.to_string()))?;

    let models = config.models.clone();
    let yolo = config.yolo.clone();
    let registry = tokio::task::spawn_blocking(move || ModelRegistry::load(&models, &yolo))
        .await
        .map_err(|e| ServerError::ModelLoad(e.to_string()))?;

    for (name, status) in registry.statuses() {
        info!(
            "Model {}: loaded={} exists={} path={}",
            name, status.loaded, status.exists, status.path
        );
    }

    let service = DetectionService::new(Arc::new(registry))
        .with_sampler(FrameSampler::new(config.sample_frames));
    let state = Arc::new(AppState::new(service).with_metrics(metrics));
    let app = create_router(state, config.max_upload_bytes);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Starting API server on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
