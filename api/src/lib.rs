use std::sync::Arc;

mod core;
mod error_handler;
mod routes;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

pub use crate::core::{app_state::AppState, config::ApiConfig};
pub use crate::error_handler::{AppError, AppResult};

use crate::routes::{
    ask::ask_route::ask, health_route::health, health_route::provider_health, root_route::root,
    test_retrieval_route::test_retrieval,
};

/// Builds state from the environment and serves until Ctrl+C.
pub async fn start() -> Result<(), AppError> {
    let cfg = ApiConfig::from_env();
    let state = Arc::new(AppState::from_env().await?);
    let app = router(state, &cfg);

    let listener = tokio::net::TcpListener::bind(&cfg.address)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %cfg.address, "listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// All routes with CORS and request tracing.
pub fn router(state: Arc<AppState>, cfg: &ApiConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any)
        .allow_origin(cfg.cors_origins.clone());

    Router::new()
        .route("/", get(root))
        .route("/ask", post(ask))
        .route("/test-retrieval/{query}", get(test_retrieval))
        .route("/health", get(health))
        .route("/health/providers", get(provider_health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
