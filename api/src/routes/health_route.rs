use std::sync::Arc;

use ai_llm_service::HealthStatus;
use axum::{Json, extract::State};
use serde::Serialize;

use crate::core::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub models_loaded: bool,
    pub collection_available: bool,
    pub collection_count: usize,
}

/// Handler: GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        models_loaded: state.llm.is_some(),
        collection_available: state.engine.store_available(),
        collection_count: state.engine.store_count().await,
    })
}

/// Handler: GET /health/providers
pub async fn provider_health(State(state): State<Arc<AppState>>) -> Json<Vec<HealthStatus>> {
    match &state.llm {
        Some(llm) => Json(llm.health_all().await),
        None => Json(Vec::new()),
    }
}
