//! GET /test-retrieval/{query}: raw retrieval shapes for verifying an index.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use crate::core::app_state::AppState;

/// Failures are reported in the body with status 200.
pub async fn test_retrieval(
    State(state): State<Arc<AppState>>,
    Path(query): Path<String>,
) -> Response {
    match state.engine.diagnose(&query).await {
        Ok(d) => Json(d).into_response(),
        Err(e) => {
            warn!(%query, error = %e, "retrieval diagnostics failed");
            Json(json!({ "error": e.to_string(), "query": query })).into_response()
        }
    }
}
