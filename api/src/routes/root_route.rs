use axum::Json;
use serde_json::{Value, json};

/// Handler: GET /
pub async fn root() -> Json<Value> {
    Json(json!({
        "service": "knowledge-base answer service",
        "endpoints": {
            "POST /ask": "answer a question: {\"text\": \"...\"}",
            "GET /test-retrieval/{query}": "retrieval diagnostics for one query",
            "GET /health": "store and model status",
            "GET /health/providers": "LLM provider probes",
        },
        "features": [
            "query expansion",
            "multi-query retrieval",
            "verbatim answers above the confidence threshold",
            "copy-from-context generation",
        ],
    }))
}
