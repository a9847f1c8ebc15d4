use ai_llm_service::AiLlmError;
use answer_engine::EngineError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rag_store::RagError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    #[error(transparent)]
    Llm(#[from] AiLlmError),

    #[error(transparent)]
    Rag(#[from] RagError),

    // --- Request ---
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Engine(e) => match e {
                EngineError::EmptyQuestion => StatusCode::BAD_REQUEST,
                EngineError::StoreUnavailable | EngineError::NoContext => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                EngineError::Generation(_) => StatusCode::BAD_GATEWAY,
                EngineError::Rag(_) | EngineError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Llm(_) | AppError::Rag(_) | AppError::Bind(_) | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::Llm(_) => "LLM_ERROR",
            AppError::Rag(_) => "STORE_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Engine(e) => match e {
                EngineError::EmptyQuestion => "BAD_REQUEST",
                EngineError::StoreUnavailable => "KB_UNAVAILABLE",
                EngineError::NoContext => "NO_CONTEXT",
                EngineError::Generation(_) => "GENERATION_FAILED",
                EngineError::Rag(_) | EngineError::Join(_) => "INTERNAL_ERROR",
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.error_code(),
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_statuses() {
        let cases = [
            (EngineError::EmptyQuestion, 400, "BAD_REQUEST"),
            (EngineError::StoreUnavailable, 503, "KB_UNAVAILABLE"),
            (EngineError::NoContext, 503, "NO_CONTEXT"),
            (EngineError::Generation("down".into()), 502, "GENERATION_FAILED"),
        ];
        for (e, status, code) in cases {
            let app = AppError::from(e);
            assert_eq!(app.status_code().as_u16(), status);
            assert_eq!(app.error_code(), code);
        }
    }

    #[test]
    fn store_errors_are_internal() {
        let app = AppError::from(EngineError::Rag(RagError::Config("x".into())));
        assert_eq!(app.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
