//! Typed error for the answer-engine crate.

use ai_llm_service::AiLlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Question was empty after trimming.
    #[error("question cannot be empty")]
    EmptyQuestion,

    /// No vector store is attached (not built, or failed to open).
    #[error("knowledge base unavailable")]
    StoreUnavailable,

    /// Retrieval produced nothing usable for a prompt.
    #[error("no relevant information found in knowledge base")]
    NoContext,

    /// The text-generation provider failed.
    #[error("generation failed: {0}")]
    Generation(String),

    /// Errors from the underlying rag-store crate.
    #[error("RAG error: {0}")]
    Rag(#[from] rag_store::RagError),

    /// The spawned generation task panicked or was cancelled.
    #[error("generation task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<AiLlmError> for EngineError {
    fn from(e: AiLlmError) -> Self {
        EngineError::Generation(e.to_string())
    }
}
