//! Text-generation seam.

use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use rag_store::BoxFuture;

use crate::error::EngineError;

/// Produces raw model output for a prompt.
pub trait AnswerGenerator: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, EngineError>>;
}

/// Generator backed by the `generation` profile of [`LlmServiceProfiles`]
/// (greedy decoding, bounded new tokens).
#[derive(Clone)]
pub struct LlmGenerator {
    svc: Arc<LlmServiceProfiles>,
}

impl LlmGenerator {
    pub fn new(svc: Arc<LlmServiceProfiles>) -> Self {
        Self { svc }
    }
}

impl AnswerGenerator for LlmGenerator {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, EngineError>> {
        Box::pin(async move { Ok(self.svc.generate(prompt).await?) })
    }
}
