//! Embedding provider backed by the shared LLM service profiles.

use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;

use crate::embed::{BoxFuture, EmbeddingsProvider};
use crate::errors::RagError;

/// Embeds through the `embedding` profile of [`LlmServiceProfiles`].
#[derive(Clone)]
pub struct LlmEmbedder {
    svc: Arc<LlmServiceProfiles>,
    /// Expected embedding size; checked when set.
    dim: Option<usize>,
}

impl LlmEmbedder {
    pub fn new(svc: Arc<LlmServiceProfiles>, dim: Option<usize>) -> Self {
        Self { svc, dim }
    }
}

impl EmbeddingsProvider for LlmEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
        Box::pin(async move {
            let v = self.svc.embed(text).await?;
            if let Some(want) = self.dim {
                if v.len() != want {
                    return Err(RagError::VectorSizeMismatch { got: v.len(), want });
                }
            }
            Ok(v)
        })
    }
}
