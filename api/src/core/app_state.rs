use std::sync::Arc;

use ai_llm_service::{LlmServiceProfiles, config_embedding_from_env, config_generation_from_env};
use answer_engine::{AnswerEngine, EngineConfig, LlmGenerator};
use rag_store::{LlmEmbedder, RagConfig, open_store};
use tracing::{error, info};

use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
pub struct AppState {
    pub engine: AnswerEngine,
    /// Live provider profiles; `None` when the engine runs on other providers.
    pub llm: Option<Arc<LlmServiceProfiles>>,
}

impl AppState {
    pub fn new(engine: AnswerEngine, llm: Option<Arc<LlmServiceProfiles>>) -> Self {
        Self { engine, llm }
    }

    /// Loads provider profiles and opens the vector store.
    ///
    /// A store that cannot be opened is logged and left out; requests then
    /// take the unavailable path. Provider configuration errors are fatal.
    pub async fn from_env() -> Result<Self, AppError> {
        let generation = config_generation_from_env()?;
        let embedding = config_embedding_from_env()?;
        let llm = Arc::new(LlmServiceProfiles::new(generation, embedding, None)?);

        let rag = RagConfig::from_env()?;
        let store = match open_store(&rag).await {
            Ok(s) => Some(s),
            Err(e) => {
                error!(error = %e, collection = %rag.collection, "vector store unavailable");
                None
            }
        };

        let embedder = Arc::new(LlmEmbedder::new(Arc::clone(&llm), rag.embedding_dim));
        let generator = Arc::new(LlmGenerator::new(Arc::clone(&llm)));
        let engine = AnswerEngine::new(EngineConfig::from_env(), embedder, store, generator);

        let (g, e) = llm.profiles();
        info!(
            generation_model = %g.model,
            embedding_model = %e.model,
            store = engine.store_available(),
            "app state ready"
        );
        Ok(Self::new(engine, Some(llm)))
    }
}
