//! Shared LLM service with two active profiles: `generation` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Caches underlying HTTP clients per config (provider+endpoint+model+key+timeout).
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::{LlmServiceProfiles, config_embedding_from_env, config_generation_from_env};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = Arc::new(LlmServiceProfiles::new(
//!     config_generation_from_env()?,
//!     config_embedding_from_env()?,
//!     Some(10),
//! )?);
//!
//! let emb = svc.embed("What is overfitting?").await?;
//! println!("Embedding dim = {}", emb.len());
//!
//! let txt = svc.generate("Q: What is overfitting?\nA:").await?;
//! println!("{txt}");
//! # Ok(()) }
//! ```

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::Result,
    health_service::{HealthService, HealthStatus},
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

/// Shared service managing the **generation** and **embedding** profiles.
///
/// Ollama/OpenAI clients are cached by configuration so HTTP connection
/// pools are reused across requests.
pub struct LlmServiceProfiles {
    generation: LlmModelConfig,
    embedding: LlmModelConfig,

    ollama: RwLock<HashMap<ClientKey, Arc<OllamaService>>>,
    openai: RwLock<HashMap<ClientKey, Arc<OpenAiService>>>,

    health: HealthService,
}

impl LlmServiceProfiles {
    /// Creates a new service with both profiles.
    ///
    /// Both configs are validated up front.
    ///
    /// # Errors
    /// Returns [`crate::AiLlmError::Config`] for an invalid profile, or a
    /// transport error if the health client cannot be built.
    pub fn new(
        generation: LlmModelConfig,
        embedding: LlmModelConfig,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self> {
        generation.validate()?;
        embedding.validate()?;

        Ok(Self {
            generation,
            embedding,
            ollama: RwLock::new(HashMap::new()),
            openai: RwLock::new(HashMap::new()),
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Generates text using the **generation** profile.
    ///
    /// # Errors
    /// Returns [`crate::AiLlmError`] if the client cannot be built or the call fails.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        match self.generation.provider {
            LlmProvider::Ollama => {
                let cli = self.ollama_client(&self.generation).await?;
                cli.generate(prompt).await
            }
            LlmProvider::OpenAI => {
                let cli = self.openai_client(&self.generation).await?;
                cli.generate(prompt).await
            }
        }
    }

    /// Computes embeddings using the **embedding** profile.
    ///
    /// # Errors
    /// Returns [`crate::AiLlmError`] if the client cannot be built or the call fails.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>> {
        match self.embedding.provider {
            LlmProvider::Ollama => {
                let cli = self.ollama_client(&self.embedding).await?;
                cli.embeddings(input).await
            }
            LlmProvider::OpenAI => {
                let cli = self.openai_client(&self.embedding).await?;
                cli.embeddings(input).await
            }
        }
    }

    /// Returns a health snapshot for the distinct profiles.
    ///
    /// If both profiles are identical, the backend is probed once.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = vec![self.generation.clone()];
        if self.embedding != self.generation {
            list.push(self.embedding.clone());
        }
        self.health.check_many(&list).await
    }

    /// Returns references to the current profiles `(generation, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.generation, &self.embedding)
    }

    /* --------------------- Internals --------------------- */

    async fn ollama_client(&self, cfg: &LlmModelConfig) -> Result<Arc<OllamaService>> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.ollama.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.ollama.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        debug!(model = %cfg.model, "initializing Ollama client");
        let cli = Arc::new(OllamaService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }

    async fn openai_client(&self, cfg: &LlmModelConfig) -> Result<Arc<OpenAiService>> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.openai.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.openai.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        debug!(model = %cfg.model, "initializing OpenAI client");
        let cli = Arc::new(OpenAiService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }
}

/// Cache key identifying a unique client config.
#[derive(Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Option<u64>,
}

impl From<&LlmModelConfig> for ClientKey {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config::{embedding_profile, generation_profile};

    fn profiles() -> LlmServiceProfiles {
        let generation = generation_profile(
            LlmProvider::Ollama,
            "http://localhost:11434".into(),
            None,
            "llama3.2".into(),
            180,
            600,
        );
        let embedding = embedding_profile(
            LlmProvider::Ollama,
            "http://localhost:11434".into(),
            None,
            "nomic-embed-text".into(),
        );
        LlmServiceProfiles::new(generation, embedding, Some(1)).unwrap()
    }

    #[test]
    fn rejects_invalid_profile() {
        let generation = generation_profile(
            LlmProvider::Ollama,
            "localhost".into(),
            None,
            "llama3.2".into(),
            180,
            600,
        );
        let embedding = generation.clone();
        assert!(LlmServiceProfiles::new(generation, embedding, None).is_err());
    }

    #[tokio::test]
    async fn caches_one_client_per_config() {
        let svc = profiles();
        let (generation, _) = svc.profiles();
        let generation = generation.clone();

        let a = svc.ollama_client(&generation).await.unwrap();
        let b = svc.ollama_client(&generation).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(svc.ollama.read().await.len(), 1);
    }
}
