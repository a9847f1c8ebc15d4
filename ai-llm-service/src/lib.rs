//! Shared LLM access for the answer service.
//!
//! Two logical profiles are exposed through [`service_profiles::LlmServiceProfiles`]:
//! - **generation** → deterministic text generation (copy-from-context answers)
//! - **embedding**  → embedding vectors for questions and query variants
//!
//! Providers: local Ollama and OpenAI-compatible HTTP APIs.

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use config::default_config::{config_embedding_from_env, config_generation_from_env};
pub use config::llm_model_config::LlmModelConfig;
pub use config::llm_provider::LlmProvider;
pub use error_handler::AiLlmError;
pub use health_service::HealthStatus;
pub use service_profiles::LlmServiceProfiles;
