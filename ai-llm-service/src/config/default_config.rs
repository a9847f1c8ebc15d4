//! Default LLM configs loaded from environment variables.
//!
//! Two roles are supported:
//!
//! - **Generation** → deterministic answer synthesis (greedy, zero temperature)
//! - **Embedding**  → embedding generator for questions and query variants
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND`         = provider kind (`ollama` default, or `openai`)
//! - `LLM_MAX_TOKENS`   = new-token budget for generation (default 180)
//! - `LLM_TIMEOUT_SECS` = generation request timeout (default 600)
//! - `GENERATION_MODEL` = generation model (mandatory)
//! - `EMBEDDING_MODEL`  = embedding model (mandatory)
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` (default `http://localhost:11434`)
//!
//! OpenAI-specific:
//! - `OPENAI_URL` (default `https://api.openai.com`)
//! - `OPENAI_API_KEY` (mandatory)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt_u32, env_opt_u64, must_env, opt_env,
    },
};

/// New-token budget used when `LLM_MAX_TOKENS` is unset.
pub const DEFAULT_MAX_NEW_TOKENS: u32 = 180;

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";

/// Resolves provider, endpoint and API key from environment.
///
/// Endpoint precedence for Ollama:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
/// 3. `http://localhost:11434`
///
/// # Errors
///
/// - [`ConfigError::UnsupportedProvider`] for an unknown `LLM_KIND`
/// - [`ConfigError::InvalidNumber`] if `OLLAMA_PORT` is invalid
/// - [`ConfigError::MissingVar`] if OpenAI is selected without `OPENAI_API_KEY`
fn provider_from_env() -> Result<(LlmProvider, String, Option<String>), AiLlmError> {
    let provider = match opt_env("LLM_KIND") {
        Some(kind) => kind.parse::<LlmProvider>()?,
        None => LlmProvider::Ollama,
    };

    match provider {
        LlmProvider::Ollama => {
            if let Some(url) = opt_env("OLLAMA_URL") {
                return Ok((provider, url, None));
            }
            if let Some(port) = opt_env("OLLAMA_PORT") {
                port.trim()
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidNumber {
                        var: "OLLAMA_PORT",
                        reason: "expected u16 (1..=65535)",
                    })?;
                return Ok((provider, format!("http://localhost:{}", port.trim()), None));
            }
            Ok((provider, DEFAULT_OLLAMA_URL.to_string(), None))
        }
        LlmProvider::OpenAI => {
            let endpoint = opt_env("OPENAI_URL").unwrap_or_else(|| DEFAULT_OPENAI_URL.into());
            let key = must_env("OPENAI_API_KEY")?;
            Ok((provider, endpoint, Some(key)))
        }
    }
}

/// Builds the deterministic **generation** profile.
///
/// No sampling: `temperature = 0.0`, `top_k = 1`, so identical prompts
/// produce identical output.
pub fn generation_profile(
    provider: LlmProvider,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    timeout_secs: u64,
) -> LlmModelConfig {
    LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens: Some(max_tokens),
        temperature: Some(0.0),
        top_p: None,
        top_k: Some(1),
        timeout_secs: Some(timeout_secs),
    }
}

/// Builds the **embedding** profile.
pub fn embedding_profile(
    provider: LlmProvider,
    endpoint: String,
    api_key: Option<String>,
    model: String,
) -> LlmModelConfig {
    LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        top_k: None,
        timeout_secs: Some(30),
    }
}

/// Constructs the generation config from environment.
///
/// # Env
/// - `GENERATION_MODEL` (required)
/// - `LLM_MAX_TOKENS`, `LLM_TIMEOUT_SECS` (optional)
pub fn config_generation_from_env() -> Result<LlmModelConfig, AiLlmError> {
    let (provider, endpoint, api_key) = provider_from_env()?;
    let model = must_env("GENERATION_MODEL")?;
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?.unwrap_or(DEFAULT_MAX_NEW_TOKENS);
    let timeout = env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(600);

    let cfg = generation_profile(provider, endpoint, api_key, model, max_tokens, timeout);
    cfg.validate()?;
    Ok(cfg)
}

/// Constructs the embedding config from environment.
///
/// # Env
/// - `EMBEDDING_MODEL` (required)
pub fn config_embedding_from_env() -> Result<LlmModelConfig, AiLlmError> {
    let (provider, endpoint, api_key) = provider_from_env()?;
    let model = must_env("EMBEDDING_MODEL")?;

    let cfg = embedding_profile(provider, endpoint, api_key, model);
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_profile_is_greedy() {
        let cfg = generation_profile(
            LlmProvider::Ollama,
            DEFAULT_OLLAMA_URL.into(),
            None,
            "llama3.2".into(),
            DEFAULT_MAX_NEW_TOKENS,
            600,
        );
        assert_eq!(cfg.temperature, Some(0.0));
        assert_eq!(cfg.top_k, Some(1));
        assert_eq!(cfg.top_p, None);
        assert_eq!(cfg.max_tokens, Some(180));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn embedding_profile_has_no_token_budget() {
        let cfg = embedding_profile(
            LlmProvider::OpenAI,
            DEFAULT_OPENAI_URL.into(),
            Some("sk-test".into()),
            "text-embedding-3-small".into(),
        );
        assert_eq!(cfg.max_tokens, None);
        assert_eq!(cfg.timeout_secs, Some(30));
        assert!(cfg.validate().is_ok());
    }
}
