use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{ConfigError, Result, validate_http_endpoint, validate_range_f32};

/// Configuration for an LLM model invocation.
///
/// This struct contains both general and provider-specific parameters.
///
/// # Fields
///
/// - `provider`: Which backend to use (Ollama or OpenAI).
/// - `model`: The model identifier (e.g., `"flan-t5"`, `"nomic-embed-text"`).
/// - `endpoint`: The inference endpoint (local server or remote API URL).
/// - `api_key`: Optional API key for providers that require authentication.
/// - `max_tokens`: Maximum number of new tokens to generate (if supported).
/// - `temperature`: Controls randomness (0.0 = deterministic).
/// - `top_p`: Nucleus sampling cutoff.
/// - `top_k`: Candidate pool size per step (1 = greedy decoding).
/// - `timeout_secs`: Optional request timeout in seconds.
///
/// # Examples
///
/// ```
/// use ai_llm_service::{LlmModelConfig, LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::Ollama,
///     model: "llama3.2".to_string(),
///     endpoint: "http://localhost:11434".to_string(),
///     api_key: None,
///     max_tokens: Some(180),
///     temperature: Some(0.0),
///     top_p: None,
///     top_k: Some(1),
///     timeout_secs: Some(600),
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// The LLM provider/backend.
    pub provider: LlmProvider,

    /// Model identifier string.
    pub model: String,

    /// Inference endpoint (local socket/URL or remote API URL).
    pub endpoint: String,

    /// Optional API key for authentication (e.g., OpenAI).
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Top-k sampling parameter (Ollama only).
    pub top_k: Option<u32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Validates endpoint scheme, model name and sampling ranges.
    ///
    /// # Errors
    /// Returns [`crate::AiLlmError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        validate_http_endpoint("endpoint", self.endpoint.trim())?;
        if let Some(t) = self.temperature {
            validate_range_f32("temperature", t, 0.0, 2.0)?;
        }
        if let Some(p) = self.top_p {
            validate_range_f32("top_p", p, 0.0, 1.0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handler::AiLlmError;

    fn base() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "llama3.2".into(),
            endpoint: "http://localhost:11434".into(),
            api_key: None,
            max_tokens: Some(180),
            temperature: Some(0.0),
            top_p: None,
            top_k: Some(1),
            timeout_secs: Some(30),
        }
    }

    #[test]
    fn accepts_deterministic_generation_profile() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn rejects_empty_model() {
        let cfg = LlmModelConfig {
            model: "  ".into(),
            ..base()
        };
        assert!(matches!(
            cfg.validate(),
            Err(AiLlmError::Config(ConfigError::EmptyModel))
        ));
    }

    #[test]
    fn rejects_endpoint_without_scheme() {
        let cfg = LlmModelConfig {
            endpoint: "localhost:11434".into(),
            ..base()
        };
        assert!(matches!(
            cfg.validate(),
            Err(AiLlmError::Config(ConfigError::InvalidFormat { .. }))
        ));
    }

    #[test]
    fn rejects_out_of_range_top_p() {
        let cfg = LlmModelConfig {
            top_p: Some(1.5),
            ..base()
        };
        assert!(matches!(
            cfg.validate(),
            Err(AiLlmError::Config(ConfigError::OutOfRange { field: "top_p", .. }))
        ));
    }
}
