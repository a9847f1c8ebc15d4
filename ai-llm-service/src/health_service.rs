//! Health probes for the LLM backends (Ollama, OpenAI).
//!
//! - Ollama: `GET {endpoint}/api/tags`, model looked up in `models[].name`
//! - OpenAI: `GET {endpoint}/v1/models` with Bearer auth, model looked up in `data[].id`
//!
//! [`HealthService::check`] never fails; errors are folded into `ok = false`.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{AiLlmError, HealthError, HttpError, Result, make_snippet};

/// A serializable health snapshot for a single provider/config.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Backend/provider (e.g., "Ollama", "OpenAI").
    pub provider: String,
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model identifier probed.
    pub model: String,
    /// Overall health flag.
    pub ok: bool,
    /// Measured HTTP latency in milliseconds.
    pub latency_ms: u128,
    /// Short human-readable message.
    pub message: String,
}

impl HealthStatus {
    fn new(cfg: &LlmModelConfig, ok: bool, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            provider: format!("{:?}", cfg.provider),
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Health checker reusing a single HTTP client.
pub struct HealthService {
    client: reqwest::Client,
    timeout: Duration,
}

/// `{ "models": [ { "name": "<model>" } ] }`
#[derive(Deserialize)]
struct OllamaTags {
    #[serde(default)]
    models: Vec<OllamaTag>,
}

#[derive(Deserialize)]
struct OllamaTag {
    name: String,
}

/// `{ "data": [ { "id": "<model>" } ] }`
#[derive(Deserialize)]
struct OpenAiModels {
    #[serde(default)]
    data: Vec<OpenAiModel>,
}

#[derive(Deserialize)]
struct OpenAiModel {
    id: String,
}

impl HealthService {
    /// Creates a new health service with an optional probe timeout (seconds, default 10).
    ///
    /// # Errors
    /// Returns [`AiLlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    /// Probes one config. Any failure becomes `ok = false` with a message.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let start = Instant::now();
        let result = match cfg.provider {
            LlmProvider::Ollama => self.probe_ollama(cfg).await,
            LlmProvider::OpenAI => self.probe_openai(cfg).await,
        };
        let latency = start.elapsed().as_millis();

        match result {
            Ok(true) => {
                info!(provider = ?cfg.provider, model = %cfg.model, latency_ms = latency, "health probe ok");
                HealthStatus::new(cfg, true, latency, "backend reachable; model is available")
            }
            Ok(false) => {
                warn!(provider = ?cfg.provider, model = %cfg.model, "model not listed by backend");
                HealthStatus::new(cfg, false, latency, "backend reachable, but model not found")
            }
            Err(err) => {
                warn!(provider = ?cfg.provider, endpoint = %cfg.endpoint, error = %err, "health probe failed");
                HealthStatus::new(cfg, false, latency, err.to_string())
            }
        }
    }

    /// Probes several configs sequentially.
    pub async fn check_many(&self, configs: &[LlmModelConfig]) -> Vec<HealthStatus> {
        debug!(count = configs.len(), "running batch health probes");
        let mut out = Vec::with_capacity(configs.len());
        for cfg in configs {
            out.push(self.check(cfg).await);
        }
        out
    }

    async fn probe_ollama(&self, cfg: &LlmModelConfig) -> Result<bool> {
        let url = format!("{}/api/tags", cfg.endpoint.trim_end_matches('/'));
        let resp = self.get(&url, None).await?;
        let tags: OllamaTags = resp
            .json()
            .await
            .map_err(|e| HealthError::Decode(e.to_string()))?;
        // Ollama lists tagged names (`llama3.2:latest`); accept the bare name too.
        Ok(tags.models.iter().any(|m| {
            m.name == cfg.model || m.name.strip_suffix(":latest") == Some(cfg.model.as_str())
        }))
    }

    async fn probe_openai(&self, cfg: &LlmModelConfig) -> Result<bool> {
        let url = format!("{}/v1/models", cfg.endpoint.trim_end_matches('/'));
        let key = cfg
            .api_key
            .as_deref()
            .ok_or_else(|| HealthError::Decode("missing OpenAI API key".into()))?;
        let resp = self.get(&url, Some(key)).await?;
        let models: OpenAiModels = resp
            .json()
            .await
            .map_err(|e| HealthError::Decode(e.to_string()))?;
        Ok(models.data.iter().any(|m| m.id == cfg.model))
    }

    async fn get(&self, url: &str, bearer: Option<&str>) -> Result<reqwest::Response> {
        debug!("GET {}", url);
        let mut req = self.client.get(url).timeout(self.timeout);
        if let Some(key) = bearer {
            let value = header::HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| HealthError::Decode(format!("invalid API key header: {e}")))?;
            req = req.header(header::AUTHORIZATION, value);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let snippet = make_snippet(&resp.text().await.unwrap_or_default());
            return Err(AiLlmError::from(HealthError::HttpStatus(HttpError {
                status,
                url: url.to_string(),
                snippet,
            })));
        }
        Ok(resp)
    }
}
