use axum::http::HeaderValue;
use tracing::warn;

/// Bind address used when `API_ADDRESS` is unset.
pub const DEFAULT_ADDRESS: &str = "0.0.0.0:8000";
/// Dev UI origins allowed when `CORS_ORIGINS` is unset.
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";

/// HTTP surface settings.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub address: String,
    pub cors_origins: Vec<HeaderValue>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            cors_origins: parse_origins(DEFAULT_CORS_ORIGINS),
        }
    }
}

impl ApiConfig {
    /// Reads `API_ADDRESS` and `CORS_ORIGINS` (comma-separated).
    pub fn from_env() -> Self {
        let address = std::env::var("API_ADDRESS")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
        let origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string());

        Self {
            address,
            cors_origins: parse_origins(&origins),
        }
    }
}

/// Comma-separated origins; invalid entries are logged and skipped.
pub fn parse_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = s, "ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}
