//! Runtime configuration loaded from environment variables.

use tracing::warn;

/// Retrieval, gate and context knobs. All fields have defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Store results fetched per query variant.
    pub n_per_query: usize,
    /// Cap on merged, deduplicated hits.
    pub max_total: usize,
    /// Hits turned into prompt context.
    pub ctx_max_items: usize,
    /// Cosine similarity at or above which the top hit is returned verbatim.
    pub verbatim_threshold: f32,
    /// Results fetched by the retrieval diagnostics.
    pub diag_top_k: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            n_per_query: 4,
            max_total: 10,
            ctx_max_items: 3,
            verbatim_threshold: 0.87,
            diag_top_k: 3,
        }
    }
}

impl EngineConfig {
    /// Build from environment variables with defaults.
    ///
    /// Unparsable or out-of-range values are logged and replaced by the default.
    ///
    /// # Example
    /// ```
    /// # use answer_engine::EngineConfig;
    /// let cfg = EngineConfig::from_env();
    /// assert!(cfg.n_per_query >= 1);
    /// ```
    pub fn from_env() -> Self {
        let d = Self::default();
        let threshold = parse("VERBATIM_THRESHOLD", d.verbatim_threshold);
        Self {
            n_per_query: parse_positive("RAG_N_PER_QUERY", d.n_per_query),
            max_total: parse_positive("RAG_MAX_TOTAL", d.max_total),
            ctx_max_items: parse_positive("CTX_MAX_ITEMS", d.ctx_max_items),
            verbatim_threshold: if (-1.0..=1.0).contains(&threshold) {
                threshold
            } else {
                warn!(threshold, "VERBATIM_THRESHOLD outside [-1, 1], using default");
                d.verbatim_threshold
            },
            diag_top_k: parse_positive("DIAG_TOP_K", d.diag_top_k),
        }
    }
}

fn parse<T: std::str::FromStr + Copy>(k: &str, dflt: T) -> T {
    match std::env::var(k) {
        Ok(v) if !v.trim().is_empty() => v.trim().parse().unwrap_or_else(|_| {
            warn!(var = k, value = %v, "unparsable value, using default");
            dflt
        }),
        _ => dflt,
    }
}

fn parse_positive(k: &str, dflt: usize) -> usize {
    match parse(k, dflt) {
        0 => dflt,
        n => n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.n_per_query, 4);
        assert_eq!(cfg.max_total, 10);
        assert_eq!(cfg.ctx_max_items, 3);
        assert_eq!(cfg.verbatim_threshold, 0.87);
        assert_eq!(cfg.diag_top_k, 3);
    }
}
