//! Runtime and collection configuration.

use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::RagError;

/// Which vector store implementation backs the collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    /// Flat JSON collection on local disk, brute-force cosine scan.
    Local,
    /// Remote Qdrant collection.
    Qdrant,
}

impl FromStr for StoreBackend {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(StoreBackend::Local),
            "qdrant" => Ok(StoreBackend::Qdrant),
            other => Err(RagError::Config(format!(
                "unsupported VECTOR_BACKEND '{other}' (expected local|qdrant)"
            ))),
        }
    }
}

/// Configuration for indexing and serving the knowledge-base collection.
#[derive(Clone, Debug)]
pub struct RagConfig {
    pub backend: StoreBackend,
    /// Directory holding local collections (`<db_path>/<collection>.json`).
    pub db_path: PathBuf,
    /// Target collection name.
    pub collection: String,
    /// Qdrant gRPC endpoint, e.g. `http://127.0.0.1:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Records written per batch during a rebuild.
    pub upsert_batch: usize,
    /// Expected embedding size; checked when set.
    pub embedding_dim: Option<usize>,
    /// Concurrent embedding requests during a rebuild.
    pub embedding_concurrency: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Local,
            db_path: PathBuf::from("vector_db"),
            collection: "ml_knowledge".into(),
            qdrant_url: "http://127.0.0.1:6334".into(),
            qdrant_api_key: None,
            upsert_batch: 100,
            embedding_dim: None,
            embedding_concurrency: 4,
        }
    }
}

impl RagConfig {
    /// Reads the config from environment, falling back to defaults.
    ///
    /// # Env
    /// `VECTOR_BACKEND`, `VECTOR_DB_PATH`, `COLLECTION_NAME`, `QDRANT_URL`,
    /// `QDRANT_API_KEY`, `UPSERT_BATCH`, `EMBEDDING_DIM`, `EMBEDDING_CONCURRENCY`.
    ///
    /// # Errors
    /// Returns `RagError::Config` on unparsable values.
    pub fn from_env() -> Result<Self, RagError> {
        let d = Self::default();
        let cfg = Self {
            backend: match env("VECTOR_BACKEND") {
                Some(v) => v.parse()?,
                None => d.backend,
            },
            db_path: env("VECTOR_DB_PATH").map(PathBuf::from).unwrap_or(d.db_path),
            collection: env("COLLECTION_NAME").unwrap_or(d.collection),
            qdrant_url: env("QDRANT_URL").unwrap_or(d.qdrant_url),
            qdrant_api_key: env("QDRANT_API_KEY"),
            upsert_batch: env_usize("UPSERT_BATCH")?.unwrap_or(d.upsert_batch),
            embedding_dim: env_usize("EMBEDDING_DIM")?,
            embedding_concurrency: env_usize("EMBEDDING_CONCURRENCY")?
                .unwrap_or(d.embedding_concurrency),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.collection.trim().is_empty() {
            return Err(RagError::Config("collection is empty".into()));
        }
        if self.backend == StoreBackend::Qdrant && self.qdrant_url.trim().is_empty() {
            return Err(RagError::Config("qdrant_url is empty".into()));
        }
        if self.upsert_batch == 0 {
            return Err(RagError::Config("upsert_batch must be > 0".into()));
        }
        if self.embedding_concurrency == 0 {
            return Err(RagError::Config("embedding_concurrency must be > 0".into()));
        }
        if self.embedding_dim == Some(0) {
            return Err(RagError::Config("embedding_dim must be > 0".into()));
        }
        Ok(())
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_usize(name: &str) -> Result<Option<usize>, RagError> {
    env(name)
        .map(|v| {
            v.trim()
                .parse::<usize>()
                .map_err(|_| RagError::Config(format!("{name}: expected unsigned integer")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("Qdrant".parse::<StoreBackend>().unwrap(), StoreBackend::Qdrant);
        assert_eq!(" local ".parse::<StoreBackend>().unwrap(), StoreBackend::Local);
        assert!("chroma".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = RagConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.db_path, PathBuf::from("vector_db"));
        assert_eq!(cfg.collection, "ml_knowledge");
    }

    #[test]
    fn zero_batch_is_rejected() {
        let cfg = RagConfig {
            upsert_batch: 0,
            ..RagConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(RagError::Config(_))));
    }
}
