//! Knowledge-base storage: question/answer records behind a vector-store seam.
//!
//! This crate provides:
//! - the data model ([`KnowledgeEntry`], [`StoredRecord`], [`StoreHit`])
//! - provider and store traits ([`EmbeddingsProvider`], [`VectorStore`], [`StoreWriter`])
//! - a local on-disk collection and a Qdrant-backed one
//! - the knowledge-base reader and the full index rebuild

mod config;
mod embed;
mod errors;
mod ingest;
mod io_json;
mod local_store;
mod progress;
mod qdrant_facade;
mod record;
mod similarity;
mod store;

use std::sync::Arc;

pub use config::{RagConfig, StoreBackend};
pub use embed::llm::LlmEmbedder;
pub use embed::{BoxFuture, EmbeddingsProvider};
pub use errors::RagError;
pub use ingest::{IndexReport, build_records, embed_questions, rebuild_index, record_id};
pub use io_json::{parse_knowledge_base, read_knowledge_base};
pub use local_store::{LocalStore, LocalStoreWriter};
pub use progress::{IndicatifProgress, NoopProgress, Progress};
pub use qdrant_facade::{QdrantFacade, stable_uuid};
pub use record::{KnowledgeEntry, StoreHit, StoredRecord};
pub use similarity::cosine_similarity;
pub use store::{StoreWriter, VectorStore};

use tracing::{debug, info};

/// Opens the configured collection for serving.
///
/// # Errors
/// [`RagError::CollectionNotFound`] if it has not been built, or backend errors.
pub async fn open_store(cfg: &RagConfig) -> Result<Arc<dyn VectorStore>, RagError> {
    cfg.validate()?;
    debug!(backend = ?cfg.backend, collection = %cfg.collection, "opening vector store");

    let store: Arc<dyn VectorStore> = match cfg.backend {
        StoreBackend::Local => Arc::new(LocalStore::open(&cfg.db_path, &cfg.collection)?),
        StoreBackend::Qdrant => {
            let facade = QdrantFacade::new(cfg)?;
            facade.ensure_exists().await?;
            Arc::new(facade)
        }
    };

    info!(collection = %store.name(), "vector store opened");
    Ok(store)
}

/// Writer for a full rebuild of the configured collection.
///
/// # Errors
/// Returns config or client construction errors.
pub fn open_writer(cfg: &RagConfig) -> Result<Box<dyn StoreWriter>, RagError> {
    cfg.validate()?;
    Ok(match cfg.backend {
        StoreBackend::Local => Box::new(LocalStoreWriter::new(&cfg.db_path, &cfg.collection)),
        StoreBackend::Qdrant => Box::new(QdrantFacade::new(cfg)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_store_reports_missing_local_collection() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = RagConfig {
            db_path: tmp.path().to_path_buf(),
            ..RagConfig::default()
        };
        assert!(matches!(
            open_store(&cfg).await,
            Err(RagError::CollectionNotFound(_))
        ));
    }
}
