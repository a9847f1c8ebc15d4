//! Index rebuild: knowledge base → embeddings → fresh collection.
//!
//! Every question is embedded before the existing collection is touched,
//! so a failed run leaves the previous index intact.

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::config::RagConfig;
use crate::embed::EmbeddingsProvider;
use crate::errors::RagError;
use crate::progress::Progress;
use crate::record::{KnowledgeEntry, StoredRecord};
use crate::store::StoreWriter;

/// Outcome of a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexReport {
    /// Pairs written during this run.
    pub indexed: usize,
    /// Count reported by the store afterwards.
    pub collection_count: usize,
    /// Embedding size of the collection.
    pub dim: usize,
}

/// Record id for the `index`-th entry (0-based): `qa_00001`, `qa_00002`, ...
pub fn record_id(index: usize) -> String {
    format!("qa_{:05}", index + 1)
}

/// Embeds each question with bounded concurrency, preserving input order.
///
/// # Errors
/// The first provider error, or [`RagError::VectorSizeMismatch`] when vectors
/// disagree with `expected_dim` or with each other.
pub async fn embed_questions(
    entries: &[KnowledgeEntry],
    provider: &dyn EmbeddingsProvider,
    expected_dim: Option<usize>,
    concurrency: usize,
    progress: &dyn Progress,
) -> Result<Vec<Vec<f32>>, RagError> {
    info!(
        total = entries.len(),
        concurrency, "embedding knowledge-base questions"
    );
    progress.set_total(entries.len() as u64);
    progress.message("embedding");

    let vectors: Vec<Vec<f32>> = stream::iter(entries)
        .map(|e| async move {
            let v = provider.embed(&e.question).await;
            progress.advance(1);
            v
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    let want = expected_dim.or_else(|| vectors.first().map(Vec::len));
    if let Some(want) = want {
        if let Some(bad) = vectors.iter().find(|v| v.len() != want) {
            return Err(RagError::VectorSizeMismatch {
                got: bad.len(),
                want,
            });
        }
    }

    debug!(count = vectors.len(), "questions embedded");
    Ok(vectors)
}

/// Zips entries with their embeddings into stored records.
pub fn build_records(entries: &[KnowledgeEntry], embeddings: Vec<Vec<f32>>) -> Vec<StoredRecord> {
    entries
        .iter()
        .zip(embeddings)
        .enumerate()
        .map(|(i, (entry, embedding))| StoredRecord {
            id: record_id(i),
            embedding,
            document: entry.document(),
            metadata: entry.clone(),
        })
        .collect()
}

/// Drops and rebuilds the collection from `entries`.
///
/// # Errors
/// - [`RagError::InvalidKnowledgeBase`] if `entries` is empty (store untouched)
/// - embedding errors (store untouched)
/// - store errors while recreating or writing
pub async fn rebuild_index(
    cfg: &RagConfig,
    entries: &[KnowledgeEntry],
    provider: &dyn EmbeddingsProvider,
    writer: &mut dyn StoreWriter,
    progress: &dyn Progress,
) -> Result<IndexReport, RagError> {
    if entries.is_empty() {
        return Err(RagError::InvalidKnowledgeBase(
            "no usable question/answer pairs".into(),
        ));
    }

    let embeddings = embed_questions(
        entries,
        provider,
        cfg.embedding_dim,
        cfg.embedding_concurrency,
        progress,
    )
    .await?;
    let dim = embeddings.first().map(Vec::len).unwrap_or_default();
    let records = build_records(entries, embeddings);

    writer.recreate(dim).await?;

    progress.set_total(records.len() as u64);
    progress.message("writing");
    let mut indexed = 0usize;
    for chunk in records.chunks(cfg.upsert_batch.max(1)) {
        indexed += writer.add(chunk).await?;
        progress.advance(chunk.len() as u64);
    }

    let collection_count = writer.finish().await?;
    progress.finish("index rebuilt");
    info!(indexed, collection_count, dim, "index rebuilt");

    Ok(IndexReport {
        indexed,
        collection_count,
        dim,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::BoxFuture;
    use crate::local_store::{LocalStore, LocalStoreWriter};
    use crate::progress::NoopProgress;
    use crate::store::VectorStore;

    /// Length-and-vowel features; fails on texts containing "boom".
    struct CharEmbedder;

    impl EmbeddingsProvider for CharEmbedder {
        fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
            Box::pin(async move {
                if text.contains("boom") {
                    return Err(RagError::Embedding("boom".into()));
                }
                let vowels = text.chars().filter(|c| "aeiou".contains(*c)).count();
                Ok(vec![text.len() as f32, vowels as f32, 1.0])
            })
        }
    }

    fn kb() -> Vec<KnowledgeEntry> {
        (0..5)
            .map(|i| KnowledgeEntry::new(format!("question number {i}"), format!("answer {i}")))
            .collect()
    }

    #[test]
    fn ids_are_one_based_and_padded() {
        assert_eq!(record_id(0), "qa_00001");
        assert_eq!(record_id(41), "qa_00042");
    }

    #[tokio::test]
    async fn rebuild_writes_all_pairs_in_batches() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = RagConfig {
            db_path: tmp.path().join("vector_db"),
            collection: "kb".into(),
            upsert_batch: 2,
            ..RagConfig::default()
        };
        let mut writer = LocalStoreWriter::new(&cfg.db_path, &cfg.collection);

        let report = rebuild_index(&cfg, &kb(), &CharEmbedder, &mut writer, &NoopProgress)
            .await
            .unwrap();
        assert_eq!(report.indexed, 5);
        assert_eq!(report.collection_count, 5);
        assert_eq!(report.dim, 3);

        let store = LocalStore::open(&cfg.db_path, "kb").unwrap();
        assert_eq!(store.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn embedding_failure_leaves_previous_index_intact() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = RagConfig {
            db_path: tmp.path().join("vector_db"),
            collection: "kb".into(),
            ..RagConfig::default()
        };
        let mut writer = LocalStoreWriter::new(&cfg.db_path, &cfg.collection);
        rebuild_index(&cfg, &kb(), &CharEmbedder, &mut writer, &NoopProgress)
            .await
            .unwrap();

        let mut broken = kb();
        broken.push(KnowledgeEntry::new("boom?", "x"));
        let mut writer = LocalStoreWriter::new(&cfg.db_path, &cfg.collection);
        assert!(
            rebuild_index(&cfg, &broken, &CharEmbedder, &mut writer, &NoopProgress)
                .await
                .is_err()
        );

        let store = LocalStore::open(&cfg.db_path, "kb").unwrap();
        assert_eq!(store.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn empty_knowledge_base_keeps_existing_index() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = RagConfig {
            db_path: tmp.path().join("vector_db"),
            collection: "kb".into(),
            ..RagConfig::default()
        };
        let mut writer = LocalStoreWriter::new(&cfg.db_path, &cfg.collection);
        rebuild_index(&cfg, &kb(), &CharEmbedder, &mut writer, &NoopProgress)
            .await
            .unwrap();

        let mut writer = LocalStoreWriter::new(&cfg.db_path, &cfg.collection);
        let err = rebuild_index(&cfg, &[], &CharEmbedder, &mut writer, &NoopProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::InvalidKnowledgeBase(_)));

        let store = LocalStore::open(&cfg.db_path, "kb").unwrap();
        assert_eq!(store.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn expected_dimension_is_enforced() {
        let err = embed_questions(&kb(), &CharEmbedder, Some(768), 2, &NoopProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::VectorSizeMismatch { got: 3, want: 768 }));
    }

    #[test]
    fn records_carry_document_and_metadata() {
        let entries = vec![KnowledgeEntry::new("What is bias?", "Systematic error.")];
        let recs = build_records(&entries, vec![vec![1.0]]);
        assert_eq!(recs[0].id, "qa_00001");
        assert_eq!(recs[0].document, "Q: What is bias?\nA: Systematic error.");
        assert_eq!(recs[0].metadata, entries[0]);
    }
}
