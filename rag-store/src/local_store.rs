//! Local on-disk collection: one JSON file per collection, brute-force cosine scan.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::embed::BoxFuture;
use crate::errors::RagError;
use crate::record::{StoreHit, StoredRecord};
use crate::similarity::cosine_similarity;
use crate::store::{StoreWriter, VectorStore};

/// On-disk file shape.
#[derive(Debug, Serialize, Deserialize)]
struct CollectionFile {
    collection: String,
    dim: usize,
    records: Vec<StoredRecord>,
}

/// Immutable in-memory collection loaded from disk.
pub struct LocalStore {
    collection: String,
    dim: Option<usize>,
    records: Vec<StoredRecord>,
}

impl LocalStore {
    /// Loads `<dir>/<collection>.json`.
    ///
    /// # Errors
    /// - [`RagError::CollectionNotFound`] if the file does not exist
    /// - [`RagError::Io`] / [`RagError::Parse`] on unreadable content
    pub fn open(dir: impl AsRef<Path>, collection: &str) -> Result<Self, RagError> {
        let path = collection_path(dir.as_ref(), collection);
        if !path.exists() {
            return Err(RagError::CollectionNotFound(path.display().to_string()));
        }

        let data = std::fs::read_to_string(&path)?;
        let file: CollectionFile = serde_json::from_str(&data)?;
        info!(
            collection = %file.collection,
            records = file.records.len(),
            dim = file.dim,
            "local collection loaded"
        );

        Ok(Self {
            collection: file.collection,
            dim: Some(file.dim),
            records: file.records,
        })
    }

    /// Builds a store directly from records (no disk involved).
    pub fn from_records(collection: impl Into<String>, records: Vec<StoredRecord>) -> Self {
        let dim = records.first().map(|r| r.embedding.len());
        Self {
            collection: collection.into(),
            dim,
            records,
        }
    }

    fn search(&self, vector: &[f32], k: usize) -> Result<Vec<StoreHit>, RagError> {
        if let Some(want) = self.dim {
            if vector.len() != want {
                return Err(RagError::VectorSizeMismatch {
                    got: vector.len(),
                    want,
                });
            }
        }

        let mut scored: Vec<(f32, &StoredRecord)> = self
            .records
            .iter()
            .filter_map(|r| cosine_similarity(vector, &r.embedding).map(|s| (s, r)))
            .collect();

        // Stable: equal scores keep insertion order.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(k);

        debug!(k, hits = scored.len(), "local collection scanned");
        Ok(scored
            .into_iter()
            .map(|(score, r)| StoreHit::from_payload(score, r.payload()))
            .collect())
    }
}

impl VectorStore for LocalStore {
    fn name(&self) -> &str {
        &self.collection
    }

    fn query<'a>(
        &'a self,
        vector: &'a [f32],
        k: usize,
    ) -> BoxFuture<'a, Result<Vec<StoreHit>, RagError>> {
        Box::pin(async move { self.search(vector, k) })
    }

    fn count(&self) -> BoxFuture<'_, Result<usize, RagError>> {
        Box::pin(async move { Ok(self.records.len()) })
    }
}

/// Rebuilds a local collection; the file is written atomically on `finish`.
pub struct LocalStoreWriter {
    dir: PathBuf,
    collection: String,
    dim: Option<usize>,
    records: Vec<StoredRecord>,
}

impl LocalStoreWriter {
    pub fn new(dir: impl Into<PathBuf>, collection: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            collection: collection.into(),
            dim: None,
            records: Vec::new(),
        }
    }

    fn persist(&self, dim: usize) -> Result<(), RagError> {
        let path = collection_path(&self.dir, &self.collection);
        let tmp = path.with_extension("json.tmp");
        let file = CollectionFile {
            collection: self.collection.clone(),
            dim,
            records: self.records.clone(),
        };
        std::fs::write(&tmp, serde_json::to_vec(&file)?)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl StoreWriter for LocalStoreWriter {
    fn recreate(&mut self, dim: usize) -> BoxFuture<'_, Result<(), RagError>> {
        Box::pin(async move {
            if self.dir.exists() {
                info!(dir = %self.dir.display(), "removing existing vector store directory");
                std::fs::remove_dir_all(&self.dir)?;
            }
            std::fs::create_dir_all(&self.dir)?;
            self.dim = Some(dim);
            self.records.clear();
            self.persist(dim)
        })
    }

    fn add<'a>(&'a mut self, batch: &'a [StoredRecord]) -> BoxFuture<'a, Result<usize, RagError>> {
        Box::pin(async move {
            let want = self
                .dim
                .ok_or_else(|| RagError::Config("recreate() must run before add()".into()))?;
            if let Some(bad) = batch.iter().find(|r| r.embedding.len() != want) {
                return Err(RagError::VectorSizeMismatch {
                    got: bad.embedding.len(),
                    want,
                });
            }
            self.records.extend_from_slice(batch);
            Ok(batch.len())
        })
    }

    fn finish(&mut self) -> BoxFuture<'_, Result<usize, RagError>> {
        Box::pin(async move {
            let dim = self
                .dim
                .ok_or_else(|| RagError::Config("recreate() must run before finish()".into()))?;
            self.persist(dim)?;
            Ok(self.records.len())
        })
    }
}

fn collection_path(dir: &Path, collection: &str) -> PathBuf {
    dir.join(format!("{collection}.json"))
}
