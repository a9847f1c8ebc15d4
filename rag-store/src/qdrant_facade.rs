//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! All Qdrant interactions live behind [`VectorStore`] and [`StoreWriter`],
//! keeping the rest of the workspace decoupled from `qdrant-client`.

use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::RagConfig;
use crate::embed::BoxFuture;
use crate::errors::RagError;
use crate::record::{StoreHit, StoredRecord};
use crate::store::{StoreWriter, VectorStore};

/// Deterministic point id for a record id (Qdrant accepts only UUIDs or integers).
pub fn stable_uuid(id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, id.as_bytes())
}

/// A facade over the Qdrant client bound to one collection (cosine distance).
pub struct QdrantFacade {
    client: Qdrant,
    collection: String,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// # Errors
    /// Returns `RagError::Config` on invalid config or `RagError::Qdrant` if
    /// the client cannot be built.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
        })
    }

    /// Fails with [`RagError::CollectionNotFound`] unless the collection exists.
    pub async fn ensure_exists(&self) -> Result<(), RagError> {
        if self.client.collection_exists(&self.collection).await? {
            Ok(())
        } else {
            Err(RagError::CollectionNotFound(self.collection.clone()))
        }
    }

    async fn search(&self, vector: Vec<f32>, k: usize) -> Result<Vec<StoreHit>, RagError> {
        let res = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector, k as u64).with_payload(true),
            )
            .await?;

        let hits: Vec<StoreHit> = res
            .result
            .into_iter()
            .map(|p| {
                let mut map = serde_json::Map::new();
                for (key, v) in p.payload {
                    map.insert(key, v.into_json());
                }
                StoreHit::from_payload(p.score, serde_json::Value::Object(map))
            })
            .collect();

        debug!(k, hits = hits.len(), "qdrant search completed");
        Ok(hits)
    }

    async fn point_count(&self) -> Result<usize, RagError> {
        let res = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await?;
        Ok(res.result.map(|r| r.count as usize).unwrap_or(0))
    }
}

impl VectorStore for QdrantFacade {
    fn name(&self) -> &str {
        &self.collection
    }

    fn query<'a>(
        &'a self,
        vector: &'a [f32],
        k: usize,
    ) -> BoxFuture<'a, Result<Vec<StoreHit>, RagError>> {
        Box::pin(self.search(vector.to_vec(), k))
    }

    fn count(&self) -> BoxFuture<'_, Result<usize, RagError>> {
        Box::pin(self.point_count())
    }
}

impl StoreWriter for QdrantFacade {
    fn recreate(&mut self, dim: usize) -> BoxFuture<'_, Result<(), RagError>> {
        Box::pin(async move {
            if self.client.collection_exists(&self.collection).await? {
                info!(collection = %self.collection, "deleting existing collection");
                self.client.delete_collection(&self.collection).await?;
            }
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection)
                        .vectors_config(VectorParamsBuilder::new(dim as u64, Distance::Cosine)),
                )
                .await?;
            info!(collection = %self.collection, dim, "collection created");
            Ok(())
        })
    }

    fn add<'a>(&'a mut self, batch: &'a [StoredRecord]) -> BoxFuture<'a, Result<usize, RagError>> {
        Box::pin(async move {
            let mut points = Vec::with_capacity(batch.len());
            for r in batch {
                let payload = Payload::try_from(r.payload())
                    .map_err(|e| RagError::Qdrant(format!("payload for {}: {e}", r.id)))?;
                points.push(PointStruct::new(
                    stable_uuid(&r.id).to_string(),
                    r.embedding.clone(),
                    payload,
                ));
            }
            self.client
                .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
                .await?;
            Ok(batch.len())
        })
    }

    fn finish(&mut self) -> BoxFuture<'_, Result<usize, RagError>> {
        Box::pin(self.point_count())
    }
}
