//! Read and write seams over a knowledge-base collection.

use crate::embed::BoxFuture;
use crate::errors::RagError;
use crate::record::{StoreHit, StoredRecord};

/// Read-only view of a built collection. Never mutated while serving.
pub trait VectorStore: Send + Sync {
    /// Collection name.
    fn name(&self) -> &str;

    /// Returns up to `k` nearest records, best first.
    fn query<'a>(
        &'a self,
        vector: &'a [f32],
        k: usize,
    ) -> BoxFuture<'a, Result<Vec<StoreHit>, RagError>>;

    /// Number of stored records.
    fn count(&self) -> BoxFuture<'_, Result<usize, RagError>>;
}

/// Write access used only by the offline rebuild.
pub trait StoreWriter: Send {
    /// Drops any existing collection and creates an empty one for vectors of size `dim`.
    fn recreate(&mut self, dim: usize) -> BoxFuture<'_, Result<(), RagError>>;

    /// Appends a batch; returns the number of records accepted.
    fn add<'a>(&'a mut self, batch: &'a [StoredRecord]) -> BoxFuture<'a, Result<usize, RagError>>;

    /// Flushes pending state and returns the final collection count.
    fn finish(&mut self) -> BoxFuture<'_, Result<usize, RagError>>;
}
