//! Multi-query retrieval: one store query per variant, re-scored against the
//! variant embedding, merged and deduplicated.

use std::collections::{HashMap, HashSet};

use rag_store::{EmbeddingsProvider, KnowledgeEntry, VectorStore, cosine_similarity};
use tracing::{debug, instrument, warn};

/// A merged, re-scored hit.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedHit {
    pub entry: KnowledgeEntry,
    pub document: String,
    /// Cosine similarity between the query variant and the stored question.
    pub score: f32,
}

/// Embeddings of stored questions, computed at most once per request.
///
/// A failed embedding is remembered as `None` so it is not retried.
#[derive(Default)]
pub struct QuestionEmbeddings {
    cache: HashMap<String, Option<Vec<f32>>>,
}

impl QuestionEmbeddings {
    /// Embedding of `question`, or `None` if it is empty or the provider failed.
    pub async fn get(
        &mut self,
        embedder: &dyn EmbeddingsProvider,
        question: &str,
    ) -> Option<Vec<f32>> {
        if question.is_empty() {
            return None;
        }
        if let Some(cached) = self.cache.get(question) {
            return cached.clone();
        }
        let v = match embedder.embed(question).await {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(%question, error = %e, "stored question embedding failed");
                None
            }
        };
        self.cache.insert(question.to_string(), v.clone());
        v
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Result of one multi-query retrieval.
#[derive(Default)]
pub struct Retrieval {
    pub variants: Vec<String>,
    /// Sorted by score descending, unique by `(question, answer)`.
    pub hits: Vec<MergedHit>,
    /// Embedding of the first variant (the trimmed user question).
    pub query_embedding: Option<Vec<f32>>,
    /// Variants whose embedding or store query failed.
    pub failed_variants: usize,
    pub memo: QuestionEmbeddings,
}

/// Runs one store query per variant and merges the results.
///
/// Hits without structured Q/A metadata are skipped. Each kept hit is scored
/// by cosine similarity between the variant embedding and a fresh embedding
/// of the stored question; an unscorable hit keeps score `0.0`.
#[instrument(skip_all, fields(variants = variants.len()))]
pub async fn multi_query_retrieve(
    variants: &[String],
    embedder: &dyn EmbeddingsProvider,
    store: &dyn VectorStore,
    n_per_query: usize,
    max_total: usize,
) -> Retrieval {
    let mut out = Retrieval {
        variants: variants.to_vec(),
        ..Retrieval::default()
    };
    let mut scored: Vec<MergedHit> = Vec::new();

    for (i, variant) in variants.iter().enumerate() {
        let v_emb = match embedder.embed(variant).await {
            Ok(v) => v,
            Err(e) => {
                warn!(%variant, error = %e, "variant embedding failed");
                out.failed_variants += 1;
                continue;
            }
        };

        let hits = match store.query(&v_emb, n_per_query).await {
            Ok(h) => h,
            Err(e) => {
                warn!(%variant, error = %e, "store query failed");
                out.failed_variants += 1;
                if i == 0 {
                    out.query_embedding = Some(v_emb);
                }
                continue;
            }
        };
        debug!(%variant, hits = hits.len(), "variant retrieved");

        for hit in hits {
            let Some(entry) = hit.metadata else {
                continue;
            };
            let score = match out.memo.get(embedder, &entry.question).await {
                Some(q_emb) => cosine_similarity(&v_emb, &q_emb).unwrap_or_else(|| {
                    warn!(question = %entry.question, "embedding dimension mismatch");
                    0.0
                }),
                None => 0.0,
            };
            scored.push(MergedHit {
                entry,
                document: hit.document,
                score,
            });
        }

        if i == 0 {
            out.query_embedding = Some(v_emb);
        }
    }

    out.hits = merge_hits(scored, max_total);
    debug!(
        merged = out.hits.len(),
        failed = out.failed_variants,
        "multi-query retrieval done"
    );
    out
}

/// Stable sort by score descending, dedup by `(question, answer)` keeping the
/// first occurrence, truncate to `max_total`.
pub fn merge_hits(mut scored: Vec<MergedHit>, max_total: usize) -> Vec<MergedHit> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut seen: HashSet<KnowledgeEntry> = HashSet::new();
    let mut merged = Vec::with_capacity(max_total.min(scored.len()));
    for hit in scored {
        if merged.len() >= max_total {
            break;
        }
        if seen.insert(hit.entry.clone()) {
            merged.push(hit);
        }
    }
    merged
}
