//! Knowledge-base answering with a confidence gate.
//!
//! Public API: [`AnswerEngine::ask`]. It expands the question into variants,
//! retrieves and merges hits for all of them, returns the top stored answer
//! verbatim when it clearly matches, and otherwise asks the generator to copy
//! the answer out of a small Q/A context.

mod cfg;
mod context;
mod diagnostics;
mod error;
mod gate;
mod generate;
mod prompt;
mod query_expand;
mod retrieve;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

use std::sync::Arc;
use std::time::Instant;

use rag_store::{EmbeddingsProvider, KnowledgeEntry, VectorStore};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

pub use cfg::EngineConfig;
pub use context::build_context;
pub use diagnostics::{RetrievalDiagnostics, clip_chars};
pub use error::EngineError;
pub use gate::{MatchKind, VerbatimMatch, exact_match, verbatim_if_confident};
pub use generate::{AnswerGenerator, LlmGenerator};
pub use prompt::{COPY_INSTRUCTION, build_prompt, extract_answer};
pub use query_expand::{DEFINITIONAL_TOKEN_LIMIT, expand_queries};
pub use retrieve::{MergedHit, QuestionEmbeddings, Retrieval, merge_hits, multi_query_retrieve};

/// Where an answer came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSource {
    /// Stored answer returned unchanged.
    Verbatim,
    /// Produced by the generator from retrieved context.
    Lm,
}

/// Final answer for one question.
#[derive(Clone, Debug, PartialEq)]
pub struct Answer {
    /// The trimmed question.
    pub question: String,
    pub answer: String,
    pub source: AnswerSource,
    /// Characters of context given to the generator (`Lm` only).
    pub context_chars: Option<usize>,
}

/// Service context shared by all requests. Built once, never mutated.
pub struct AnswerEngine {
    cfg: EngineConfig,
    embedder: Arc<dyn EmbeddingsProvider>,
    store: Option<Arc<dyn VectorStore>>,
    generator: Arc<dyn AnswerGenerator>,
}

impl AnswerEngine {
    /// `store` is `None` when the collection could not be opened; every
    /// question then fails with [`EngineError::StoreUnavailable`].
    pub fn new(
        cfg: EngineConfig,
        embedder: Arc<dyn EmbeddingsProvider>,
        store: Option<Arc<dyn VectorStore>>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Self {
        Self {
            cfg,
            embedder,
            store,
            generator,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn store_available(&self) -> bool {
        self.store.is_some()
    }

    /// Record count of the attached store; `0` when missing or on error.
    pub async fn store_count(&self) -> usize {
        let Some(store) = &self.store else {
            return 0;
        };
        match store.count().await {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "store count failed");
                0
            }
        }
    }

    /// Answers one question.
    ///
    /// # Errors
    /// - [`EngineError::EmptyQuestion`] for blank input (no retrieval happens)
    /// - [`EngineError::StoreUnavailable`] without a store
    /// - [`EngineError::NoContext`] when retrieval yields no usable context
    /// - [`EngineError::Generation`] / [`EngineError::Join`] when generation fails
    #[instrument(skip_all, fields(question = %text.trim()))]
    pub async fn ask(&self, text: &str) -> Result<Answer, EngineError> {
        let started = Instant::now();
        let question = text.trim();
        if question.is_empty() {
            return Err(EngineError::EmptyQuestion);
        }
        let store = self.store.as_deref().ok_or(EngineError::StoreUnavailable)?;

        let variants = expand_queries(question);
        let mut retrieval = multi_query_retrieve(
            &variants,
            self.embedder.as_ref(),
            store,
            self.cfg.n_per_query,
            self.cfg.max_total,
        )
        .await;
        debug!(
            variants = retrieval.variants.len(),
            hits = retrieval.hits.len(),
            failed = retrieval.failed_variants,
            "retrieval finished"
        );

        if let Some(m) = verbatim_if_confident(
            question,
            &retrieval.hits,
            retrieval.query_embedding.as_deref(),
            self.embedder.as_ref(),
            &mut retrieval.memo,
            self.cfg.verbatim_threshold,
        )
        .await
        {
            info!(kind = ?m.kind, latency_ms = started.elapsed().as_millis(), "verbatim answer");
            return Ok(Answer {
                question: question.to_string(),
                answer: m.answer,
                source: AnswerSource::Verbatim,
                context_chars: None,
            });
        }

        let (entries, documents): (Vec<KnowledgeEntry>, Vec<String>) = retrieval
            .hits
            .into_iter()
            .map(|h| (h.entry, h.document))
            .unzip();
        let context = build_context(&entries, &documents, self.cfg.ctx_max_items);
        if context.trim().is_empty() {
            return Err(EngineError::NoContext);
        }

        let prompt = build_prompt(&context, question);
        let generator = Arc::clone(&self.generator);
        let raw = tokio::spawn(async move { generator.generate(&prompt).await }).await??;

        let context_chars = context.chars().count();
        info!(
            context_chars,
            latency_ms = started.elapsed().as_millis(),
            "generated answer"
        );
        Ok(Answer {
            question: question.to_string(),
            answer: extract_answer(&raw),
            source: AnswerSource::Lm,
            context_chars: Some(context_chars),
        })
    }

    /// Single-query retrieval snapshot for index verification.
    ///
    /// A missing store is reported in the result, not as an error.
    ///
    /// # Errors
    /// Embedding or store failures for the query itself.
    #[instrument(skip(self))]
    pub async fn diagnose(&self, query: &str) -> Result<RetrievalDiagnostics, EngineError> {
        let variants = expand_queries(query);
        let Some(store) = self.store.as_deref() else {
            return Ok(RetrievalDiagnostics::unavailable(query, variants));
        };

        let q_emb = self.embedder.embed(query).await?;
        let hits = store.query(&q_emb, self.cfg.diag_top_k).await?;

        let entries: Vec<KnowledgeEntry> = hits.iter().filter_map(|h| h.metadata.clone()).collect();
        let documents: Vec<String> = hits.iter().map(|h| h.document.clone()).collect();
        let context = build_context(&entries, &documents, self.cfg.ctx_max_items);

        let merged = multi_query_retrieve(
            &variants,
            self.embedder.as_ref(),
            store,
            self.cfg.n_per_query,
            self.cfg.max_total,
        )
        .await;

        Ok(RetrievalDiagnostics::from_hits(
            query,
            &hits,
            context,
            variants,
            merged.hits.len(),
        ))
    }
}
