//! Deterministic collaborators for tests (enabled with `--features test-support`).

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rag_store::{
    BoxFuture, EmbeddingsProvider, KnowledgeEntry, LocalStore, RagError, build_records,
};
use tokio::sync::Mutex;

use crate::error::EngineError;
use crate::generate::AnswerGenerator;

/// Bag-of-words embedder over a fixed vocabulary.
///
/// Each dimension counts one vocabulary word among the lower-cased
/// alphanumeric tokens of the text; unknown words are ignored.
pub struct VocabEmbedder {
    vocab: Vec<String>,
    fail_on: Option<String>,
    calls: AtomicUsize,
}

impl VocabEmbedder {
    pub fn new(vocab: &[&str]) -> Self {
        Self {
            vocab: vocab.iter().map(|w| w.to_string()).collect(),
            fail_on: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A small machine-learning vocabulary.
    pub fn ml() -> Self {
        Self::new(&[
            "overfitting",
            "underfitting",
            "bias",
            "variance",
            "model",
            "regularization",
            "gradient",
            "descent",
            "learning",
            "rate",
            "training",
            "data",
            "noise",
        ])
    }

    /// Fails every text containing `needle`.
    pub fn fail_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    /// Number of `embed` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The vector `embed` would return, computed synchronously.
    pub fn vector(&self, text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        self.vocab
            .iter()
            .map(|w| tokens.iter().filter(|t| **t == w.as_str()).count() as f32)
            .collect()
    }
}

impl EmbeddingsProvider for VocabEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(needle) = &self.fail_on {
                if text.contains(needle.as_str()) {
                    return Err(RagError::Embedding(format!("refusing to embed {text:?}")));
                }
            }
            Ok(self.vector(text))
        })
    }
}

/// Generator returning a fixed reply (or failing) and recording every prompt.
pub struct ScriptedGenerator {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

impl AnswerGenerator for ScriptedGenerator {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, EngineError>> {
        Box::pin(async move {
            self.prompts.lock().await.push(prompt.to_string());
            self.reply.clone().map_err(EngineError::Generation)
        })
    }
}

/// Builds an in-memory store, embedding each question with `embedder`.
///
/// # Panics
/// If the embedder fails on any question.
pub async fn store_from_entries(
    embedder: &dyn EmbeddingsProvider,
    entries: &[KnowledgeEntry],
) -> Arc<LocalStore> {
    let mut vectors = Vec::with_capacity(entries.len());
    for e in entries {
        vectors.push(
            embedder
                .embed(&e.question)
                .await
                .expect("test embedder failed on a stored question"),
        );
    }
    Arc::new(LocalStore::from_records(
        "test_kb",
        build_records(entries, vectors),
    ))
}

/// A few machine-learning definitions.
pub fn ml_knowledge_base() -> Vec<KnowledgeEntry> {
    vec![
        KnowledgeEntry::new(
            "What is overfitting?",
            "Overfitting is when a model learns noise in the training data and fails to generalize.",
        ),
        KnowledgeEntry::new(
            "What is underfitting?",
            "Underfitting is when a model is too simple to capture the underlying pattern.",
        ),
        KnowledgeEntry::new(
            "What is bias?",
            "Bias is systematic error from overly simple assumptions.",
        ),
        KnowledgeEntry::new(
            "What is the learning rate?",
            "The learning rate sets the step size of gradient descent.",
        ),
    ]
}
