//! Confidence gate: return the top stored answer verbatim when it clearly matches.

use rag_store::{EmbeddingsProvider, cosine_similarity};
use tracing::{debug, warn};

use crate::retrieve::{MergedHit, QuestionEmbeddings};

/// Which test let the top hit through.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MatchKind {
    /// Normalized question text is identical.
    Exact,
    /// Question embeddings are close enough; carries the cosine similarity.
    Similarity(f32),
}

/// A verbatim answer selected by the gate.
#[derive(Clone, Debug, PartialEq)]
pub struct VerbatimMatch {
    pub answer: String,
    pub kind: MatchKind,
}

fn normalize(s: &str) -> String {
    s.to_lowercase().trim_matches([' ', '?']).to_string()
}

/// Case-insensitive equality ignoring surrounding spaces and `?`.
///
/// An empty stored question never matches.
pub fn exact_match(user_question: &str, stored_question: &str) -> bool {
    let stored = normalize(stored_question);
    !stored.is_empty() && normalize(user_question) == stored
}

/// Checks only the top hit. Embedding failures or dimension mismatches
/// disable the similarity test and are logged; they are never errors.
pub async fn verbatim_if_confident(
    question: &str,
    hits: &[MergedHit],
    query_embedding: Option<&[f32]>,
    embedder: &dyn EmbeddingsProvider,
    memo: &mut QuestionEmbeddings,
    threshold: f32,
) -> Option<VerbatimMatch> {
    let top = hits.first()?;
    if top.entry.answer.trim().is_empty() {
        return None;
    }

    if exact_match(question, &top.entry.question) {
        debug!(stored = %top.entry.question, "exact match");
        return Some(VerbatimMatch {
            answer: top.entry.answer.clone(),
            kind: MatchKind::Exact,
        });
    }

    let q_emb = query_embedding?;
    let Some(top_emb) = memo.get(embedder, &top.entry.question).await else {
        warn!(stored = %top.entry.question, "similarity test skipped: no embedding");
        return None;
    };
    let Some(score) = cosine_similarity(q_emb, &top_emb) else {
        warn!(
            got = top_emb.len(),
            want = q_emb.len(),
            "similarity test skipped: dimension mismatch"
        );
        return None;
    };

    debug!(score, threshold, "similarity test");
    (score >= threshold).then(|| VerbatimMatch {
        answer: top.entry.answer.clone(),
        kind: MatchKind::Similarity(score),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::VocabEmbedder;
    use rag_store::KnowledgeEntry;

    fn top(q: &str, a: &str) -> Vec<MergedHit> {
        let entry = KnowledgeEntry::new(q, a);
        vec![MergedHit {
            document: entry.document(),
            entry,
            score: 0.0,
        }]
    }

    #[test]
    fn exact_match_ignores_case_spaces_and_question_marks() {
        assert!(exact_match("  what is Overfitting??", "What is overfitting?"));
        assert!(!exact_match("what is overfitting!", "What is overfitting?"));
        assert!(!exact_match("?", " ? "));
    }

    #[tokio::test]
    async fn exact_match_returns_stored_answer_unchanged() {
        let emb = VocabEmbedder::ml();
        let hits = top("What is bias?", "  Systematic error.  ");
        let m = verbatim_if_confident(
            "what is bias",
            &hits,
            None,
            &emb,
            &mut QuestionEmbeddings::default(),
            0.87,
        )
        .await
        .unwrap();
        assert_eq!(m.answer, "  Systematic error.  ");
        assert_eq!(m.kind, MatchKind::Exact);
    }

    #[tokio::test]
    async fn identical_question_passes_and_distant_one_fails() {
        let emb = VocabEmbedder::ml();
        let hits = top("What is overfitting?", "Memorizing noise.");

        let close = emb.vector("overfitting please");
        let m = verbatim_if_confident(
            "overfitting please",
            &hits,
            Some(&close),
            &emb,
            &mut QuestionEmbeddings::default(),
            0.87,
        )
        .await
        .unwrap();
        assert!(matches!(m.kind, MatchKind::Similarity(s) if s >= 0.87));

        let far = emb.vector("overfitting training data noise");
        assert!(
            verbatim_if_confident(
                "overfitting training data noise",
                &hits,
                Some(&far),
                &emb,
                &mut QuestionEmbeddings::default(),
                0.87,
            )
            .await
            .is_none()
        );
    }

    #[tokio::test]
    async fn threshold_is_inclusive() {
        let emb = VocabEmbedder::ml();
        let hits = top("What is overfitting?", "Memorizing noise.");
        let q = emb.vector("overfitting noise");
        let s = cosine_similarity(&q, &emb.vector("What is overfitting?")).unwrap();
        assert!(s > 0.0 && s < 1.0);
        let mut memo = QuestionEmbeddings::default();

        let m = verbatim_if_confident("overfitting noise", &hits, Some(&q), &emb, &mut memo, s)
            .await
            .unwrap();
        assert_eq!(m.kind, MatchKind::Similarity(s));

        assert!(
            verbatim_if_confident("overfitting noise", &hits, Some(&q), &emb, &mut memo, s + 1e-6)
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn empty_answer_or_failed_embedding_is_no_match() {
        let emb = VocabEmbedder::ml().fail_on("overfitting");
        let q = VocabEmbedder::ml().vector("overfitting");
        let mut memo = QuestionEmbeddings::default();

        let hits = top("What is overfitting?", "Memorizing noise.");
        assert!(
            verbatim_if_confident("overfitting", &hits, Some(&q), &emb, &mut memo, 0.87)
                .await
                .is_none()
        );

        let hits = top("What is bias?", "");
        assert!(
            verbatim_if_confident("What is bias?", &hits, Some(&q), &emb, &mut memo, 0.87)
                .await
                .is_none()
        );
        assert!(verbatim_if_confident("x", &[], Some(&q), &emb, &mut memo, 0.87).await.is_none());
    }
}
