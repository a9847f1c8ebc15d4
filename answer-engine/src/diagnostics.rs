//! Retrieval diagnostics: raw store shapes for one query, used to verify an index.

use rag_store::{KnowledgeEntry, StoreHit};
use serde::Serialize;
use serde_json::Value;

/// Context preview length in characters.
pub const CONTEXT_PREVIEW_CHARS: usize = 400;
/// Document preview length in characters.
pub const DOCUMENT_PREVIEW_CHARS: usize = 120;

#[derive(Clone, Debug, Serialize)]
pub struct RetrievalDiagnostics {
    pub query: String,
    /// Hits carrying structured Q/A metadata.
    pub metas_count: usize,
    pub docs_count: usize,
    pub context_preview: String,
    /// `"<rows> x <hits>"`; one row per query.
    pub raw_metadatas_shape: String,
    /// Raw payloads of the first row.
    pub raw_metadatas_preview: Vec<Vec<Value>>,
    pub raw_documents_preview: Vec<String>,
    /// Variants the multi-query retriever would use.
    pub variants: Vec<String>,
    /// Hits after multi-query merge.
    pub merged_hits: usize,
}

impl RetrievalDiagnostics {
    /// Diagnostics for a missing store.
    pub fn unavailable(query: &str, variants: Vec<String>) -> Self {
        Self::from_hits(query, &[], String::new(), variants, 0)
    }

    /// Diagnostics from a single-query result and its context.
    pub fn from_hits(
        query: &str,
        hits: &[StoreHit],
        context: String,
        variants: Vec<String>,
        merged_hits: usize,
    ) -> Self {
        let metas: Vec<&KnowledgeEntry> = hits.iter().filter_map(|h| h.metadata.as_ref()).collect();
        let (shape, preview) = if hits.is_empty() {
            ("0 x 0".to_string(), Vec::new())
        } else {
            (
                format!("1 x {}", hits.len()),
                vec![hits.iter().map(|h| h.raw_payload.clone()).collect()],
            )
        };

        Self {
            query: query.to_string(),
            metas_count: metas.len(),
            docs_count: hits.len(),
            context_preview: clip_chars(&context, CONTEXT_PREVIEW_CHARS),
            raw_metadatas_shape: shape,
            raw_metadatas_preview: preview,
            raw_documents_preview: hits
                .iter()
                .map(|h| clip_chars(&h.document, DOCUMENT_PREVIEW_CHARS))
                .collect(),
            variants,
            merged_hits,
        }
    }
}

/// First `max` characters of `s` (char-boundary safe).
pub fn clip_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unavailable_store_has_empty_shape() {
        let d = RetrievalDiagnostics::unavailable("bias", vec!["bias".into()]);
        assert_eq!(d.raw_metadatas_shape, "0 x 0");
        assert_eq!(d.metas_count, 0);
        assert!(d.raw_metadatas_preview.is_empty());
    }

    #[test]
    fn previews_are_clipped() {
        let long = "é".repeat(300);
        let hit = StoreHit::from_payload(
            0.9,
            json!({"id": "qa_00001", "question": "q", "answer": "a", "document": long}),
        );
        let d = RetrievalDiagnostics::from_hits("q", &[hit], "x".repeat(1000), vec![], 1);

        assert_eq!(d.raw_metadatas_shape, "1 x 1");
        assert_eq!(d.metas_count, 1);
        assert_eq!(d.raw_documents_preview[0].chars().count(), 120);
        assert_eq!(d.context_preview.len(), 400);
        assert_eq!(d.raw_metadatas_preview[0][0]["id"], "qa_00001");
    }
}
