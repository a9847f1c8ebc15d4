//! Bounded prompt context from merged hits.

use rag_store::KnowledgeEntry;

/// Builds the context block fed to the generator.
///
/// Structured Q/A pairs among the first `max_items` entries win; only when
/// none has an answer do the first `max_items` raw documents get used.
/// An empty string means nothing relevant was found.
///
/// # Example
/// ```
/// # use answer_engine::build_context;
/// # use rag_store::KnowledgeEntry;
/// let ctx = build_context(&[KnowledgeEntry::new("What is bias?", "Systematic error.")], &[], 3);
/// assert_eq!(ctx, "Q: What is bias?\nA: Systematic error.");
/// ```
pub fn build_context(entries: &[KnowledgeEntry], documents: &[String], max_items: usize) -> String {
    let mut blocks: Vec<String> = entries
        .iter()
        .take(max_items)
        .filter(|e| !e.answer.is_empty())
        .map(|e| format!("Q: {}\nA: {}", e.question, e.answer))
        .collect();

    if blocks.is_empty() {
        blocks = documents
            .iter()
            .take(max_items)
            .filter(|d| !d.is_empty())
            .map(|d| format!("Doc: {d}"))
            .collect();
    }

    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_items_with_answers() {
        let entries = [
            KnowledgeEntry::new("q1", "a1"),
            KnowledgeEntry::new("q2", ""),
            KnowledgeEntry::new("q3", "a3"),
            KnowledgeEntry::new("q4", "a4"),
        ];
        assert_eq!(build_context(&entries, &[], 3), "Q: q1\nA: a1\n\nQ: q3\nA: a3");
    }

    #[test]
    fn falls_back_to_documents() {
        let entries = [KnowledgeEntry::new("q", "")];
        let docs = ["first".to_string(), String::new(), "third".into(), "fourth".into()];
        assert_eq!(build_context(&entries, &docs, 3), "Doc: first\n\nDoc: third");
    }

    #[test]
    fn nothing_yields_empty() {
        assert_eq!(build_context(&[], &[], 3), "");
    }

    #[test]
    fn is_idempotent() {
        let entries = [
            KnowledgeEntry::new("What is bias?", "Systematic error."),
            KnowledgeEntry::new("What is variance?", "Sensitivity."),
        ];
        let docs: Vec<String> = entries.iter().map(KnowledgeEntry::document).collect();
        assert_eq!(
            build_context(&entries, &docs, 3),
            build_context(&entries, &docs, 3)
        );
    }
}
