//! Knowledge-base reader: a flat JSON object `{question: answer}`.

use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::errors::RagError;
use crate::record::KnowledgeEntry;

/// Reads the knowledge base in file order.
///
/// Entries whose answer is not a string, or is blank after trimming, are
/// skipped with a warning. Answers are kept as-is.
///
/// # Errors
/// - [`RagError::Io`] if the file cannot be read
/// - [`RagError::Parse`] on malformed JSON
/// - [`RagError::InvalidKnowledgeBase`] if the top level is not an object
pub fn read_knowledge_base(path: impl AsRef<Path>) -> Result<Vec<KnowledgeEntry>, RagError> {
    info!(path = %path.as_ref().display(), "reading knowledge base");
    let data = std::fs::read_to_string(path.as_ref())?;
    parse_knowledge_base(&data)
}

/// Parses knowledge-base JSON text. See [`read_knowledge_base`].
pub fn parse_knowledge_base(data: &str) -> Result<Vec<KnowledgeEntry>, RagError> {
    let Value::Object(map) = serde_json::from_str::<Value>(data)? else {
        return Err(RagError::InvalidKnowledgeBase(
            "top-level value must be an object of question -> answer".into(),
        ));
    };

    let mut out = Vec::with_capacity(map.len());
    for (question, answer) in map {
        match answer {
            Value::String(a) if !a.trim().is_empty() => out.push(KnowledgeEntry::new(question, a)),
            other => warn!(%question, kind = value_kind(&other), "skipping entry without usable answer"),
        }
    }

    info!(entries = out.len(), "knowledge base parsed");
    Ok(out)
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "blank string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_file_order_and_skips_unusable_answers() {
        let kb = parse_knowledge_base(
            r#"{
                "What is variance?": "Sensitivity to training data.",
                "What is bias?": "  Systematic error. ",
                "Blank?": "   ",
                "Number?": 42,
                "Null?": null
            }"#,
        )
        .unwrap();

        assert_eq!(
            kb,
            vec![
                KnowledgeEntry::new("What is variance?", "Sensitivity to training data."),
                KnowledgeEntry::new("What is bias?", "  Systematic error. "),
            ]
        );
    }

    #[test]
    fn rejects_non_object() {
        assert!(matches!(
            parse_knowledge_base(r#"[["q", "a"]]"#),
            Err(RagError::InvalidKnowledgeBase(_))
        ));
    }

    #[test]
    fn reads_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("kb.json");
        std::fs::write(&path, r#"{"What is overfitting?": "Memorizing noise."}"#).unwrap();
        assert_eq!(read_knowledge_base(&path).unwrap().len(), 1);
    }
}
