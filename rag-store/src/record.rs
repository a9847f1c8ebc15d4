//! Core data models used by the library.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One question/answer pair of the knowledge base.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub question: String,
    pub answer: String,
}

impl KnowledgeEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Reads a structured Q/A record out of a stored payload.
    ///
    /// Returns `None` unless both `question` and `answer` are strings.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let question = payload.get("question")?.as_str()?;
        let answer = payload.get("answer")?.as_str()?;
        Some(Self::new(question, answer))
    }

    /// Text stored next to the vector: `Q: <question>\nA: <answer>`.
    pub fn document(&self) -> String {
        format!("Q: {}\nA: {}", self.question, self.answer)
    }
}

/// Canonical record held by a vector store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub embedding: Vec<f32>,
    pub document: String,
    pub metadata: KnowledgeEntry,
}

impl StoredRecord {
    /// Flat payload shared by both backends.
    pub fn payload(&self) -> Value {
        json!({
            "id": self.id,
            "question": self.metadata.question,
            "answer": self.metadata.answer,
            "document": self.document,
        })
    }
}

/// A raw store result.
#[derive(Clone, Debug)]
pub struct StoreHit {
    pub id: String,
    /// `None` when the payload is not a structured Q/A record.
    pub metadata: Option<KnowledgeEntry>,
    pub document: String,
    /// Similarity reported by the store itself.
    pub store_score: f32,
    pub raw_payload: Value,
}

impl StoreHit {
    /// Maps a store payload into a hit.
    pub fn from_payload(store_score: f32, payload: Value) -> Self {
        let id = payload
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let document = payload
            .get("document")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self {
            id,
            metadata: KnowledgeEntry::from_payload(&payload),
            document,
            store_score,
            raw_payload: payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_without_answer_has_no_metadata() {
        let hit = StoreHit::from_payload(0.5, json!({"id": "x", "question": "q", "document": "d"}));
        assert!(hit.metadata.is_none());
        assert_eq!(hit.document, "d");
        assert_eq!(hit.id, "x");
    }

    #[test]
    fn stored_payload_round_trips_into_hit() {
        let rec = StoredRecord {
            id: "qa_00001".into(),
            embedding: vec![1.0, 0.0],
            document: KnowledgeEntry::new("What is bias?", "Systematic error.").document(),
            metadata: KnowledgeEntry::new("What is bias?", "Systematic error."),
        };
        let hit = StoreHit::from_payload(0.9, rec.payload());
        assert_eq!(hit.metadata.as_ref(), Some(&rec.metadata));
        assert_eq!(hit.document, "Q: What is bias?\nA: Systematic error.");
    }
}
