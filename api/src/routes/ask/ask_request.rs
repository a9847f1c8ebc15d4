use answer_engine::{Answer, AnswerSource};
use serde::{Deserialize, Serialize};

/// Request payload for /ask.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Natural language question.
    pub text: String,
}

/// Response payload for /ask.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
    pub source: AnswerSource,
    /// Present for generated answers only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_used: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_chars: Option<usize>,
}

impl From<Answer> for AskResponse {
    fn from(a: Answer) -> Self {
        Self {
            question: a.question,
            answer: a.answer,
            source: a.source,
            context_used: (a.source == AnswerSource::Lm).then_some(true),
            context_chars: a.context_chars,
        }
    }
}
