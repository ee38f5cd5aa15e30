use chrono::{DateTime, Utc};

use crate::model::ids::QuestionId;

/// One submitted answer, as recorded in the append-only answer log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerEvent {
    pub question_id: QuestionId,
    pub submitted: String,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
}

impl AnswerEvent {
    #[must_use]
    pub fn new(
        question_id: QuestionId,
        submitted: impl Into<String>,
        is_correct: bool,
        answered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            question_id,
            submitted: submitted.into(),
            is_correct,
            answered_at,
        }
    }
}
