use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{QuestionId, QuizId};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("unknown question type: {0}")]
    UnknownType(String),

    #[error("question text is empty")]
    EmptyText,

    #[error("multiple choice question needs at least two choices, got {0}")]
    TooFewChoices(usize),

    #[error("answer choices are not a JSON array of strings: {0}")]
    MalformedChoices(String),

    #[error("correct answer {0:?} is not one of the choices")]
    CorrectAnswerMissing(String),
}

//
// ─── QUESTION TYPE ────────────────────────────────────────────────────────────
//

/// Category of a stored question.
///
/// Only `MultipleChoice` can be played. The other variants exist so rows of
/// those types survive a load/store cycle untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    FreeText,
}

impl QuestionType {
    pub const ALL: [QuestionType; 3] = [
        QuestionType::MultipleChoice,
        QuestionType::TrueFalse,
        QuestionType::FreeText,
    ];

    /// Name used in the `question_types` table.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::FreeText => "free_text",
        }
    }

    #[must_use]
    pub fn is_playable(self) -> bool {
        matches!(self, QuestionType::MultipleChoice)
    }
}

impl FromStr for QuestionType {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple_choice" => Ok(QuestionType::MultipleChoice),
            "true_false" => Ok(QuestionType::TrueFalse),
            "free_text" => Ok(QuestionType::FreeText),
            other => Err(QuestionError::UnknownType(other.to_owned())),
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── ANSWER CHOICES ───────────────────────────────────────────────────────────
//

/// Ordered answer choices, persisted as a JSON array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerChoices(Vec<String>);

impl AnswerChoices {
    #[must_use]
    pub fn new(choices: Vec<String>) -> Self {
        Self(choices)
    }

    /// Decode the stored JSON payload.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::MalformedChoices` if the payload is not a JSON
    /// array of strings.
    pub fn from_json(raw: &str) -> Result<Self, QuestionError> {
        serde_json::from_str::<Vec<String>>(raw)
            .map(Self)
            .map_err(|e| QuestionError::MalformedChoices(e.to_string()))
    }

    #[must_use]
    pub fn to_json(&self) -> String {
        // Serializing a Vec<String> cannot fail.
        serde_json::to_string(&self.0).unwrap_or_else(|_| String::from("[]"))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [String] {
        &mut self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Position of the choice matching `answer` under the trim + exact rule.
    #[must_use]
    pub fn position_of(&self, answer: &str) -> Option<usize> {
        let answer = answer.trim();
        self.0.iter().position(|choice| choice.trim() == answer)
    }
}

/// Trim + exact, case-sensitive comparison used for every correctness check.
#[must_use]
pub fn answers_match(submitted: &str, correct: &str) -> bool {
    submitted.trim() == correct.trim()
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A persisted quiz question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    quiz_id: QuizId,
    kind: QuestionType,
    text: String,
    explanation: Option<String>,
    choices: AnswerChoices,
    correct_answer: String,
}

impl Question {
    /// Rehydrate a question from storage.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::CorrectAnswerMissing` when a multiple choice
    /// question's correct answer is not among its choices.
    pub fn from_persisted(
        id: QuestionId,
        quiz_id: QuizId,
        kind: QuestionType,
        text: String,
        explanation: Option<String>,
        choices: AnswerChoices,
        correct_answer: String,
    ) -> Result<Self, QuestionError> {
        if kind == QuestionType::MultipleChoice && choices.position_of(&correct_answer).is_none() {
            return Err(QuestionError::CorrectAnswerMissing(correct_answer));
        }

        Ok(Self {
            id,
            quiz_id,
            kind,
            text,
            explanation: explanation.filter(|e| !e.trim().is_empty()),
            choices,
            correct_answer,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    #[must_use]
    pub fn kind(&self) -> QuestionType {
        self.kind
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn choices(&self) -> &AnswerChoices {
        &self.choices
    }

    pub fn choices_mut(&mut self) -> &mut [String] {
        self.choices.as_mut_slice()
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn is_correct_answer(&self, submitted: &str) -> bool {
        answers_match(submitted, &self.correct_answer)
    }

    /// Index of the correct choice in the current choice order.
    #[must_use]
    pub fn correct_index(&self) -> Option<usize> {
        self.choices.position_of(&self.correct_answer)
    }
}

//
// ─── QUESTION DRAFT ───────────────────────────────────────────────────────────
//

/// A question that has not been stored yet (generated or seeded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    #[serde(default = "default_kind", rename = "question_type")]
    pub kind: QuestionType,
    #[serde(rename = "question_text")]
    pub text: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(rename = "answer_choices")]
    pub choices: AnswerChoices,
    pub correct_answer: String,
}

fn default_kind() -> QuestionType {
    QuestionType::MultipleChoice
}

impl QuestionDraft {
    #[must_use]
    pub fn multiple_choice(
        text: impl Into<String>,
        choices: &[&str],
        correct_answer: impl Into<String>,
        explanation: Option<&str>,
    ) -> Self {
        Self {
            kind: QuestionType::MultipleChoice,
            text: text.into(),
            explanation: explanation.map(ToOwned::to_owned),
            choices: AnswerChoices::new(choices.iter().map(|c| (*c).to_owned()).collect()),
            correct_answer: correct_answer.into(),
        }
    }

    /// Check the draft before it is handed to storage.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the text is empty, a multiple choice draft
    /// has fewer than two choices, or its correct answer is not a choice.
    pub fn validate(self) -> Result<Self, QuestionError> {
        if self.text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if self.kind == QuestionType::MultipleChoice {
            if self.choices.len() < 2 {
                return Err(QuestionError::TooFewChoices(self.choices.len()));
            }
            if self.choices.position_of(&self.correct_answer).is_none() {
                return Err(QuestionError::CorrectAnswerMissing(self.correct_answer));
            }
        }
        Ok(self)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
