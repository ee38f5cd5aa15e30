//! Shared error types for the services crate.

use thiserror::Error;

use recall_core::model::{EmptyCourseId, QuestionId, QuizError, QuizStatsError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error(transparent)]
    Course(#[from] EmptyCourseId),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `StatsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatsError {
    #[error(transparent)]
    Counts(#[from] QuizStatsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by a quiz session and its controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions left in this session")]
    Exhausted,
    #[error("choice {index} is out of range (question has {len} choices)")]
    ChoiceOutOfRange { index: usize, len: usize },
    #[error("failed to record answer for question {question_id}")]
    Record {
        question_id: QuestionId,
        #[source]
        source: QuizServiceError,
    },
    #[error(transparent)]
    Load(#[from] QuizServiceError),
    #[error(transparent)]
    Stats(#[from] StatsError),
}

/// Errors emitted by a `ContentSource`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("content request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("lesson {0} has no readable content")]
    EmptyLesson(String),
    #[error("lesson download task failed: {0}")]
    Join(String),
}

/// Errors emitted by a `QuestionGenerator`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GeneratorError {
    #[error("question generation returned an empty response")]
    EmptyResponse,
    #[error("question generation request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("could not parse generated questions: {0}")]
    Parse(String),
    #[error("no usable questions were generated")]
    NoQuestions,
}

/// Errors emitted by `GenerationService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Quiz(#[from] QuizServiceError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
