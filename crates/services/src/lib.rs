#![forbid(unsafe_code)]

pub mod app_services;
pub mod content;
pub mod demo;
pub mod error;
pub mod generation;
pub mod generator;
pub mod quiz_service;
pub mod sessions;
pub mod stats_service;

pub use recall_core::Clock;

pub use app_services::AppServices;
pub use content::{ContentSource, CourseBundle, HttpContentSource, assemble_course};
pub use error::{
    AppServicesError, ContentError, GenerationError, GeneratorError, QuizServiceError,
    SessionError, StatsError,
};
pub use generation::{GeneratedQuiz, GenerationService};
pub use generator::{ChatQuestionGenerator, QuestionGenerator};
pub use quiz_service::QuizService;
pub use sessions::{Completion, Input, Notice, QuizSession, SessionController, SessionState};
pub use stats_service::StatsService;
