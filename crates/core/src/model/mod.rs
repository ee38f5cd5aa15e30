mod answer;
mod ids;
mod question;
mod quiz;
mod stats;

pub use answer::AnswerEvent;
pub use ids::{CourseId, EmptyCourseId, QuestionId, QuizId};
pub use question::{
    AnswerChoices, Question, QuestionDraft, QuestionError, QuestionType, answers_match,
};
pub use quiz::{NewQuiz, Quiz, QuizCreation, QuizError};
pub use stats::{Correctness, QuizStats, QuizStatsError};
