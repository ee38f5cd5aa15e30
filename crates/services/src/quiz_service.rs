use std::sync::Arc;

use recall_core::model::{
    AnswerEvent, CourseId, NewQuiz, Question, QuestionId, Quiz, QuizCreation, QuizId,
};
use storage::repository::{AnswerLogRepository, QuizRepository};
use tracing::{debug, info, warn};

use crate::Clock;
use crate::error::QuizServiceError;

/// Builds quizzes from storage and appends answer events.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    quizzes: Arc<dyn QuizRepository>,
    answers: Arc<dyn AnswerLogRepository>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        quizzes: Arc<dyn QuizRepository>,
        answers: Arc<dyn AnswerLogRepository>,
    ) -> Self {
        Self {
            clock,
            quizzes,
            answers,
        }
    }

    /// Load the questions of `course` that still need a correct answer.
    ///
    /// Returns `Ok(None)` when nothing is pending, whether the course has no
    /// questions at all or every question was already answered correctly.
    /// Rows whose stored payload cannot be decoded are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if the query fails.
    pub async fn load_pending_quiz(
        &self,
        course: &CourseId,
    ) -> Result<Option<Quiz>, QuizServiceError> {
        let records = self.quizzes.pending_questions(course).await?;

        let mut questions: Vec<Question> = Vec::with_capacity(records.len());
        for record in records {
            let question_id = record.id;
            match record.into_question() {
                Ok(question) => questions.push(question),
                Err(err) => {
                    warn!(%course, %question_id, error = %err, "skipping corrupt question");
                }
            }
        }

        debug!(%course, pending = questions.len(), "loaded pending questions");
        if questions.is_empty() {
            return Ok(None);
        }
        Ok(Some(Quiz::new(course.clone(), questions)?))
    }

    /// Append one answer event to the log.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if the write fails. Callers must not
    /// treat the answer as recorded in that case.
    pub async fn record_answer(
        &self,
        question_id: QuestionId,
        submitted: &str,
        is_correct: bool,
    ) -> Result<i64, QuizServiceError> {
        let event = AnswerEvent::new(question_id, submitted, is_correct, self.clock.now());
        let id = self.answers.append_answer(&event).await?;
        debug!(%question_id, is_correct, answer_id = id, "recorded answer");
        Ok(id)
    }

    /// Validate and store a new quiz; an existing quiz for the course is kept.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Quiz` for invalid drafts and
    /// `QuizServiceError::Storage` if the insert fails.
    pub async fn create_quiz(&self, quiz: NewQuiz) -> Result<QuizCreation, QuizServiceError> {
        let quiz = quiz.validate()?;
        let creation = self.quizzes.create_quiz(&quiz).await?;
        match creation {
            QuizCreation::Created(id) => info!(
                course = %quiz.course_id,
                quiz_id = %id,
                questions = quiz.questions.len(),
                "created quiz"
            ),
            QuizCreation::AlreadyExists(id) => info!(
                course = %quiz.course_id,
                quiz_id = %id,
                "quiz already exists, nothing written"
            ),
        }
        Ok(creation)
    }

    /// Id of the quiz stored for `course`, if any.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if the query fails.
    pub async fn existing_quiz(
        &self,
        course: &CourseId,
    ) -> Result<Option<QuizId>, QuizServiceError> {
        Ok(self.quizzes.quiz_id_for_course(course).await?)
    }
}
