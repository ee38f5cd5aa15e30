use std::sync::Arc;

use recall_core::model::{CourseId, NewQuiz, QuestionDraft, QuizCreation};
use tracing::info;

use crate::content::{ContentSource, CourseBundle, DEFAULT_DOWNLOAD_CONCURRENCY, assemble_course};
use crate::error::{ContentError, GenerationError};
use crate::generator::QuestionGenerator;
use crate::quiz_service::QuizService;

/// Result of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQuiz {
    pub creation: QuizCreation,
    pub title: String,
    pub questions: Vec<QuestionDraft>,
    pub failed_lessons: usize,
}

/// Downloads a course, asks the generator for questions and stores them as a quiz.
#[derive(Clone)]
pub struct GenerationService {
    content: Arc<dyn ContentSource>,
    generator: Arc<dyn QuestionGenerator>,
    quizzes: QuizService,
}

impl GenerationService {
    #[must_use]
    pub fn new(
        content: Arc<dyn ContentSource>,
        generator: Arc<dyn QuestionGenerator>,
        quizzes: QuizService,
    ) -> Self {
        Self {
            content,
            generator,
            quizzes,
        }
    }

    /// Generate and store `count` questions for `course`.
    ///
    /// When the course already has a quiz nothing is downloaded or written and
    /// the returned `creation` is `AlreadyExists`.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` when the course cannot be downloaded or has no
    /// readable lessons, the generator fails, or the quiz cannot be stored.
    pub async fn generate_quiz(
        &self,
        course: &CourseId,
        count: usize,
    ) -> Result<GeneratedQuiz, GenerationError> {
        if let Some(existing) = self.quizzes.existing_quiz(course).await? {
            info!(%course, quiz_id = %existing, "quiz already exists, skipping generation");
            return Ok(GeneratedQuiz {
                creation: QuizCreation::AlreadyExists(existing),
                title: String::new(),
                questions: Vec::new(),
                failed_lessons: 0,
            });
        }

        let bundle: CourseBundle =
            assemble_course(
                Arc::clone(&self.content),
                course,
                DEFAULT_DOWNLOAD_CONCURRENCY,
            )
            .await?;
        if !bundle.has_content() {
            return Err(ContentError::EmptyLesson(format!("all lessons of {course}")).into());
        }

        let questions = self.generator.generate(&bundle, count).await?;
        let creation = self
            .quizzes
            .create_quiz(NewQuiz {
                course_id: course.clone(),
                questions: questions.clone(),
            })
            .await?;

        info!(
            %course,
            generated = questions.len(),
            created = creation.was_created(),
            failed_lessons = bundle.failures.len(),
            "generated quiz"
        );

        Ok(GeneratedQuiz {
            creation,
            title: bundle.title,
            questions,
            failed_lessons: bundle.failures.len(),
        })
    }
}
