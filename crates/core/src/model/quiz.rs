use thiserror::Error;

use crate::model::ids::{CourseId, QuizId};
use crate::model::question::{Question, QuestionDraft, QuestionError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz has no questions")]
    Empty,

    #[error("question {index} is invalid: {source}")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: QuestionError,
    },
}

/// The pending questions of one course, in storage order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    course_id: CourseId,
    questions: Vec<Question>,
}

impl Quiz {
    /// # Errors
    ///
    /// Returns `QuizError::Empty` when `questions` is empty; an empty quiz is
    /// represented by the absence of a `Quiz`, never by an empty one.
    pub fn new(course_id: CourseId, questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::Empty);
        }
        Ok(Self {
            course_id,
            questions,
        })
    }

    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn into_parts(self) -> (CourseId, Vec<Question>) {
        (self.course_id, self.questions)
    }
}

/// A quiz about to be created for a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuiz {
    pub course_id: CourseId,
    pub questions: Vec<QuestionDraft>,
}

impl NewQuiz {
    /// Validate every draft, reporting the first failing index.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidQuestion` for the first invalid draft.
    pub fn validate(self) -> Result<Self, QuizError> {
        let mut questions = Vec::with_capacity(self.questions.len());
        for (index, draft) in self.questions.into_iter().enumerate() {
            let draft = draft
                .validate()
                .map_err(|source| QuizError::InvalidQuestion { index, source })?;
            questions.push(draft);
        }
        Ok(Self {
            course_id: self.course_id,
            questions,
        })
    }
}

/// Outcome of creating a quiz; a second quiz for the same course is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizCreation {
    Created(QuizId),
    AlreadyExists(QuizId),
}

impl QuizCreation {
    #[must_use]
    pub fn quiz_id(self) -> QuizId {
        match self {
            QuizCreation::Created(id) | QuizCreation::AlreadyExists(id) => id,
        }
    }

    #[must_use]
    pub fn was_created(self) -> bool {
        matches!(self, QuizCreation::Created(_))
    }
}
