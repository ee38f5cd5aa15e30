use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use recall_core::model::{CourseId, Question, Quiz};

use crate::error::SessionError;

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One sitting over the pending questions of a course.
///
/// Question order and each question's choice order are shuffled once, up front.
/// The correct answer is stored as text, so it stays attached to its choice
/// wherever the shuffle puts it.
pub struct QuizSession {
    course_id: CourseId,
    questions: Vec<Question>,
    current: usize,
}

impl QuizSession {
    /// Shuffle with the thread-local RNG.
    #[must_use]
    pub fn new(quiz: Quiz) -> Self {
        Self::with_rng(quiz, &mut rand::rng())
    }

    /// Shuffle with a caller-provided RNG (seeded in tests).
    #[must_use]
    pub fn with_rng<R: Rng + ?Sized>(quiz: Quiz, rng: &mut R) -> Self {
        let (course_id, mut questions) = quiz.into_parts();
        questions.shuffle(rng);
        for question in &mut questions {
            question.choices_mut().shuffle(rng);
        }

        Self {
            course_id,
            questions,
            current: 0,
        }
    }

    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    /// Total number of questions in this session.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// 1-based position of the current question, capped at `len()`.
    #[must_use]
    pub fn position(&self) -> usize {
        (self.current + 1).min(self.questions.len())
    }

    /// The question under the cursor.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Exhausted` once the session has moved past the
    /// last question.
    pub fn current(&self) -> Result<&Question, SessionError> {
        self.questions
            .get(self.current)
            .ok_or(SessionError::Exhausted)
    }

    /// Judge the choice at `choice_index` against the current question.
    ///
    /// Pure: nothing is persisted here.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ChoiceOutOfRange` for an index outside the
    /// choice list and `SessionError::Exhausted` when there is no current
    /// question.
    pub fn check_answer(&self, choice_index: usize) -> Result<bool, SessionError> {
        let question = self.current()?;
        let choices = question.choices();
        let choice = choices.get(choice_index).ok_or(SessionError::ChoiceOutOfRange {
            index: choice_index,
            len: choices.len(),
        })?;
        Ok(question.is_correct_answer(choice))
    }

    /// Move to the next question. Returns `false` once the session is exhausted.
    pub fn advance(&mut self) -> bool {
        if self.current < self.questions.len() {
            self.current += 1;
        }
        self.current < self.questions.len()
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("course_id", &self.course_id)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
