use thiserror::Error;

use crate::model::ids::CourseId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizStatsError {
    #[error("correct answers ({correct}) exceed total answers ({total})")]
    CountMismatch { correct: u32, total: u32 },
}

/// Correctness over the answer log; `NoData` when nothing was answered yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correctness {
    NoData,
    Rate(f64),
}

/// Aggregate answer statistics for one course, derived from the answer log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizStats {
    course_id: CourseId,
    question_count: u32,
    total_answers: u32,
    correct_answers: u32,
}

impl QuizStats {
    /// # Errors
    ///
    /// Returns `QuizStatsError::CountMismatch` if `correct_answers > total_answers`.
    pub fn new(
        course_id: CourseId,
        question_count: u32,
        total_answers: u32,
        correct_answers: u32,
    ) -> Result<Self, QuizStatsError> {
        if correct_answers > total_answers {
            return Err(QuizStatsError::CountMismatch {
                correct: correct_answers,
                total: total_answers,
            });
        }
        Ok(Self {
            course_id,
            question_count,
            total_answers,
            correct_answers,
        })
    }

    /// Stats for a course that has no quiz.
    #[must_use]
    pub fn empty(course_id: CourseId) -> Self {
        Self {
            course_id,
            question_count: 0,
            total_answers: 0,
            correct_answers: 0,
        }
    }

    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    #[must_use]
    pub fn total_answers(&self) -> u32 {
        self.total_answers
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn correctness(&self) -> Correctness {
        if self.total_answers == 0 {
            return Correctness::NoData;
        }
        Correctness::Rate(
            f64::from(self.correct_answers) / f64::from(self.total_answers) * 100.0,
        )
    }
}
