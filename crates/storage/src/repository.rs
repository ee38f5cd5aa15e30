use async_trait::async_trait;
use recall_core::model::{
    AnswerChoices, AnswerEvent, CourseId, NewQuiz, Question, QuestionError, QuestionId,
    QuestionType, QuizCreation, QuizId, QuizStats, QuizStatsError,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of a question row.
///
/// The type name and the choices payload are kept exactly as stored so a
/// corrupt row can be reported (and skipped) by the caller instead of failing
/// the whole query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub quiz_id: QuizId,
    pub question_type: String,
    pub text: String,
    pub explanation: Option<String>,
    pub answer_choices: String,
    pub correct_answer: String,
}

impl QuestionRecord {
    /// Decode the record into a domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the type is unknown, the choices payload is
    /// malformed, or a multiple choice answer is not among its choices.
    pub fn into_question(self) -> Result<Question, QuestionError> {
        let kind: QuestionType = self.question_type.parse()?;
        let choices = if kind == QuestionType::MultipleChoice {
            AnswerChoices::from_json(&self.answer_choices)?
        } else {
            AnswerChoices::from_json(&self.answer_choices).unwrap_or_default()
        };

        Question::from_persisted(
            self.id,
            self.quiz_id,
            kind,
            self.text,
            self.explanation,
            choices,
            self.correct_answer,
        )
    }
}

/// A stored answer event together with its row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerLogRow {
    pub id: i64,
    pub event: AnswerEvent,
}

/// Raw aggregate counts for one quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRecord {
    pub course_id: CourseId,
    pub question_count: u32,
    pub total_answers: u32,
    pub correct_answers: u32,
}

impl StatsRecord {
    /// # Errors
    ///
    /// Returns `QuizStatsError` if the counts are inconsistent.
    pub fn into_stats(self) -> Result<QuizStats, QuizStatsError> {
        QuizStats::new(
            self.course_id,
            self.question_count,
            self.total_answers,
            self.correct_answers,
        )
    }
}

/// Quiz and question storage.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Insert a quiz with all its questions. A quiz that already exists for the
    /// course is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the quiz cannot be stored.
    async fn create_quiz(&self, quiz: &NewQuiz) -> Result<QuizCreation, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on query failures.
    async fn quiz_id_for_course(&self, course: &CourseId) -> Result<Option<QuizId>, StorageError>;

    /// Multiple choice questions of the course that were never answered
    /// correctly, ordered by id ascending.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failures.
    async fn pending_questions(
        &self,
        course: &CourseId,
    ) -> Result<Vec<QuestionRecord>, StorageError>;
}

/// Append-only answer log.
#[async_trait]
pub trait AnswerLogRepository: Send + Sync {
    /// Append one answer event, returning its row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the event cannot be written.
    async fn append_answer(&self, event: &AnswerEvent) -> Result<i64, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on query failures.
    async fn answers_for_question(
        &self,
        question_id: QuestionId,
    ) -> Result<Vec<AnswerLogRow>, StorageError>;
}

/// Read-side aggregates over quizzes, questions and answers.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Counts for one course, or `None` if the course has no quiz.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failures.
    async fn course_stats(&self, course: &CourseId) -> Result<Option<StatsRecord>, StorageError>;

    /// Counts for every quiz, ordered by course id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failures.
    async fn all_stats(&self) -> Result<Vec<StatsRecord>, StorageError>;
}

#[derive(Default)]
struct MemoryState {
    quizzes: Vec<(QuizId, CourseId)>,
    questions: Vec<QuestionRecord>,
    answers: Vec<AnswerLogRow>,
}

impl MemoryState {
    fn quiz_for(&self, course: &CourseId) -> Option<QuizId> {
        self.quizzes
            .iter()
            .find(|(_, c)| c == course)
            .map(|(id, _)| *id)
    }

    fn questions_for(&self, course: &CourseId) -> Vec<QuestionRecord> {
        let Some(quiz_id) = self.quiz_for(course) else {
            return Vec::new();
        };
        let mut out: Vec<_> = self
            .questions
            .iter()
            .filter(|q| q.quiz_id == quiz_id)
            .cloned()
            .collect();
        out.sort_by_key(|q| q.id);
        out
    }

    fn stats_for(&self, quiz_id: QuizId, course: &CourseId) -> StatsRecord {
        let question_ids: HashSet<QuestionId> = self
            .questions
            .iter()
            .filter(|q| q.quiz_id == quiz_id)
            .map(|q| q.id)
            .collect();
        let answers = self
            .answers
            .iter()
            .filter(|a| question_ids.contains(&a.event.question_id));
        let (total, correct) = answers.fold((0u32, 0u32), |(t, c), a| {
            (t + 1, c + u32::from(a.event.is_correct))
        });
        StatsRecord {
            course_id: course.clone(),
            question_count: u32::try_from(question_ids.len()).unwrap_or(u32::MAX),
            total_answers: total,
            correct_answers: correct,
        }
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    /// Store a raw question row as-is, bypassing validation.
    ///
    /// Lets tests plant rows that only a damaged database would contain.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the quiz does not exist.
    pub fn insert_raw_question(&self, record: QuestionRecord) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.quizzes.iter().any(|(id, _)| *id == record.quiz_id) {
            return Err(StorageError::NotFound);
        }
        guard.questions.push(record);
        Ok(())
    }
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn create_quiz(&self, quiz: &NewQuiz) -> Result<QuizCreation, StorageError> {
        let mut guard = self.lock()?;
        if let Some(existing) = guard.quiz_for(&quiz.course_id) {
            return Ok(QuizCreation::AlreadyExists(existing));
        }

        let quiz_id = QuizId::new(guard.quizzes.len() as u64 + 1);
        guard.quizzes.push((quiz_id, quiz.course_id.clone()));
        for draft in &quiz.questions {
            let id = QuestionId::new(guard.questions.len() as u64 + 1);
            guard.questions.push(QuestionRecord {
                id,
                quiz_id,
                question_type: draft.kind.as_str().to_owned(),
                text: draft.text.clone(),
                explanation: draft.explanation.clone(),
                answer_choices: draft.choices.to_json(),
                correct_answer: draft.correct_answer.clone(),
            });
        }
        Ok(QuizCreation::Created(quiz_id))
    }

    async fn quiz_id_for_course(&self, course: &CourseId) -> Result<Option<QuizId>, StorageError> {
        Ok(self.lock()?.quiz_for(course))
    }

    async fn pending_questions(
        &self,
        course: &CourseId,
    ) -> Result<Vec<QuestionRecord>, StorageError> {
        let guard = self.lock()?;
        let answered: HashSet<QuestionId> = guard
            .answers
            .iter()
            .filter(|a| a.event.is_correct)
            .map(|a| a.event.question_id)
            .collect();
        Ok(guard
            .questions_for(course)
            .into_iter()
            .filter(|q| {
                q.question_type
                    .parse::<QuestionType>()
                    .is_ok_and(QuestionType::is_playable)
            })
            .filter(|q| !answered.contains(&q.id))
            .collect())
    }
}

#[async_trait]
impl AnswerLogRepository for InMemoryRepository {
    async fn append_answer(&self, event: &AnswerEvent) -> Result<i64, StorageError> {
        let mut guard = self.lock()?;
        if !guard.questions.iter().any(|q| q.id == event.question_id) {
            return Err(StorageError::Conflict);
        }
        let id = i64::try_from(guard.answers.len())
            .map_err(|_| StorageError::Serialization("answer id overflow".into()))?
            + 1;
        guard.answers.push(AnswerLogRow {
            id,
            event: event.clone(),
        });
        Ok(id)
    }

    async fn answers_for_question(
        &self,
        question_id: QuestionId,
    ) -> Result<Vec<AnswerLogRow>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .answers
            .iter()
            .filter(|a| a.event.question_id == question_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StatsRepository for InMemoryRepository {
    async fn course_stats(&self, course: &CourseId) -> Result<Option<StatsRecord>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .quiz_for(course)
            .map(|quiz_id| guard.stats_for(quiz_id, course)))
    }

    async fn all_stats(&self) -> Result<Vec<StatsRecord>, StorageError> {
        let guard = self.lock()?;
        let mut out: Vec<_> = guard
            .quizzes
            .iter()
            .map(|(id, course)| guard.stats_for(*id, course))
            .collect();
        out.sort_by(|a, b| a.course_id.cmp(&b.course_id));
        Ok(out)
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub quizzes: Arc<dyn QuizRepository>,
    pub answers: Arc<dyn AnswerLogRepository>,
    pub stats: Arc<dyn StatsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repo(InMemoryRepository::new())
    }

    /// Share one repository value across every trait object.
    #[must_use]
    pub fn from_repo<R>(repo: R) -> Self
    where
        R: QuizRepository + AnswerLogRepository + StatsRepository + Clone + 'static,
    {
        let quizzes: Arc<dyn QuizRepository> = Arc::new(repo.clone());
        let answers: Arc<dyn AnswerLogRepository> = Arc::new(repo.clone());
        let stats: Arc<dyn StatsRepository> = Arc::new(repo);
        Self {
            quizzes,
            answers,
            stats,
        }
    }
}
