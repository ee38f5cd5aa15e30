use rand::Rng;
use recall_core::model::{CourseId, Question, QuizStats};
use tracing::{debug, info, warn};

use super::session::QuizSession;
use super::state::{Command, Event, Input, SessionState};
use crate::error::SessionError;
use crate::quiz_service::QuizService;
use crate::stats_service::StatsService;

/// Transient message shown next to the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    InvalidChoice { index: usize, len: usize },
}

/// How a finished session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Quit,
    Summary(QuizStats),
}

/// Drives one interactive session: decodes intents into commands, performs
/// the side effects, then applies the resulting transition.
///
/// An answer is appended to the log before the state moves to `Answer`; a
/// failed write leaves the state untouched.
pub struct SessionController {
    session: QuizSession,
    quizzes: QuizService,
    stats: StatsService,
    state: SessionState,
    notice: Option<Notice>,
}

impl SessionController {
    #[must_use]
    pub fn new(session: QuizSession, quizzes: QuizService, stats: StatsService) -> Self {
        Self {
            session,
            quizzes,
            stats,
            state: SessionState::Question,
            notice: None,
        }
    }

    /// Load the pending questions of `course` and start a shuffled session.
    ///
    /// Returns `Ok(None)` when nothing is pending.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Load` if the questions cannot be read.
    pub async fn start(
        course: &CourseId,
        quizzes: QuizService,
        stats: StatsService,
    ) -> Result<Option<Self>, SessionError> {
        let Some(quiz) = quizzes.load_pending_quiz(course).await? else {
            return Ok(None);
        };
        info!(%course, questions = quiz.len(), "starting quiz session");
        Ok(Some(Self::new(QuizSession::new(quiz), quizzes, stats)))
    }

    /// Same as `start`, shuffling with the given RNG.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Load` if the questions cannot be read.
    pub async fn start_with_rng<R: Rng + ?Sized>(
        course: &CourseId,
        quizzes: QuizService,
        stats: StatsService,
        rng: &mut R,
    ) -> Result<Option<Self>, SessionError> {
        let Some(quiz) = quizzes.load_pending_quiz(course).await? else {
            return Ok(None);
        };
        let session = QuizSession::with_rng(quiz, rng);
        Ok(Some(Self::new(session, quizzes, stats)))
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    /// The question on screen, or `None` after the last one.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.session.current().ok()
    }

    /// Handle one decoded input and return the new state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Record` when the answer could not be written. The
    /// state stays on the question so the user can try again.
    pub async fn handle(&mut self, input: Input) -> Result<SessionState, SessionError> {
        let event = match self.state.command_for(input) {
            Command::Nothing => return Ok(self.state),
            Command::Submit(index) => self.submit(index).await?,
            Command::Advance => {
                let has_next = self.session.advance();
                Event::Advanced { has_next }
            }
            Command::Quit => {
                debug!(position = self.session.position(), "quit requested");
                Event::QuitRequested
            }
        };

        self.state = self.state.apply(event);
        Ok(self.state)
    }

    async fn submit(&mut self, index: usize) -> Result<Event, SessionError> {
        let was_correct = match self.session.check_answer(index) {
            Ok(correct) => correct,
            Err(SessionError::ChoiceOutOfRange { index, len }) => {
                self.notice = Some(Notice::InvalidChoice { index, len });
                return Ok(Event::Rejected);
            }
            Err(err) => return Err(err),
        };

        let question = self.session.current()?;
        let question_id = question.id();
        let submitted = question.choices().get(index).unwrap_or_default().to_owned();

        if let Err(source) = self
            .quizzes
            .record_answer(question_id, &submitted, was_correct)
            .await
        {
            warn!(%question_id, error = %source, "answer was not recorded");
            return Err(SessionError::Record {
                question_id,
                source,
            });
        }

        self.notice = None;
        Ok(Event::Answered {
            chosen_index: index,
            was_correct,
        })
    }

    /// Outcome of a finished session; `None` while it is still running.
    ///
    /// A session that ran to the end reports stats freshly computed from the log.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Stats` if the stats query fails.
    pub async fn completion(&self) -> Result<Option<Completion>, SessionError> {
        match self.state {
            SessionState::Completed { quit: true } => Ok(Some(Completion::Quit)),
            SessionState::Completed { quit: false } => {
                let stats = self.stats.compute_stats(self.session.course_id()).await?;
                Ok(Some(Completion::Summary(stats)))
            }
            SessionState::Question | SessionState::Answer { .. } => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use recall_core::Clock;
    use recall_core::model::{AnswerEvent, Correctness, NewQuiz, QuestionDraft, QuestionId};
    use recall_core::time::fixed_now;
    use storage::repository::{
        AnswerLogRepository, AnswerLogRow, InMemoryRepository, QuizRepository, StorageError,
    };

    fn course() -> CourseId {
        CourseId::new("C1").unwrap()
    }

    async fn seeded_repo() -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        repo.create_quiz(&NewQuiz {
            course_id: course(),
            questions: vec![
                QuestionDraft::multiple_choice("Q1", &["a", "b", "c"], "a", None),
                QuestionDraft::multiple_choice("Q2", &["a", "b", "c"], "b", None),
                QuestionDraft::multiple_choice("Q3", &["a", "b", "c"], "c", None),
            ],
        })
        .await
        .unwrap();
        repo
    }

    fn services(
        repo: &InMemoryRepository,
        answers: Arc<dyn AnswerLogRepository>,
    ) -> (QuizService, StatsService) {
        let quizzes = QuizService::new(Clock::fixed(fixed_now()), Arc::new(repo.clone()), answers);
        let stats = StatsService::new(Arc::new(repo.clone()));
        (quizzes, stats)
    }

    async fn controller(repo: &InMemoryRepository) -> SessionController {
        let (quizzes, stats) = services(repo, Arc::new(repo.clone()));
        SessionController::start_with_rng(&course(), quizzes, stats, &mut StdRng::seed_from_u64(3))
            .await
            .unwrap()
            .unwrap()
    }

    fn correct_index(ctrl: &SessionController) -> usize {
        ctrl.current_question().unwrap().correct_index().unwrap()
    }

    fn wrong_index(ctrl: &SessionController) -> usize {
        let q = ctrl.current_question().unwrap();
        (q.correct_index().unwrap() + 1) % q.choices().len()
    }

    #[tokio::test]
    async fn nothing_pending_yields_no_controller() {
        let repo = InMemoryRepository::new();
        let (quizzes, stats) = services(&repo, Arc::new(repo.clone()));
        let ctrl = SessionController::start(&course(), quizzes, stats).await.unwrap();
        assert!(ctrl.is_none());
    }

    #[tokio::test]
    async fn full_run_records_every_answer_and_reports_stats() {
        let repo = seeded_repo().await;
        let mut ctrl = controller(&repo).await;

        // correct, wrong, correct
        for (step, correct) in [true, false, true].into_iter().enumerate() {
            let index = if correct {
                correct_index(&ctrl)
            } else {
                wrong_index(&ctrl)
            };
            let state = ctrl.handle(Input::Confirm(index)).await.unwrap();
            assert_eq!(
                state,
                SessionState::Answer {
                    chosen_index: index,
                    was_correct: correct
                }
            );
            assert!(ctrl.completion().await.unwrap().is_none());
            let next = ctrl.handle(Input::Next).await.unwrap();
            if step < 2 {
                assert_eq!(next, SessionState::Question);
            } else {
                assert_eq!(next, SessionState::Completed { quit: false });
            }
        }

        let Some(Completion::Summary(stats)) = ctrl.completion().await.unwrap() else {
            panic!("expected a summary");
        };
        assert_eq!(stats.question_count(), 3);
        assert_eq!(stats.total_answers(), 3);
        assert_eq!(stats.correct_answers(), 2);
        assert!(matches!(stats.correctness(), Correctness::Rate(r) if (r - 66.666).abs() < 0.01));

        // only the wrongly answered question is still pending
        let (quizzes, _) = services(&repo, Arc::new(repo.clone()));
        let pending = quizzes.load_pending_quiz(&course()).await.unwrap().unwrap();
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn out_of_range_choice_stays_on_the_question() {
        let repo = seeded_repo().await;
        let mut ctrl = controller(&repo).await;

        let state = ctrl.handle(Input::Confirm(42)).await.unwrap();
        assert_eq!(state, SessionState::Question);
        assert_eq!(
            ctrl.notice(),
            Some(Notice::InvalidChoice { index: 42, len: 3 })
        );

        let q = ctrl.current_question().unwrap().id();
        assert!(repo.answers_for_question(q).await.unwrap().is_empty());

        let index = correct_index(&ctrl);
        ctrl.handle(Input::Confirm(index)).await.unwrap();
        assert_eq!(ctrl.notice(), None);
    }

    #[tokio::test]
    async fn redraw_and_repeat_confirm_do_not_write() {
        let repo = seeded_repo().await;
        let mut ctrl = controller(&repo).await;
        let q = ctrl.current_question().unwrap().id();

        assert_eq!(ctrl.handle(Input::Redraw).await.unwrap(), SessionState::Question);
        let index = wrong_index(&ctrl);
        ctrl.handle(Input::Confirm(index)).await.unwrap();
        let answered = ctrl.state();
        assert_eq!(ctrl.handle(Input::Confirm(0)).await.unwrap(), answered);
        assert_eq!(ctrl.handle(Input::Redraw).await.unwrap(), answered);

        assert_eq!(repo.answers_for_question(q).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn quit_mid_session_keeps_earlier_answers() {
        let repo = seeded_repo().await;
        let mut ctrl = controller(&repo).await;
        let first = ctrl.current_question().unwrap().id();

        let index = correct_index(&ctrl);
        ctrl.handle(Input::Confirm(index)).await.unwrap();
        ctrl.handle(Input::Next).await.unwrap();
        let state = ctrl.handle(Input::Quit).await.unwrap();
        assert_eq!(state, SessionState::Completed { quit: true });
        assert_eq!(ctrl.completion().await.unwrap(), Some(Completion::Quit));

        assert_eq!(repo.answers_for_question(first).await.unwrap().len(), 1);
        assert_eq!(ctrl.handle(Input::Next).await.unwrap(), state);
    }

    #[derive(Clone)]
    struct FailingLog;

    #[async_trait]
    impl AnswerLogRepository for FailingLog {
        async fn append_answer(&self, _event: &AnswerEvent) -> Result<i64, StorageError> {
            Err(StorageError::Connection("disk full".into()))
        }

        async fn answers_for_question(
            &self,
            _question_id: QuestionId,
        ) -> Result<Vec<AnswerLogRow>, StorageError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn failed_write_does_not_show_feedback() {
        let repo = seeded_repo().await;
        let (quizzes, stats) = services(&repo, Arc::new(FailingLog));
        let mut ctrl = SessionController::start_with_rng(
            &course(),
            quizzes,
            stats,
            &mut StdRng::seed_from_u64(3),
        )
        .await
        .unwrap()
        .unwrap();

        let index = correct_index(&ctrl);
        let err = ctrl.handle(Input::Confirm(index)).await.unwrap_err();
        assert!(matches!(err, SessionError::Record { .. }));
        assert_eq!(ctrl.state(), SessionState::Question);
    }
}
