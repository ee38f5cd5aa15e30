use crossterm::event::KeyEvent;
use recall_core::model::{Question, QuizStats};
use services::{Completion, Input, Notice, SessionController, SessionError, SessionState};

use crate::keymap::{KeyAction, map_key};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChoiceMark {
    Plain,
    Cursor,
    Correct,
    Wrong,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceLine {
    pub number: usize,
    pub text: String,
    pub mark: ChoiceMark,
}

/// Everything the quiz view needs for one frame.
#[derive(Clone, Debug, PartialEq)]
pub enum QuizScreen {
    Question {
        position: usize,
        total: usize,
        prompt: String,
        choices: Vec<ChoiceLine>,
        notice: Option<String>,
    },
    Answer {
        position: usize,
        total: usize,
        prompt: String,
        choices: Vec<ChoiceLine>,
        was_correct: bool,
        explanation: Option<String>,
    },
    Summary(QuizStats),
    Ended,
}

/// Owns the session controller plus the choice cursor, which is pure view state.
pub struct QuizVm {
    controller: SessionController,
    cursor: usize,
    completion: Option<Completion>,
}

impl QuizVm {
    #[must_use]
    pub fn new(controller: SessionController) -> Self {
        Self {
            controller,
            cursor: 0,
            completion: None,
        }
    }

    /// Set once the session is over and its outcome has been resolved.
    #[must_use]
    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.completion.is_some()
    }

    /// Apply a key press.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when an answer cannot be recorded or the final
    /// stats cannot be loaded.
    pub async fn on_key(&mut self, key: KeyEvent) -> Result<SessionState, SessionError> {
        match map_key(key, self.controller.state(), self.cursor) {
            KeyAction::CursorUp => {
                self.cursor = self.cursor.saturating_sub(1);
                Ok(self.controller.state())
            }
            KeyAction::CursorDown => {
                let len = self.choice_count();
                if self.cursor + 1 < len {
                    self.cursor += 1;
                }
                Ok(self.controller.state())
            }
            KeyAction::Session(input) => self.dispatch(input).await,
        }
    }

    /// Forward a decoded input to the controller.
    ///
    /// # Errors
    ///
    /// See `on_key`.
    pub async fn dispatch(&mut self, input: Input) -> Result<SessionState, SessionError> {
        let before = self.controller.state();
        let after = self.controller.handle(input).await?;

        if matches!(before, SessionState::Answer { .. }) && after == SessionState::Question {
            self.cursor = 0;
        }
        if after.is_completed() && self.completion.is_none() {
            self.completion = self.controller.completion().await?;
        }
        Ok(after)
    }

    fn choice_count(&self) -> usize {
        self.controller
            .current_question()
            .map_or(0, |question| question.choices().len())
    }

    #[must_use]
    pub fn screen(&self) -> QuizScreen {
        let state = self.controller.state();
        if state.is_completed() {
            return match &self.completion {
                Some(Completion::Summary(stats)) => QuizScreen::Summary(stats.clone()),
                Some(Completion::Quit) | None => QuizScreen::Ended,
            };
        }

        let Some(question) = self.controller.current_question() else {
            return QuizScreen::Ended;
        };
        let session = self.controller.session();
        let position = session.position();
        let total = session.len();
        let prompt = question.text().to_owned();

        match state {
            SessionState::Answer {
                chosen_index,
                was_correct,
            } => QuizScreen::Answer {
                position,
                total,
                prompt,
                choices: answer_lines(question, chosen_index),
                was_correct,
                explanation: question.explanation().map(ToOwned::to_owned),
            },
            _ => QuizScreen::Question {
                position,
                total,
                prompt,
                choices: question_lines(question, self.cursor),
                notice: self.controller.notice().map(notice_text),
            },
        }
    }
}

fn question_lines(question: &Question, cursor: usize) -> Vec<ChoiceLine> {
    question
        .choices()
        .as_slice()
        .iter()
        .enumerate()
        .map(|(index, text)| ChoiceLine {
            number: index + 1,
            text: text.clone(),
            mark: if index == cursor {
                ChoiceMark::Cursor
            } else {
                ChoiceMark::Plain
            },
        })
        .collect()
}

fn answer_lines(question: &Question, chosen_index: usize) -> Vec<ChoiceLine> {
    question
        .choices()
        .as_slice()
        .iter()
        .enumerate()
        .map(|(index, text)| {
            let mark = if question.is_correct_answer(text) {
                ChoiceMark::Correct
            } else if index == chosen_index {
                ChoiceMark::Wrong
            } else {
                ChoiceMark::Plain
            };
            ChoiceLine {
                number: index + 1,
                text: text.clone(),
                mark,
            }
        })
        .collect()
}

fn notice_text(notice: Notice) -> String {
    match notice {
        Notice::InvalidChoice { index, len } => {
            format!("There is no choice {}. Pick a number from 1 to {len}.", index + 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crossterm::event::{KeyCode, KeyModifiers};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use recall_core::Clock;
    use recall_core::model::{CourseId, NewQuiz, QuestionDraft};
    use recall_core::time::fixed_now;
    use services::{QuizService, StatsService};
    use storage::repository::{InMemoryRepository, QuizRepository};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn vm(questions: usize) -> QuizVm {
        let repo = InMemoryRepository::new();
        let course = CourseId::new("C1").unwrap();
        repo.create_quiz(&NewQuiz {
            course_id: course.clone(),
            questions: (0..questions)
                .map(|i| {
                    QuestionDraft::multiple_choice(
                        format!("Q{i}"),
                        &["red", "green", "blue"],
                        "green",
                        Some("green it is"),
                    )
                })
                .collect(),
        })
        .await
        .unwrap();

        let quizzes = QuizService::new(
            Clock::fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        );
        let stats = StatsService::new(Arc::new(repo));
        let mut rng = StdRng::seed_from_u64(9);
        let controller = SessionController::start_with_rng(&course, quizzes, stats, &mut rng)
            .await
            .unwrap()
            .unwrap();
        QuizVm::new(controller)
    }

    fn correct_number(vm: &QuizVm) -> char {
        let index = vm
            .controller
            .current_question()
            .unwrap()
            .correct_index()
            .unwrap();
        char::from_digit(index as u32 + 1, 10).unwrap()
    }

    #[tokio::test]
    async fn cursor_is_clamped_to_the_choices() {
        let mut vm = vm(1).await;
        vm.on_key(key(KeyCode::Up)).await.unwrap();
        assert_eq!(vm.cursor, 0);
        for _ in 0..5 {
            vm.on_key(key(KeyCode::Down)).await.unwrap();
        }
        assert_eq!(vm.cursor, 2);
        vm.on_key(key(KeyCode::Char('k'))).await.unwrap();
        assert_eq!(vm.cursor, 1);

        let QuizScreen::Question { choices, .. } = vm.screen() else {
            panic!("expected question screen");
        };
        assert_eq!(choices[1].mark, ChoiceMark::Cursor);
        assert_eq!(choices[0].number, 1);
    }

    #[tokio::test]
    async fn answer_screen_marks_correct_and_chosen() {
        let mut vm = vm(2).await;
        let correct = vm
            .controller
            .current_question()
            .unwrap()
            .correct_index()
            .unwrap();
        let wrong = (correct + 1) % 3;
        vm.dispatch(Input::Confirm(wrong)).await.unwrap();

        let QuizScreen::Answer {
            choices,
            was_correct,
            explanation,
            position,
            total,
            ..
        } = vm.screen()
        else {
            panic!("expected answer screen");
        };
        assert!(!was_correct);
        assert_eq!((position, total), (1, 2));
        assert_eq!(explanation.as_deref(), Some("green it is"));
        assert_eq!(choices[correct].mark, ChoiceMark::Correct);
        assert_eq!(choices[wrong].mark, ChoiceMark::Wrong);
    }

    #[tokio::test]
    async fn out_of_range_digit_shows_a_notice() {
        let mut vm = vm(1).await;
        let state = vm.on_key(key(KeyCode::Char('9'))).await.unwrap();
        assert_eq!(state, SessionState::Question);
        let QuizScreen::Question { notice, .. } = vm.screen() else {
            panic!("expected question screen");
        };
        assert_eq!(
            notice.as_deref(),
            Some("There is no choice 9. Pick a number from 1 to 3.")
        );
    }

    #[tokio::test]
    async fn finishing_resolves_the_summary() {
        let mut vm = vm(2).await;
        for _ in 0..2 {
            vm.on_key(key(KeyCode::Down)).await.unwrap();
            let digit = correct_number(&vm);
            vm.on_key(key(KeyCode::Char(digit))).await.unwrap();
            vm.on_key(key(KeyCode::Char('n'))).await.unwrap();
            if !vm.is_finished() {
                assert_eq!(vm.cursor, 0);
            }
        }
        assert!(vm.is_finished());
        let QuizScreen::Summary(stats) = vm.screen() else {
            panic!("expected summary");
        };
        assert_eq!(stats.correct_answers(), 2);
    }

    #[tokio::test]
    async fn quitting_ends_without_summary() {
        let mut vm = vm(2).await;
        vm.on_key(key(KeyCode::Esc)).await.unwrap();
        assert_eq!(vm.completion(), Some(&Completion::Quit));
        assert_eq!(vm.screen(), QuizScreen::Ended);
    }
}
