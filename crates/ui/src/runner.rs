use std::time::Duration;

use crossterm::event::{Event, KeyEventKind};
use services::{Completion, Input, SessionController};
use tracing::debug;

use crate::error::UiError;
use crate::terminal::{TuiTerminal, poll_event};
use crate::views::render_quiz;
use crate::vm::QuizVm;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Run an interactive quiz until it completes or the user quits.
///
/// The terminal is restored on every exit path before this returns.
///
/// # Errors
///
/// Returns `UiError` if the terminal fails or an answer cannot be recorded.
pub async fn run_quiz(controller: SessionController) -> Result<Completion, UiError> {
    let mut tui = TuiTerminal::new()?;
    let mut vm = QuizVm::new(controller);

    let outcome = drive(&mut tui, &mut vm).await;
    tui.restore()?;
    outcome?;

    Ok(vm.completion().cloned().unwrap_or(Completion::Quit))
}

async fn drive(tui: &mut TuiTerminal, vm: &mut QuizVm) -> Result<(), UiError> {
    let mut dirty = true;
    loop {
        if dirty {
            let screen = vm.screen();
            tui.terminal().draw(|frame| render_quiz(frame, &screen))?;
        }

        let event = poll_event(POLL_INTERVAL)?;
        if event.is_none() {
            dirty = false;
            tokio::task::yield_now().await;
            continue;
        }
        dirty = true;
        if step(vm, event).await? == Flow::Exit {
            return Ok(());
        }
    }
}

/// Feed one polled event (or a poll timeout) into the view-model.
async fn step(vm: &mut QuizVm, event: Option<Event>) -> Result<Flow, UiError> {
    match event {
        Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
            if vm.is_finished() {
                return Ok(Flow::Exit);
            }
            let state = vm.on_key(key).await?;
            debug!(?key, ?state, "handled key");
        }
        Some(Event::Resize(..)) => {
            vm.dispatch(Input::Redraw).await?;
        }
        _ => {}
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use recall_core::Clock;
    use recall_core::model::{CourseId, NewQuiz, QuestionDraft};
    use recall_core::time::fixed_now;
    use services::{QuizService, StatsService};
    use storage::repository::{InMemoryRepository, QuizRepository};

    use crate::vm::QuizScreen;

    async fn one_question_vm() -> QuizVm {
        let repo = InMemoryRepository::new();
        let course = CourseId::new("C1").unwrap();
        repo.create_quiz(&NewQuiz {
            course_id: course.clone(),
            questions: vec![QuestionDraft::multiple_choice(
                "Q",
                &["yes", "no"],
                "yes",
                None,
            )],
        })
        .await
        .unwrap();

        let quizzes = QuizService::new(
            Clock::fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        );
        let stats = StatsService::new(Arc::new(repo));
        let controller = SessionController::start_with_rng(
            &course,
            quizzes,
            stats,
            &mut StdRng::seed_from_u64(1),
        )
        .await
        .unwrap()
        .unwrap();
        QuizVm::new(controller)
    }

    fn press(code: KeyCode) -> Option<Event> {
        Some(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    #[tokio::test]
    async fn idle_polls_and_resizes_change_nothing() {
        let mut vm = one_question_vm().await;
        let before = vm.screen();

        assert_eq!(step(&mut vm, None).await.unwrap(), Flow::Continue);
        assert_eq!(
            step(&mut vm, Some(Event::Resize(80, 24))).await.unwrap(),
            Flow::Continue
        );
        assert_eq!(vm.screen(), before);
    }

    #[tokio::test]
    async fn key_releases_are_ignored() {
        let mut vm = one_question_vm().await;
        let mut release = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;

        step(&mut vm, Some(Event::Key(release))).await.unwrap();
        assert!(!vm.is_finished());
    }

    #[tokio::test]
    async fn any_key_exits_once_finished() {
        let mut vm = one_question_vm().await;
        let flow = step(&mut vm, press(KeyCode::Char('q'))).await.unwrap();
        assert_eq!(flow, Flow::Continue);
        assert!(vm.is_finished());
        assert_eq!(vm.screen(), QuizScreen::Ended);

        let flow = step(&mut vm, press(KeyCode::Char('x'))).await.unwrap();
        assert_eq!(flow, Flow::Exit);
    }

    #[tokio::test]
    async fn answering_the_last_question_reaches_the_summary() {
        let mut vm = one_question_vm().await;
        let QuizScreen::Question { choices, .. } = vm.screen() else {
            panic!("expected question screen");
        };
        let number = choices.iter().find(|c| c.text == "yes").unwrap().number;
        let digit = char::from_digit(u32::try_from(number).unwrap(), 10).unwrap();

        step(&mut vm, press(KeyCode::Char(digit))).await.unwrap();
        step(&mut vm, press(KeyCode::Enter)).await.unwrap();

        assert!(vm.is_finished());
        let QuizScreen::Summary(stats) = vm.screen() else {
            panic!("expected summary");
        };
        assert_eq!(stats.correct_answers(), 1);
    }
}
