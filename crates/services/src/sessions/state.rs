/// Where an interactive quiz session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Showing the current question, waiting for a choice.
    #[default]
    Question,
    /// Showing feedback for an answer that has already been recorded.
    Answer { chosen_index: usize, was_correct: bool },
    /// Terminal. `quit` is true when the user left before the end.
    Completed { quit: bool },
}

/// User intent, already decoded from raw key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Confirm(usize),
    Next,
    Quit,
    /// Resize or an unbound key: re-render only.
    Redraw,
}

/// Work the controller has to do before the state can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Nothing,
    Submit(usize),
    Advance,
    Quit,
}

/// Resolved result of a `Command`, fed back into `SessionState::apply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Answered { chosen_index: usize, was_correct: bool },
    Rejected,
    Advanced { has_next: bool },
    QuitRequested,
}

impl SessionState {
    #[must_use]
    pub fn is_completed(self) -> bool {
        matches!(self, SessionState::Completed { .. })
    }

    /// Decide what an input asks for in this state.
    #[must_use]
    pub fn command_for(self, input: Input) -> Command {
        match (self, input) {
            (SessionState::Completed { .. }, _) | (_, Input::Redraw) => Command::Nothing,
            (_, Input::Quit) => Command::Quit,
            (SessionState::Question, Input::Confirm(index)) => Command::Submit(index),
            (SessionState::Answer { .. }, Input::Next) => Command::Advance,
            (SessionState::Question, Input::Next)
            | (SessionState::Answer { .. }, Input::Confirm(_)) => Command::Nothing,
        }
    }

    /// Pure transition over a resolved event. Events that do not fit the
    /// current state leave it unchanged; nothing leaves `Completed`.
    #[must_use]
    pub fn apply(self, event: Event) -> SessionState {
        match (self, event) {
            (SessionState::Completed { .. }, _) => self,
            (_, Event::QuitRequested) => SessionState::Completed { quit: true },
            (
                SessionState::Question,
                Event::Answered {
                    chosen_index,
                    was_correct,
                },
            ) => SessionState::Answer {
                chosen_index,
                was_correct,
            },
            (SessionState::Question, Event::Rejected) => SessionState::Question,
            (SessionState::Answer { .. }, Event::Advanced { has_next: true }) => {
                SessionState::Question
            }
            (SessionState::Answer { .. }, Event::Advanced { has_next: false }) => {
                SessionState::Completed { quit: false }
            }
            (state, _) => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANSWERED: SessionState = SessionState::Answer {
        chosen_index: 1,
        was_correct: false,
    };

    #[test]
    fn question_confirm_submits() {
        assert_eq!(
            SessionState::Question.command_for(Input::Confirm(2)),
            Command::Submit(2)
        );
        assert_eq!(SessionState::Question.command_for(Input::Next), Command::Nothing);
    }

    #[test]
    fn answer_state_never_resubmits() {
        assert_eq!(ANSWERED.command_for(Input::Confirm(0)), Command::Nothing);
        assert_eq!(ANSWERED.command_for(Input::Redraw), Command::Nothing);
        assert_eq!(ANSWERED.command_for(Input::Next), Command::Advance);
    }

    #[test]
    fn quit_from_any_live_state() {
        assert_eq!(SessionState::Question.command_for(Input::Quit), Command::Quit);
        assert_eq!(ANSWERED.command_for(Input::Quit), Command::Quit);
        assert_eq!(
            ANSWERED.apply(Event::QuitRequested),
            SessionState::Completed { quit: true }
        );
    }

    #[test]
    fn full_cycle() {
        let s = SessionState::default();
        let s = s.apply(Event::Rejected);
        assert_eq!(s, SessionState::Question);
        let s = s.apply(Event::Answered {
            chosen_index: 0,
            was_correct: true,
        });
        assert_eq!(
            s,
            SessionState::Answer {
                chosen_index: 0,
                was_correct: true
            }
        );
        let s = s.apply(Event::Advanced { has_next: true });
        assert_eq!(s, SessionState::Question);
        let s = s
            .apply(Event::Answered {
                chosen_index: 3,
                was_correct: false,
            })
            .apply(Event::Advanced { has_next: false });
        assert_eq!(s, SessionState::Completed { quit: false });
    }

    #[test]
    fn completed_is_terminal() {
        let done = SessionState::Completed { quit: false };
        for input in [Input::Confirm(0), Input::Next, Input::Quit, Input::Redraw] {
            assert_eq!(done.command_for(input), Command::Nothing);
        }
        for event in [
            Event::Rejected,
            Event::QuitRequested,
            Event::Advanced { has_next: true },
            Event::Answered {
                chosen_index: 0,
                was_correct: true,
            },
        ] {
            assert_eq!(done.apply(event), done);
        }
    }

    #[test]
    fn mismatched_events_are_ignored() {
        assert_eq!(
            SessionState::Question.apply(Event::Advanced { has_next: true }),
            SessionState::Question
        );
        assert_eq!(
            ANSWERED.apply(Event::Answered {
                chosen_index: 0,
                was_correct: true
            }),
            ANSWERED
        );
    }
}
