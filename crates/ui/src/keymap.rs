use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use services::{Input, SessionState};

/// What a key press means on the quiz screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    CursorUp,
    CursorDown,
    Session(Input),
}

/// Decode a key press for the given state.
///
/// Digits pick a choice directly (1-based on screen). Keys with no meaning in
/// the current state become `Input::Redraw`.
#[must_use]
pub fn map_key(key: KeyEvent, state: SessionState, cursor: usize) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyAction::Session(Input::Quit);
    }

    match (state, key.code) {
        (_, KeyCode::Esc | KeyCode::Char('q')) => KeyAction::Session(Input::Quit),
        (SessionState::Question, KeyCode::Up | KeyCode::Char('k')) => KeyAction::CursorUp,
        (SessionState::Question, KeyCode::Down | KeyCode::Char('j')) => KeyAction::CursorDown,
        (SessionState::Question, KeyCode::Enter) => KeyAction::Session(Input::Confirm(cursor)),
        (SessionState::Question, KeyCode::Char(c)) => match c.to_digit(10) {
            Some(digit @ 1..=9) => KeyAction::Session(Input::Confirm(digit as usize - 1)),
            _ => KeyAction::Session(Input::Redraw),
        },
        (SessionState::Answer { .. }, KeyCode::Enter | KeyCode::Char('n')) => {
            KeyAction::Session(Input::Next)
        }
        _ => KeyAction::Session(Input::Redraw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    const ANSWER: SessionState = SessionState::Answer {
        chosen_index: 0,
        was_correct: true,
    };

    #[test]
    fn quit_keys_work_everywhere() {
        for state in [SessionState::Question, ANSWER] {
            assert_eq!(
                map_key(key(KeyCode::Char('q')), state, 0),
                KeyAction::Session(Input::Quit)
            );
            assert_eq!(map_key(key(KeyCode::Esc), state, 0), KeyAction::Session(Input::Quit));
            assert_eq!(
                map_key(
                    KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
                    state,
                    0
                ),
                KeyAction::Session(Input::Quit)
            );
        }
    }

    #[test]
    fn question_keys() {
        let q = SessionState::Question;
        assert_eq!(map_key(key(KeyCode::Up), q, 1), KeyAction::CursorUp);
        assert_eq!(map_key(key(KeyCode::Char('j')), q, 1), KeyAction::CursorDown);
        assert_eq!(
            map_key(key(KeyCode::Enter), q, 2),
            KeyAction::Session(Input::Confirm(2))
        );
        assert_eq!(
            map_key(key(KeyCode::Char('3')), q, 0),
            KeyAction::Session(Input::Confirm(2))
        );
        assert_eq!(
            map_key(key(KeyCode::Char('0')), q, 0),
            KeyAction::Session(Input::Redraw)
        );
        assert_eq!(
            map_key(key(KeyCode::Char('n')), q, 0),
            KeyAction::Session(Input::Redraw)
        );
    }

    #[test]
    fn answer_keys() {
        assert_eq!(map_key(key(KeyCode::Enter), ANSWER, 0), KeyAction::Session(Input::Next));
        assert_eq!(
            map_key(key(KeyCode::Char('n')), ANSWER, 0),
            KeyAction::Session(Input::Next)
        );
        assert_eq!(
            map_key(key(KeyCode::Char('2')), ANSWER, 0),
            KeyAction::Session(Input::Redraw)
        );
        assert_eq!(map_key(key(KeyCode::Down), ANSWER, 0), KeyAction::Session(Input::Redraw));
    }
}
