mod controller;
mod session;
mod state;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::{Completion, Notice, SessionController};
pub use session::QuizSession;
pub use state::{Command, Event, Input, SessionState};
