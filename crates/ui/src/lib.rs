#![forbid(unsafe_code)]

pub mod error;
pub mod keymap;
pub mod runner;
pub mod terminal;
pub mod views;
pub mod vm;

pub use error::UiError;
pub use runner::run_quiz;
pub use terminal::TuiTerminal;
