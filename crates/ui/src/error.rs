use std::io;

use services::SessionError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UiError {
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
}
