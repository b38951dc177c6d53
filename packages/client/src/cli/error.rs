//! Errors that end a CLI command.

use thiserror::Error;

use crate::error::{ApiError, ChatError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Chat(#[from] ChatError),
}
