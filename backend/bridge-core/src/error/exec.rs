use crate::error::TaskError;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// An error raised by executed client code.
///
/// `kind` names the error class the way the executor reports it
/// (`NameError`, `SyntaxError`, ...). Clients see `"{kind}: {message}"`.
#[derive(Debug, Clone, ThisError)]
#[error("Exec Error: {kind}: {message} {location}")]
pub struct ExecError {
    pub kind: String,
    pub message: String,
    pub location: ErrorLocation,
}

impl ExecError {
    #[track_caller]
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn client_message(&self) -> String {
        format!("{}: {}", self.kind, self.message)
    }
}

impl From<ExecError> for TaskError {
    #[track_caller]
    fn from(error: ExecError) -> Self {
        TaskError::failed(error.client_message())
    }
}
