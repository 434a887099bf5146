use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Outcome of a scheduler task that did not produce a value.
#[derive(Debug, ThisError)]
pub enum TaskError {
    #[error("Task Failed: {message} {location}")]
    Failed {
        message: String,
        location: ErrorLocation,
    },

    #[error("Task Panicked: {message} {location}")]
    Panicked {
        message: String,
        location: ErrorLocation,
    },

    #[error("Task Cancelled {location}")]
    Cancelled { location: ErrorLocation },

    #[error("Task Dropped: {message} {location}")]
    Dropped {
        message: String,
        location: ErrorLocation,
    },
}

impl TaskError {
    #[track_caller]
    pub fn failed(message: impl Into<String>) -> Self {
        TaskError::Failed {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn panicked(message: impl Into<String>) -> Self {
        TaskError::Panicked {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn cancelled() -> Self {
        TaskError::Cancelled {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn dropped() -> Self {
        TaskError::Dropped {
            message: String::from("task was discarded before it ran on the host thread"),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Message without the location suffix.
    pub fn reason(&self) -> &str {
        match self {
            TaskError::Failed { message, .. }
            | TaskError::Panicked { message, .. }
            | TaskError::Dropped { message, .. } => message,
            TaskError::Cancelled { .. } => "task was cancelled",
        }
    }
}
