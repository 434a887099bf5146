use crate::error::TaskError;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Failure raised inside a handler body on the host thread.
#[derive(Debug, ThisError)]
pub enum HandlerError {
    #[error("Invalid Params Error: {message} {location}")]
    InvalidParams {
        message: String,
        location: ErrorLocation,
    },

    #[error("Not Found Error: {message} {location}")]
    NotFound {
        message: String,
        location: ErrorLocation,
    },

    #[error("Handler Error: {message} {location}")]
    Failed {
        message: String,
        location: ErrorLocation,
    },
}

impl HandlerError {
    #[track_caller]
    pub fn missing_param(name: &str) -> Self {
        HandlerError::InvalidParams {
            message: format!("Missing required parameter: {name}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_param(name: &str, expected: &str) -> Self {
        HandlerError::InvalidParams {
            message: format!("Invalid parameter '{name}': expected {expected}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        HandlerError::NotFound {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn failed(message: impl Into<String>) -> Self {
        HandlerError::Failed {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            HandlerError::InvalidParams { message, .. }
            | HandlerError::NotFound { message, .. }
            | HandlerError::Failed { message, .. } => message,
        }
    }
}

impl From<HandlerError> for TaskError {
    #[track_caller]
    fn from(error: HandlerError) -> Self {
        TaskError::failed(error.message())
    }
}
