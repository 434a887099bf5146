use crate::ErrorLocation;

use thiserror::Error as ThisError;

/// Raised when a secret wrapper is asked to leave memory implicitly.
#[derive(Debug, ThisError)]
pub enum RedactError {
    #[error("Redacted Serialization Error: {message} {location}")]
    Serialization {
        message: String,
        location: ErrorLocation,
    },
}

impl RedactError {
    #[track_caller]
    pub fn serialization(message: impl Into<String>) -> Self {
        RedactError::Serialization {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }
}
