use common::ErrorLocation;

use std::io::{Error as IoError, ErrorKind};
use std::panic::Location;

use thiserror::Error as ThisError;

/// Errors reading or writing length-prefixed frames.
///
/// Every variant is fatal to the connection it happened on.
#[derive(Debug, ThisError)]
pub enum FramingError {
    #[error("Truncated Frame Error: {message} {location}")]
    Truncated {
        message: String,
        location: ErrorLocation,
    },

    #[error("Frame Too Large Error: {size} bytes (max {max}) {location}")]
    FrameTooLarge {
        size: u32,
        max: u32,
        location: ErrorLocation,
    },

    #[error("IO Error: {message} {location}")]
    Io {
        message: String,
        location: ErrorLocation,
    },
}

impl FramingError {
    #[track_caller]
    pub fn truncated(message: impl Into<String>) -> Self {
        FramingError::Truncated {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn frame_too_large(size: u32, max: u32) -> Self {
        FramingError::FrameTooLarge {
            size,
            max,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// True when the peer went away mid-frame rather than the socket failing.
    pub fn is_truncation(&self) -> bool {
        matches!(self, FramingError::Truncated { .. })
    }
}

impl From<IoError> for FramingError {
    #[track_caller]
    fn from(error: IoError) -> Self {
        let location = ErrorLocation::from(Location::caller());
        match error.kind() {
            ErrorKind::UnexpectedEof => FramingError::Truncated {
                message: error.to_string(),
                location,
            },
            _ => FramingError::Io {
                message: error.to_string(),
                location,
            },
        }
    }
}
