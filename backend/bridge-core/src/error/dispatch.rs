use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Errors routing a request to a handler or the code engine.
#[derive(Debug, ThisError)]
pub enum DispatchError {
    #[error("Unknown Handler Error: {message} {location}")]
    UnknownHandler {
        handler: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Missing Directive Error: {message} {location}")]
    MissingDirective {
        message: String,
        location: ErrorLocation,
    },

    #[error("Ambiguous Directive Error: {message} {location}")]
    AmbiguousDirective {
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid Params Error: {message} {location}")]
    InvalidParams {
        message: String,
        location: ErrorLocation,
    },

    #[error("Handler Failed Error: {message} {location}")]
    HandlerFailed {
        handler: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Host Unavailable Error: {message} {location}")]
    HostUnavailable {
        message: String,
        location: ErrorLocation,
    },
}

impl DispatchError {
    #[track_caller]
    pub fn unknown_handler(handler: impl Into<String>) -> Self {
        let handler = handler.into();
        DispatchError::UnknownHandler {
            message: format!("Unknown handler: {handler}"),
            handler,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn missing_directive() -> Self {
        DispatchError::MissingDirective {
            message: String::from(r#"Missing required field: either "code" or "handler""#),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn ambiguous_directive() -> Self {
        DispatchError::AmbiguousDirective {
            message: String::from(
                r#"Ambiguous request: "code" and "handler" are mutually exclusive"#,
            ),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        DispatchError::InvalidParams {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn handler_failed(handler: impl Into<String>, reason: impl AsRef<str>) -> Self {
        let handler = handler.into();
        DispatchError::HandlerFailed {
            message: format!("Handler '{handler}' failed: {}", reason.as_ref()),
            handler,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn host_unavailable(message: impl Into<String>) -> Self {
        DispatchError::HostUnavailable {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Text sent to the client.
    pub fn message(&self) -> &str {
        match self {
            DispatchError::UnknownHandler { message, .. }
            | DispatchError::MissingDirective { message, .. }
            | DispatchError::AmbiguousDirective { message, .. }
            | DispatchError::InvalidParams { message, .. }
            | DispatchError::HandlerFailed { message, .. }
            | DispatchError::HostUnavailable { message, .. } => message,
        }
    }
}
