use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Malformed requests. Reported in-band; the connection survives.
#[derive(Debug, ThisError)]
pub enum ProtocolError {
    #[error("Invalid JSON Error: {message} {location}")]
    InvalidJson {
        message: String,
        location: ErrorLocation,
    },

    #[error("Not An Object Error: {message} {location}")]
    NotAnObject {
        message: String,
        location: ErrorLocation,
    },

    #[error("Missing Id Error: {message} {location}")]
    MissingId {
        message: String,
        location: ErrorLocation,
    },
}

impl ProtocolError {
    #[track_caller]
    pub fn invalid_json(error: &serde_json::Error) -> Self {
        ProtocolError::InvalidJson {
            message: format!("Invalid JSON: {error}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn not_an_object() -> Self {
        ProtocolError::NotAnObject {
            message: String::from("Invalid message: expected a JSON object"),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn missing_id() -> Self {
        ProtocolError::MissingId {
            message: String::from("Missing required field: id"),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Text sent to the client.
    pub fn message(&self) -> &str {
        match self {
            ProtocolError::InvalidJson { message, .. }
            | ProtocolError::NotAnObject { message, .. }
            | ProtocolError::MissingId { message, .. } => message,
        }
    }
}

/// Authentication failures. Reported in-band with `authenticated: false`;
/// the client may retry on the same connection.
#[derive(Debug, ThisError)]
pub enum AuthError {
    #[error("Auth Error: {message} {location}")]
    MissingToken {
        message: String,
        location: ErrorLocation,
    },

    #[error("Auth Error: {message} {location}")]
    InvalidToken {
        message: String,
        location: ErrorLocation,
    },
}

impl AuthError {
    #[track_caller]
    pub fn missing_token() -> Self {
        AuthError::MissingToken {
            message: String::from("Authentication required: missing token"),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_token() -> Self {
        AuthError::InvalidToken {
            message: String::from("Authentication failed: invalid token"),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AuthError::MissingToken { message, .. } | AuthError::InvalidToken { message, .. } => {
                message
            }
        }
    }
}
