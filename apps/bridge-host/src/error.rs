use bridge_core::error::{ConfigError, ServerError};

use common::ErrorLocation;

use std::panic::Location;

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the reference host.
///
/// Core errors are flattened to their message so this type stays
/// serializable for status output, but the location of the conversion is
/// kept.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum HostError {
    /// Error from this app
    #[error("Host Error: {message} {location}")]
    Host {
        message: String,
        location: ErrorLocation,
    },

    /// Error from bridge-core server operations
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },

    /// Configuration could not be loaded, overridden or saved
    #[error("Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },
}

impl HostError {
    #[track_caller]
    pub fn host(message: impl Into<String>) -> Self {
        HostError::Host {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ServerError> for HostError {
    #[track_caller]
    fn from(error: ServerError) -> Self {
        HostError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for HostError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        HostError::Config {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
