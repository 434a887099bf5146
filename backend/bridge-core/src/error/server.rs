use common::ErrorLocation;

use std::io::Error as IoError;
use std::panic::Location;

use thiserror::Error as ThisError;

/// Errors returned synchronously by `Supervisor::start`.
///
/// When any of these is returned no thread has been spawned and no socket
/// is held.
#[derive(Debug, ThisError)]
pub enum ServerError {
    #[error("Already Running Error: {message} {location}")]
    AlreadyRunning {
        message: String,
        location: ErrorLocation,
    },

    #[error("Network Disabled Error: {message} {location}")]
    NetworkDisabled {
        message: String,
        location: ErrorLocation,
    },

    #[error("Bind Error: Cannot bind to {address} - {message} {location}")]
    Bind {
        address: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Runtime Error: {message} {location}")]
    Runtime {
        message: String,
        location: ErrorLocation,
    },

    #[error("Thread Error: {message} {location}")]
    Thread {
        message: String,
        location: ErrorLocation,
    },
}

impl ServerError {
    #[track_caller]
    pub fn already_running() -> Self {
        ServerError::AlreadyRunning {
            message: String::from("Server is already running"),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn network_disabled() -> Self {
        ServerError::NetworkDisabled {
            message: String::from(
                "Network access is disabled in the host. Enable online access in the host preferences",
            ),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn bind(address: impl Into<String>, error: &IoError) -> Self {
        ServerError::Bind {
            address: address.into(),
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn runtime(error: &IoError) -> Self {
        ServerError::Runtime {
            message: format!("Failed to build server runtime: {error}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn thread(error: &IoError) -> Self {
        ServerError::Thread {
            message: format!("Failed to spawn server thread: {error}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
