use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// A response contained a value with no JSON representation.
///
/// `path` locates the offending element, e.g. `root['result']['objects'][2]`.
#[derive(Debug, Clone, ThisError)]
pub enum SerializationError {
    #[error("Serialization Error: {} {location}", self.message())]
    NonSerializableKey {
        path: String,
        type_name: String,
        location: ErrorLocation,
    },

    #[error("Serialization Error: {} {location}", self.message())]
    NonSerializableValue {
        path: String,
        type_name: String,
        note: Option<String>,
        location: ErrorLocation,
    },
}

impl SerializationError {
    #[track_caller]
    pub fn key(path: impl Into<String>, type_name: impl Into<String>) -> Self {
        SerializationError::NonSerializableKey {
            path: path.into(),
            type_name: type_name.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn value(
        path: impl Into<String>,
        type_name: impl Into<String>,
        note: Option<&str>,
    ) -> Self {
        SerializationError::NonSerializableValue {
            path: path.into(),
            type_name: type_name.into(),
            note: note.map(str::to_string),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            SerializationError::NonSerializableKey { path, .. }
            | SerializationError::NonSerializableValue { path, .. } => path,
        }
    }

    /// Text sent to the client, without the location suffix.
    pub fn message(&self) -> String {
        match self {
            SerializationError::NonSerializableKey {
                path, type_name, ..
            } => format!("Non-serializable key at path '{path}': type {type_name}"),
            SerializationError::NonSerializableValue {
                path,
                type_name,
                note: Some(note),
                ..
            } => format!("Non-serializable object at path '{path}': type {type_name} ({note})"),
            SerializationError::NonSerializableValue {
                path, type_name, ..
            } => format!("Non-serializable object at path '{path}': type {type_name}"),
        }
    }
}
