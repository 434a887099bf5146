use crate::error::SerializationError;
use crate::value::HostValue;

use serde::Serialize;
use serde_json::Value;

/// Every message the bridge sends, one variant per wire shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Result of code execution, and the terminal message of a stream.
    Execution {
        id: Value,
        output: Option<String>,
        error: Option<String>,
    },
    /// Result of a handler call.
    Handler {
        id: Value,
        output: Option<String>,
        error: Option<String>,
        result: Option<HostValue>,
    },
    /// One line of streamed output.
    Chunk { id: Value, chunk: String },
    Auth {
        id: Value,
        authenticated: bool,
        error: Option<String>,
        host_version: Option<String>,
    },
    /// Protocol and dispatch errors.
    Error { id: Value, error: String },
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireResponse<'a> {
    Execution {
        id: &'a Value,
        output: Option<&'a str>,
        error: Option<&'a str>,
        stream_end: bool,
    },
    Handler {
        id: &'a Value,
        output: Option<&'a str>,
        error: Option<&'a str>,
        result: Value,
        stream_end: bool,
    },
    Chunk {
        id: &'a Value,
        chunk: &'a str,
        stream_end: bool,
    },
    Auth {
        id: &'a Value,
        authenticated: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        host_version: Option<&'a str>,
    },
    Error {
        id: &'a Value,
        error: &'a str,
    },
}

impl Response {
    pub fn error(id: Value, error: impl Into<String>) -> Self {
        Response::Error {
            id,
            error: error.into(),
        }
    }

    pub fn chunk(id: Value, chunk: impl Into<String>) -> Self {
        Response::Chunk {
            id,
            chunk: chunk.into(),
        }
    }

    pub fn auth_failed(id: Value, error: impl Into<String>) -> Self {
        Response::Auth {
            id,
            authenticated: false,
            error: Some(error.into()),
            host_version: None,
        }
    }

    pub fn auth_succeeded(id: Value, host_version: impl Into<String>) -> Self {
        Response::Auth {
            id,
            authenticated: true,
            error: None,
            host_version: Some(host_version.into()),
        }
    }

    /// Minimal response sent in place of one that could not be serialized.
    pub fn serialization_fallback(id: Value, error: &SerializationError) -> Self {
        Response::Execution {
            id,
            output: None,
            error: Some(format!("JSON serialization error: {}", error.message())),
        }
    }

    pub fn id(&self) -> &Value {
        match self {
            Response::Execution { id, .. }
            | Response::Handler { id, .. }
            | Response::Chunk { id, .. }
            | Response::Auth { id, .. }
            | Response::Error { id, .. } => id,
        }
    }

    /// Whether this message carries `stream_end: true`.
    pub fn ends_stream(&self) -> bool {
        matches!(self, Response::Execution { .. } | Response::Handler { .. })
    }

    /// Encodes the response as JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError`] localized under `root['result']` if a
    /// handler result holds a value JSON cannot represent.
    pub fn to_wire(&self) -> Result<String, SerializationError> {
        let wire = match self {
            Response::Execution { id, output, error } => WireResponse::Execution {
                id,
                output: output.as_deref(),
                error: error.as_deref(),
                stream_end: true,
            },
            Response::Handler {
                id,
                output,
                error,
                result,
            } => WireResponse::Handler {
                id,
                output: output.as_deref(),
                error: error.as_deref(),
                result: match result {
                    Some(result) => result.to_json_at("root['result']")?,
                    None => Value::Null,
                },
                stream_end: true,
            },
            Response::Chunk { id, chunk } => WireResponse::Chunk {
                id,
                chunk,
                stream_end: false,
            },
            Response::Auth {
                id,
                authenticated,
                error,
                host_version,
            } => WireResponse::Auth {
                id,
                authenticated: *authenticated,
                error: error.as_deref(),
                host_version: host_version.as_deref(),
            },
            Response::Error { id, error } => WireResponse::Error { id, error },
        };

        serde_json::to_string(&wire).map_err(|e| {
            let reason = e.to_string();
            SerializationError::value("root", "response", Some(reason.as_str()))
        })
    }
}
