use crate::error::{DispatchError, ProtocolError};

use serde_json::{Map, Value};

/// What a request asks the bridge to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Handler {
        name: String,
        params: Map<String, Value>,
    },
    Code {
        source: String,
        stream: bool,
    },
}

/// A decoded request message.
///
/// Parsing is split in two: [`Request::parse`] only extracts what is needed
/// before authentication (`id`, `token`), and [`Request::directive`]
/// validates the rest once the connection is allowed to act on it.
#[derive(Debug, Clone)]
pub struct Request {
    pub id: Value,
    pub token: Option<Value>,
    body: Map<String, Value>,
}

impl Request {
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the payload is not a JSON object or has
    /// no `id`. Such errors are answered with `id: null`.
    pub fn parse(payload: &[u8]) -> Result<Self, ProtocolError> {
        let value: Value =
            serde_json::from_slice(payload).map_err(|e| ProtocolError::invalid_json(&e))?;

        let Value::Object(mut body) = value else {
            return Err(ProtocolError::not_an_object());
        };

        let id = body.remove("id").ok_or_else(ProtocolError::missing_id)?;
        let token = body.remove("token");

        Ok(Self { id, token, body })
    }

    /// True if the message carries `code` or `handler`.
    pub fn has_directive(&self) -> bool {
        self.body.contains_key("code") || self.body.contains_key("handler")
    }

    /// # Errors
    ///
    /// - [`DispatchError::MissingDirective`] if neither `code` nor `handler`
    ///   is present
    /// - [`DispatchError::AmbiguousDirective`] if both are
    /// - [`DispatchError::InvalidParams`] if a field has the wrong type
    pub fn directive(&self) -> Result<Directive, DispatchError> {
        match (self.body.get("handler"), self.body.get("code")) {
            (Some(_), Some(_)) => Err(DispatchError::ambiguous_directive()),
            (None, None) => Err(DispatchError::missing_directive()),
            (Some(handler), None) => {
                let name = handler.as_str().ok_or_else(|| {
                    DispatchError::invalid_params("Invalid field 'handler': expected a string")
                })?;
                let params = match self.body.get("params") {
                    None | Some(Value::Null) => Map::new(),
                    Some(Value::Object(params)) => params.clone(),
                    Some(_) => {
                        return Err(DispatchError::invalid_params(
                            "Invalid field 'params': expected an object",
                        ));
                    }
                };
                Ok(Directive::Handler {
                    name: name.to_string(),
                    params,
                })
            }
            (None, Some(code)) => {
                let source = code.as_str().ok_or_else(|| {
                    DispatchError::invalid_params("Invalid field 'code': expected a string")
                })?;
                let stream = match self.body.get("stream") {
                    None | Some(Value::Null) => false,
                    Some(Value::Bool(stream)) => *stream,
                    Some(_) => {
                        return Err(DispatchError::invalid_params(
                            "Invalid field 'stream': expected a boolean",
                        ));
                    }
                };
                Ok(Directive::Code {
                    source: source.to_string(),
                    stream,
                })
            }
        }
    }
}
