//! Typed accessors over [`Params`].
//!
//! Missing and `null` are treated alike. A value of the wrong JSON type is
//! an error rather than being silently ignored.

use crate::error::HandlerError;
use crate::handlers::Params;

use serde_json::Value;

pub fn optional_str<'a>(params: &'a Params, name: &str) -> Result<Option<&'a str>, HandlerError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.as_str())),
        Some(_) => Err(HandlerError::invalid_param(name, "a string")),
    }
}

/// A string parameter that must be present and non-empty.
pub fn required_str<'a>(params: &'a Params, name: &str) -> Result<&'a str, HandlerError> {
    optional_str(params, name)?
        .filter(|text| !text.is_empty())
        .ok_or_else(|| HandlerError::missing_param(name))
}

pub fn optional_bool(params: &Params, name: &str, default: bool) -> Result<bool, HandlerError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(_) => Err(HandlerError::invalid_param(name, "a boolean")),
    }
}

pub fn optional_str_list<'a>(
    params: &'a Params,
    name: &str,
) -> Result<Vec<&'a str>, HandlerError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| HandlerError::invalid_param(name, "a list of strings"))
            })
            .collect(),
        Some(_) => Err(HandlerError::invalid_param(name, "a list of strings")),
    }
}
