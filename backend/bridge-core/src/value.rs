//! Dynamically-typed values produced by host introspection.
//!
//! Handlers build [`HostValue`] trees rather than `serde_json::Value`
//! directly because the host can hand back things JSON has no shape for
//! (sets, live object references, tuple keys). Those are only discovered
//! when the response is about to be written, and [`HostValue::to_json`]
//! reports exactly where they are.

use crate::error::SerializationError;

use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<HostValue>),
    Tuple(Vec<HostValue>),
    Map(Vec<(HostValue, HostValue)>),
    Set(Vec<HostValue>),
    /// A live reference into the host object graph.
    Opaque { type_name: String },
}

impl HostValue {
    /// Builds a string-keyed map, preserving insertion order.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, HostValue)>,
    {
        HostValue::Map(
            entries
                .into_iter()
                .map(|(key, value)| (HostValue::Str(key.into()), value))
                .collect(),
        )
    }

    pub fn opaque(type_name: impl Into<String>) -> Self {
        HostValue::Opaque {
            type_name: type_name.into(),
        }
    }

    /// Name of the value's type as the host would report it.
    pub fn type_name(&self) -> &str {
        match self {
            HostValue::None => "NoneType",
            HostValue::Bool(_) => "bool",
            HostValue::Int(_) => "int",
            HostValue::Float(_) => "float",
            HostValue::Str(_) => "str",
            HostValue::List(_) => "list",
            HostValue::Tuple(_) => "tuple",
            HostValue::Map(_) => "dict",
            HostValue::Set(_) => "set",
            HostValue::Opaque { type_name } => type_name,
        }
    }

    /// Looks up a string key in a `Map`.
    pub fn get(&self, key: &str) -> Option<&HostValue> {
        match self {
            HostValue::Map(entries) => entries.iter().find_map(|(k, v)| match k {
                HostValue::Str(name) if name == key => Some(v),
                _ => None,
            }),
            _ => None,
        }
    }

    /// Converts to JSON, failing at the first element with no JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError`] naming the path (rooted at `root`) and
    /// type of the first set, opaque reference, non-finite float, or
    /// unsupported mapping key encountered in depth-first order.
    pub fn to_json(&self) -> Result<Value, SerializationError> {
        self.to_json_at("root")
    }

    /// Same as [`HostValue::to_json`] with a caller-chosen path prefix.
    pub fn to_json_at(&self, path: &str) -> Result<Value, SerializationError> {
        match self {
            HostValue::None => Ok(Value::Null),
            HostValue::Bool(flag) => Ok(Value::Bool(*flag)),
            HostValue::Int(number) => Ok(Value::from(*number)),
            HostValue::Float(number) => Number::from_f64(*number)
                .map(Value::Number)
                .ok_or_else(|| {
                    let note = "non-finite floats are not valid JSON";
                    SerializationError::value(path, "float", Some(note))
                }),
            HostValue::Str(text) => Ok(Value::String(text.clone())),
            HostValue::List(items) | HostValue::Tuple(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| item.to_json_at(&format!("{path}[{index}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            HostValue::Map(entries) => {
                let mut object = Map::with_capacity(entries.len());
                for (key, value) in entries {
                    let item_path = format!("{path}[{}]", key.repr());
                    let key = key
                        .json_key()
                        .ok_or_else(|| SerializationError::key(&item_path, key.type_name()))?;
                    object.insert(key, value.to_json_at(&item_path)?);
                }
                Ok(Value::Object(object))
            }
            HostValue::Set(_) => Err(SerializationError::value(
                path,
                "set",
                Some("sets are not JSON serializable"),
            )),
            HostValue::Opaque { type_name } => {
                Err(SerializationError::value(path, type_name.as_str(), None))
            }
        }
    }

    /// Mapping keys JSON can carry, stringified the way JSON encoders do.
    fn json_key(&self) -> Option<String> {
        match self {
            HostValue::Str(text) => Some(text.clone()),
            HostValue::Int(number) => Some(number.to_string()),
            HostValue::Float(number) if number.is_finite() => Some(format!("{number:?}")),
            HostValue::Bool(flag) => Some(flag.to_string()),
            HostValue::None => Some(String::from("null")),
            _ => None,
        }
    }

    /// Short literal form used in error paths: `'name'`, `3`, `True`.
    fn repr(&self) -> String {
        match self {
            HostValue::None => String::from("None"),
            HostValue::Bool(true) => String::from("True"),
            HostValue::Bool(false) => String::from("False"),
            HostValue::Int(number) => number.to_string(),
            HostValue::Float(number) => format!("{number:?}"),
            HostValue::Str(text) => format!("'{text}'"),
            HostValue::Tuple(items) => {
                let inner: Vec<String> = items.iter().map(HostValue::repr).collect();
                if inner.len() == 1 {
                    format!("({},)", inner[0])
                } else {
                    format!("({})", inner.join(", "))
                }
            }
            HostValue::List(_) => String::from("[...]"),
            HostValue::Map(_) => String::from("{...}"),
            HostValue::Set(_) => String::from("{...}"),
            HostValue::Opaque { type_name } => format!("<{type_name}>"),
        }
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        HostValue::Bool(value)
    }
}

impl From<i64> for HostValue {
    fn from(value: i64) -> Self {
        HostValue::Int(value)
    }
}

impl From<i32> for HostValue {
    fn from(value: i32) -> Self {
        HostValue::Int(i64::from(value))
    }
}

impl From<usize> for HostValue {
    fn from(value: usize) -> Self {
        HostValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        HostValue::Float(value)
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        HostValue::Str(value.to_string())
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        HostValue::Str(value)
    }
}

impl From<[f64; 3]> for HostValue {
    fn from(value: [f64; 3]) -> Self {
        HostValue::List(value.into_iter().map(HostValue::Float).collect())
    }
}

impl<T: Into<HostValue>> From<Vec<T>> for HostValue {
    fn from(value: Vec<T>) -> Self {
        HostValue::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(HostValue::None, Into::into)
    }
}
