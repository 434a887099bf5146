//! Auth token handling with redacted Debug output.

use crate::RedactError;

use std::fmt;

use serde::ser::Error;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Number of leading characters shown by [`RedactedToken::hint`].
const HINT_PREFIX_LEN: usize = 4;

/// A server auth token that never exposes its value in logs or debug output.
///
/// The token lives for one server run. It is compared against the `token`
/// field of incoming requests and wiped from memory when dropped.
#[derive(Clone)]
pub struct RedactedToken {
    inner: String,
}

impl RedactedToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            inner: token.into(),
        }
    }

    /// Get the actual token value.
    ///
    /// # Security Note
    /// Only call this when the token has to be shown to the operator
    /// (server info) or compared against client input.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Compare against a candidate in constant time.
    pub fn matches(&self, candidate: &str) -> bool {
        self.inner.as_bytes().ct_eq(candidate.as_bytes()).into()
    }

    /// Short prefix that is safe to put in a log line.
    pub fn hint(&self) -> String {
        let prefix: String = self.inner.chars().take(HINT_PREFIX_LEN).collect();
        format!("{prefix}…")
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for RedactedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RedactedToken([REDACTED])")
    }
}

impl fmt::Display for RedactedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED TOKEN]")
    }
}

impl Drop for RedactedToken {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

// Serializing must go through as_str() explicitly.
impl serde::Serialize for RedactedToken {
    fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        Err(S::Error::custom(RedactError::serialization(
            "RedactedToken cannot be serialized - use as_str() explicitly",
        )))
    }
}
