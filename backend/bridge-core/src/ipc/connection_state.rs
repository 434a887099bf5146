//! Per-connection authentication state.

use crate::error::AuthError;

use common::RedactedToken;

use serde_json::Value;

/// `CONNECTED` until the first accepted token, then `AUTHENTICATED` for the
/// rest of the connection's life. Never re-checked.
#[derive(Debug)]
pub struct ConnectionState {
    authenticated: bool,
    expected_token: Option<RedactedToken>,
}

impl ConnectionState {
    /// `expected_token` is `None` when token auth is disabled.
    pub fn new(expected_token: Option<RedactedToken>) -> Self {
        Self {
            authenticated: false,
            expected_token,
        }
    }

    /// Checks the `token` field of a message and authenticates on success.
    ///
    /// With token auth disabled every message authenticates.
    ///
    /// # Errors
    ///
    /// [`AuthError::MissingToken`] if a token is required and absent,
    /// [`AuthError::InvalidToken`] if it does not match.
    pub fn authenticate(&mut self, token: Option<&Value>) -> Result<(), AuthError> {
        if let Some(expected) = &self.expected_token {
            match token {
                None => return Err(AuthError::missing_token()),
                Some(Value::String(candidate)) if expected.matches(candidate) => {}
                Some(_) => return Err(AuthError::invalid_token()),
            }
        }
        self.authenticated = true;
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn requires_token(&self) -> bool {
        self.expected_token.is_some()
    }
}
