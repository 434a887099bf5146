//! Shared building blocks for the host bridge workspace.
//!
//! This crate holds the small pieces every other crate leans on:
//!
//! - [`ErrorLocation`]: call-site capture embedded in every error variant
//! - [`RedactedToken`]: the per-run auth token, never printed in full
//!
//! ## Architecture
//!
//! - **common** (this crate): error plumbing and secret handling
//! - **bridge-core**: scheduler, protocol, handlers and server lifecycle
//! - **bridge-host**: reference host application wiring everything together

pub mod error;
pub mod redacted_token;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use redacted_token::RedactedToken;

#[cfg(test)]
mod tests;
