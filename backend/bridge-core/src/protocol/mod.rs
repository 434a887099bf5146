//! Wire protocol: length-prefixed JSON frames carrying requests and
//! responses.
//!
//! ```text
//! +----------------+---------------------------+
//! | length: u32 BE | payload: UTF-8 JSON bytes |
//! +----------------+---------------------------+
//! ```
//!
//! The same framing is used in both directions.

pub mod frame;
pub mod request;
pub mod response;

pub use frame::{DEFAULT_MAX_FRAME_BYTES, read_frame, write_frame};
pub use request::{Directive, Request};
pub use response::Response;
