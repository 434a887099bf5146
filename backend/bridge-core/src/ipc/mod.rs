//! TCP server exposing the bridge protocol.
//!
//! The server runs on its own thread with a single-threaded tokio runtime.
//! Each accepted socket gets a connection task on that runtime; connection
//! tasks suspend on socket I/O and on scheduler results, never on the host
//! thread itself.
//!
//! # Lifecycle
//!
//! [`Supervisor::start`] binds synchronously and fails without side effects
//! if the address is taken. [`Supervisor::stop`] is idempotent and
//! force-closes every open connection.
//!
//! # Security
//!
//! With `require_token` a fresh token is generated per start. Until a
//! connection presents it, nothing on that connection is dispatched.

pub(crate) mod connection;
mod connection_state;
mod handle;
mod server;
mod services;
mod state;

pub use connection_state::ConnectionState;
pub use handle::ServerHandle;
pub use server::Supervisor;
pub use services::BridgeServices;
pub use state::{ServerInfo, ServerState};
