//! Protocol core for driving a single-threaded host application over TCP.
//!
//! Work arriving on network connections is marshalled onto the host's own
//! thread through [`task_queue::TaskQueue`], which the host drains on its
//! idle tick. Everything else in this crate exists to get requests to that
//! queue and results back out onto the wire.

pub mod config;
pub mod error;
pub mod exec;
pub mod handlers;
pub mod ipc;
pub mod protocol;
pub mod scene;
pub mod task_queue;
pub mod value;

#[cfg(test)]
mod tests;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 4777;

/// Reported to clients in the authentication acknowledgement.
pub const HOST_VERSION: &str = env!("CARGO_PKG_VERSION");
