pub mod config;
pub mod dispatch;
pub mod exec;
pub mod framing;
pub mod handler;
pub mod protocol;
pub mod serialization;
pub mod server;
pub mod task;

pub use config::ConfigError;
pub use dispatch::DispatchError;
pub use exec::ExecError;
pub use framing::FramingError;
pub use handler::HandlerError;
pub use protocol::{AuthError, ProtocolError};
pub use serialization::SerializationError;
pub use server::ServerError;
pub use task::TaskError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Framing(#[from] FramingError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error(transparent)]
    Task(#[from] TaskError),
}
