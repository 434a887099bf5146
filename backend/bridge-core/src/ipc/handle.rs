//! Handle to the server's background thread.

use std::net::SocketAddr;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::Duration;

use log::error;
use tokio::sync::oneshot;

/// The running server thread: its shutdown signal and completion channel.
///
/// Owned by the [`Supervisor`](crate::ipc::Supervisor); consumed by
/// [`ServerHandle::shutdown`].
pub struct ServerHandle {
    address: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    done: Receiver<()>,
    thread: Option<JoinHandle<()>>,
}

impl ServerHandle {
    pub(crate) fn new(
        address: SocketAddr,
        shutdown: oneshot::Sender<()>,
        done: Receiver<()>,
        thread: JoinHandle<()>,
    ) -> Self {
        Self {
            address,
            shutdown: Some(shutdown),
            done,
            thread: Some(thread),
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// False once the server thread has exited, for whatever reason.
    pub fn is_alive(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    /// Signals the event loop to stop and waits up to `timeout` for the
    /// thread to finish.
    ///
    /// Returns `false` if the thread did not finish in time. It is left
    /// running detached in that case; there is no forced kill.
    pub(crate) fn shutdown(mut self, timeout: Duration) -> bool {
        if let Some(shutdown) = self.shutdown.take() {
            // The loop may already be gone; nothing to signal then.
            let _ = shutdown.send(());
        }

        match self.done.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                let panicked = self
                    .thread
                    .take()
                    .is_some_and(|thread| thread.join().is_err());
                if panicked {
                    error!("Server thread panicked during shutdown");
                }
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
        }
    }
}
