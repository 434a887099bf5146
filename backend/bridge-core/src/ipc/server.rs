//! Server supervisor: owns the listening socket and the background thread.

use crate::HOST_VERSION;
use crate::config::BridgeConfig;
use crate::error::ServerError;
use crate::exec::ExecutionEngine;
use crate::handlers::HandlerRegistry;
use crate::ipc::connection::handle_connection;
use crate::ipc::handle::ServerHandle;
use crate::ipc::services::BridgeServices;
use crate::ipc::state::{ConnectionGuard, ServerInfo, ServerState};
use crate::task_queue::TaskQueue;

use common::RedactedToken;

use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::Builder as RuntimeBuilder;
use tokio::sync::oneshot;
use tokio::time::sleep as TokioSleep;
use uuid::Uuid;

const SERVER_THREAD_NAME: &str = "bridge-server";
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(50);

struct Running {
    handle: ServerHandle,
    shutdown_timeout: Duration,
}

/// Starts, stops and reports on the bridge server for host state `H`.
///
/// The queue, handlers and engine outlive individual server runs, so a
/// stopped server can be started again with a new token.
pub struct Supervisor<H: 'static> {
    services: Arc<BridgeServices<H>>,
    state: Arc<ServerState>,
    running: Mutex<Option<Running>>,
}

impl<H: 'static> Supervisor<H> {
    pub fn new(
        queue: Arc<TaskQueue<H>>,
        handlers: HandlerRegistry<H>,
        engine: ExecutionEngine<H>,
    ) -> Self {
        Self {
            services: Arc::new(BridgeServices::new(queue, handlers, engine)),
            state: Arc::new(ServerState::new()),
            running: Mutex::new(None),
        }
    }

    pub fn queue(&self) -> &Arc<TaskQueue<H>> {
        &self.services.queue
    }

    pub fn state(&self) -> &Arc<ServerState> {
        &self.state
    }

    /// Binds `server.host:server.port` and starts serving on a background
    /// thread.
    ///
    /// # Returns
    ///
    /// The bound address. With port 0 the OS picks the port.
    ///
    /// # Errors
    ///
    /// - [`ServerError::AlreadyRunning`] if this supervisor is serving; the
    ///   running server is left untouched
    /// - [`ServerError::NetworkDisabled`] if the host disallows network access
    /// - [`ServerError::Bind`] if the address cannot be bound
    /// - [`ServerError::Runtime`] / [`ServerError::Thread`] if the background
    ///   context cannot be created
    ///
    /// On any error no thread is left running and no socket is held.
    pub fn start(&self, config: &BridgeConfig) -> Result<SocketAddr, ServerError> {
        let mut running = self.lock_running();

        if let Some(current) = running.as_ref() {
            if current.handle.is_alive() {
                return Err(ServerError::already_running());
            }
            warn!("Server thread exited unexpectedly; cleaning up before restart");
        }
        if let Some(stale) = running.take() {
            stale.handle.shutdown(stale.shutdown_timeout);
            self.state.clear();
        }

        let server = &config.server;
        if !server.network_enabled {
            return Err(ServerError::network_disabled());
        }

        let address = server.address();
        let std_listener =
            StdTcpListener::bind(&address).map_err(|e| ServerError::bind(&address, &e))?;
        std_listener
            .set_nonblocking(true)
            .map_err(|e| ServerError::bind(&address, &e))?;
        let local_address = std_listener
            .local_addr()
            .map_err(|e| ServerError::bind(&address, &e))?;

        let runtime = RuntimeBuilder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ServerError::runtime(&e))?;
        let listener = {
            let _context = runtime.enter();
            TcpListener::from_std(std_listener).map_err(|e| ServerError::bind(&address, &e))?
        };

        let token = server.require_token.then(|| {
            let token = RedactedToken::new(Uuid::new_v4().to_string());
            info!("Authentication token: {}", token.as_str());
            token
        });
        self.state.set_token(token);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (done_tx, done_rx) = std_mpsc::channel();
        let services = Arc::clone(&self.services);
        let state = Arc::clone(&self.state);
        let max_frame_bytes = server.max_frame_bytes;

        let thread = thread::Builder::new()
            .name(SERVER_THREAD_NAME.to_string())
            .spawn(move || {
                runtime.block_on(accept_loop(
                    listener,
                    services,
                    state,
                    max_frame_bytes,
                    shutdown_rx,
                ));
                // Dropping the runtime drops every connection task still alive.
                drop(runtime);
                let _ = done_tx.send(());
            })
            .map_err(|e| {
                self.state.set_token(None);
                ServerError::thread(&e)
            })?;

        self.state.mark_listening(&server.host, local_address);
        *running = Some(Running {
            handle: ServerHandle::new(local_address, shutdown_tx, done_rx, thread),
            shutdown_timeout: server.shutdown_timeout(),
        });

        info!(
            "Server listening on {} (token auth: {})",
            local_address,
            if server.require_token { "on" } else { "off" }
        );
        Ok(local_address)
    }

    /// Stops the server if it is running. Safe to call repeatedly.
    ///
    /// Open connections are aborted regardless of what they are doing. A
    /// task already executing on the host thread still runs to completion;
    /// its result is discarded.
    pub fn stop(&self) {
        let Some(current) = self.lock_running().take() else {
            debug!("Stop requested but server is not running");
            return;
        };

        let address = current.handle.address();
        info!("Stopping server on {}", address);

        let aborted = self.state.abort_all();
        if aborted > 0 {
            info!("Closed {} open connection(s)", aborted);
        }

        if !current.handle.shutdown(current.shutdown_timeout) {
            warn!(
                "Server thread did not stop cleanly within {:?}",
                current.shutdown_timeout
            );
        }

        self.state.clear();
        info!("Server on {} stopped", address);
    }

    pub fn is_running(&self) -> bool {
        self.lock_running()
            .as_ref()
            .is_some_and(|current| current.handle.is_alive())
    }

    pub fn server_info(&self) -> ServerInfo {
        self.state.info(self.is_running(), HOST_VERSION)
    }

    fn lock_running(&self) -> MutexGuard<'_, Option<Running>> {
        self.running
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

impl<H: 'static> Drop for Supervisor<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn accept_loop<H: 'static>(
    listener: TcpListener,
    services: Arc<BridgeServices<H>>,
    state: Arc<ServerState>,
    max_frame_bytes: u32,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                debug!("Shutdown signal received, closing listener");
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        spawn_connection(stream, peer, &services, &state, max_frame_bytes);
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        TokioSleep(ACCEPT_RETRY_DELAY).await;
                    }
                }
            }
        }
    }
}

fn spawn_connection<H: 'static>(
    stream: TcpStream,
    peer: SocketAddr,
    services: &Arc<BridgeServices<H>>,
    state: &Arc<ServerState>,
    max_frame_bytes: u32,
) {
    let id = state.next_connection_id();
    let guard = ConnectionGuard::new(Arc::clone(state), id);
    let expected_token = state.token();
    let services = Arc::clone(services);

    let task = tokio::spawn(async move {
        let _guard = guard;
        handle_connection(stream, peer, expected_token, &services, max_frame_bytes).await;
    });
    // Current-thread runtime: the task cannot run, and so cannot finish,
    // before it is registered here.
    state.register_connection(id, peer, task.abort_handle());
}
