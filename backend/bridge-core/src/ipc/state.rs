//! Server state shared between the supervisor and connection tasks.

use common::RedactedToken;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;
use serde::Serialize;
use tokio::task::AbortHandle;

/// Snapshot returned by [`Supervisor::server_info`](crate::ipc::Supervisor::server_info).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    pub running: bool,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub token: Option<String>,
    pub connection_count: usize,
    pub host_version: String,
}

struct OpenConnection {
    peer: SocketAddr,
    abort: AbortHandle,
}

#[derive(Default)]
struct Listening {
    host: Option<String>,
    address: Option<SocketAddr>,
}

/// State of one server instance.
///
/// Every lock here guards a short, non-blocking critical section; none is
/// held across an await or while touching the host.
#[derive(Default)]
pub struct ServerState {
    listening: Mutex<Listening>,
    token: Mutex<Option<RedactedToken>>,
    connections: Mutex<HashMap<u64, OpenConnection>>,
    next_connection_id: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poison| poison.into_inner())
}

impl ServerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn mark_listening(&self, host: &str, address: SocketAddr) {
        let mut listening = lock(&self.listening);
        listening.host = Some(host.to_string());
        listening.address = Some(address);
    }

    pub fn address(&self) -> Option<SocketAddr> {
        lock(&self.listening).address
    }

    pub(crate) fn set_token(&self, token: Option<RedactedToken>) {
        if let Some(token) = &token {
            debug!("Server token set ({})", token.hint());
        }
        *lock(&self.token) = token;
    }

    pub fn token(&self) -> Option<RedactedToken> {
        lock(&self.token).clone()
    }

    pub(crate) fn next_connection_id(&self) -> u64 {
        self.next_connection_id.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn register_connection(&self, id: u64, peer: SocketAddr, abort: AbortHandle) {
        lock(&self.connections).insert(id, OpenConnection { peer, abort });
    }

    pub(crate) fn remove_connection(&self, id: u64) {
        if let Some(connection) = lock(&self.connections).remove(&id) {
            debug!("Connection {} from {} released", id, connection.peer);
        }
    }

    pub fn connection_count(&self) -> usize {
        lock(&self.connections).len()
    }

    /// Aborts every open connection task and forgets them.
    pub(crate) fn abort_all(&self) -> usize {
        let drained: Vec<_> = lock(&self.connections).drain().collect();
        for (_, connection) in &drained {
            connection.abort.abort();
        }
        drained.len()
    }

    /// Resets to the not-running state: no address, no token, no connections.
    pub(crate) fn clear(&self) {
        self.abort_all();
        *lock(&self.listening) = Listening::default();
        self.set_token(None);
    }

    pub(crate) fn info(&self, running: bool, host_version: &str) -> ServerInfo {
        let listening = lock(&self.listening);
        ServerInfo {
            running,
            host: listening.host.clone(),
            port: listening.address.map(|address| address.port()),
            token: self.token().map(|token| token.as_str().to_string()),
            connection_count: self.connection_count(),
            host_version: host_version.to_string(),
        }
    }
}

/// Removes a connection from the open set when its task ends, however it
/// ends (clean close, error, or abort).
pub(crate) struct ConnectionGuard {
    state: Arc<ServerState>,
    id: u64,
}

impl ConnectionGuard {
    pub(crate) fn new(state: Arc<ServerState>, id: u64) -> Self {
        Self { state, id }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.state.remove_connection(self.id);
    }
}
