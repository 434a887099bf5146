//! Test helpers for bridge server integration tests.
//!
//! This module provides utilities for driving a real server over TCP:
//! - Starting a supervisor on an OS-assigned port with a host thread
//! - Sending/receiving length-prefixed JSON frames
//! - Connection state checks

use bridge_core::config::BridgeConfig;
use bridge_core::exec::{ExecutionEngine, ScriptExecutor};
use bridge_core::handlers::HandlerRegistry;
use bridge_core::ipc::Supervisor;
use bridge_core::scene::{Scene, SceneObject};
use bridge_core::task_queue::{IdleTick, TaskQueue};

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Upper bound for any single wait in these tests.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Config binding 127.0.0.1 on a port the OS picks.
pub fn test_config(require_token: bool) -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.server.host = String::from("127.0.0.1");
    config.server.port = 0;
    config.server.require_token = require_token;
    config.server.shutdown_timeout_ms = 2_000;
    config
}

/// Drains `queue` against `host` on its own thread until dropped, the way a
/// host application's idle timer would.
pub struct TestHost {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl TestHost {
    pub fn spawn<H: Send + 'static>(queue: Arc<TaskQueue<H>>, mut host: H) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = thread::spawn(move || {
            let mut idle = IdleTick::new(queue);
            while !flag.load(Ordering::SeqCst) {
                idle.tick(&mut host);
                thread::sleep(Duration::from_millis(1));
            }
        });
        Self {
            stop,
            thread: Some(thread),
        }
    }
}

impl Drop for TestHost {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// A running server over a small scene, plus the host thread serving it.
pub struct TestBridge {
    pub supervisor: Supervisor<Scene>,
    pub address: SocketAddr,
    _host: TestHost,
}

/// Test helper: Start a server with the built-in scene handlers.
pub fn start_test_bridge(config: &BridgeConfig) -> TestBridge {
    let queue = Arc::new(TaskQueue::new());
    let host = TestHost::spawn(Arc::clone(&queue), test_scene());
    let supervisor = Supervisor::new(
        queue,
        HandlerRegistry::with_scene_handlers(),
        ExecutionEngine::new(ScriptExecutor),
    );
    let address = supervisor.start(config).expect("Failed to start bridge server");
    TestBridge {
        supervisor,
        address,
        _host: host,
    }
}

pub fn test_scene() -> Scene {
    let mut scene = Scene::new();
    scene
        .add_object(SceneObject::new("Cube", "MESH"))
        .add_object(SceneObject::new("Camera", "CAMERA"));
    scene.set_active("Cube");
    scene
}

/// Test helper: Connect to the server.
pub async fn connect(address: SocketAddr) -> TcpStream {
    TcpStream::connect(address)
        .await
        .expect("Failed to connect to bridge server")
}

/// Test helper: Write one frame with a raw payload.
pub async fn send_frame(stream: &mut TcpStream, payload: &[u8]) {
    let length = u32::try_from(payload.len()).expect("payload fits in a frame");
    stream
        .write_all(&length.to_be_bytes())
        .await
        .expect("Failed to write length prefix");
    stream
        .write_all(payload)
        .await
        .expect("Failed to write payload");
    stream.flush().await.expect("Failed to flush");
}

/// Test helper: Send a JSON message as one frame.
pub async fn send_json(stream: &mut TcpStream, message: &Value) {
    send_frame(stream, message.to_string().as_bytes()).await;
}

/// Test helper: Receive and decode one JSON frame.
pub async fn receive_json(stream: &mut TcpStream) -> Value {
    tokio::time::timeout(TEST_TIMEOUT, async {
        let mut prefix = [0u8; 4];
        stream
            .read_exact(&mut prefix)
            .await
            .expect("Failed to read length prefix");
        let mut payload = vec![0u8; u32::from_be_bytes(prefix) as usize];
        stream
            .read_exact(&mut payload)
            .await
            .expect("Failed to read payload");
        serde_json::from_slice(&payload).expect("Response is not JSON")
    })
    .await
    .expect("Timed out waiting for a response")
}

/// Test helper: Send a request and return its single response.
pub async fn request(stream: &mut TcpStream, message: &Value) -> Value {
    send_json(stream, message).await;
    receive_json(stream).await
}

/// Test helper: Check whether the server closed the connection.
///
/// Returns `true` on EOF or reset, `false` if data arrived or nothing
/// happened before the timeout.
pub async fn is_connection_closed(stream: &mut TcpStream) -> bool {
    let mut buf = [0u8; 1];
    match tokio::time::timeout(TEST_TIMEOUT, stream.read(&mut buf)).await {
        Ok(Ok(0)) => true,
        Ok(Err(_)) => true,
        Ok(Ok(_)) => false,
        Err(_) => false,
    }
}

/// Polls `condition` until it holds or [`TEST_TIMEOUT`] elapses.
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + TEST_TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
