use bridge_host::demo_scene::demo_scene;
use bridge_host::host_loop::HostLoop;

use bridge_core::config::BridgeConfig;
use bridge_core::exec::{ExecutionEngine, ScriptExecutor};
use bridge_core::handlers::HandlerRegistry;
use bridge_core::ipc::Supervisor;
use bridge_core::protocol::{read_frame, write_frame};
use bridge_core::scene::{Scene, SceneHost};
use bridge_core::task_queue::TaskQueue;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::net::TcpStream;

async fn request(stream: &mut TcpStream, message: Value) -> Value {
    write_frame(stream, message.to_string().as_bytes())
        .await
        .expect("Failed to send request");
    let frame = tokio::time::timeout(Duration::from_secs(5), read_frame(stream, u32::MAX))
        .await
        .expect("Timed out waiting for response")
        .expect("Failed to read response")
        .expect("Server closed the connection");
    serde_json::from_slice(&frame).expect("Response is not JSON")
}

/// **VALUE**: Runs the whole reference host: demo scene, host loop and server together.
///
/// **WHY THIS MATTERS**: This is how the binary wires the pieces. If the loop does not
/// drain the supervisor's queue, every request hangs.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The host loop and supervisor were built on different queues
/// - The demo scene is not what handlers see
#[tokio::test]
async fn given_host_loop_and_server_when_client_queries_then_demo_scene_is_served() {
    // GIVEN: A host loop on its own thread and a running server sharing its queue
    let queue = Arc::new(TaskQueue::new());
    let mut host_loop = HostLoop::new(demo_scene(), Arc::clone(&queue), Duration::from_millis(1));
    let stop = host_loop.stop_flag();
    let host_thread = thread::spawn(move || {
        host_loop.run(|_, _| {});
        host_loop.into_host()
    });

    let supervisor: Supervisor<Scene> = Supervisor::new(
        queue,
        HandlerRegistry::with_scene_handlers(),
        ExecutionEngine::new(ScriptExecutor),
    );
    let mut config = BridgeConfig::default();
    config.server.host = String::from("127.0.0.1");
    config.server.port = 0;
    let address = supervisor.start(&config).expect("Failed to start server");

    // WHEN: A client lists objects and node groups
    let mut stream = TcpStream::connect(address).await.expect("connect");
    let objects = request(&mut stream, json!({"id": 1, "handler": "list_objects"})).await;
    let groups = request(&mut stream, json!({"id": 2, "handler": "list_node_groups"})).await;

    // THEN: The demo scene answers
    assert_eq!(objects["output"], json!("Found 3 objects"));
    assert_eq!(objects["result"]["objects"][0]["name"], json!("Cube"));
    assert_eq!(groups["result"]["node_groups"][0]["name"], json!("Geometry Nodes"));

    // AND: Shutting down returns the scene intact
    supervisor.stop();
    stop.store(true, Ordering::SeqCst);
    let scene = host_thread.join().expect("host thread");
    assert_eq!(scene.active_object(), Some("Cube"));
}
