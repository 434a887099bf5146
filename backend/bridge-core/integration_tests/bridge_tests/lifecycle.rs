use crate::bridge_tests::helpers::{
    TEST_TIMEOUT, TestHost, connect, is_connection_closed, request, start_test_bridge,
    test_config, test_scene, wait_until,
};

use bridge_core::error::ServerError;
use bridge_core::exec::{ExecutionEngine, ScriptExecutor};
use bridge_core::handlers::HandlerRegistry;
use bridge_core::ipc::Supervisor;
use bridge_core::scene::Scene;
use bridge_core::task_queue::TaskQueue;

use std::sync::Arc;

use serde_json::json;

fn idle_supervisor() -> Supervisor<Scene> {
    Supervisor::new(
        Arc::new(TaskQueue::new()),
        HandlerRegistry::with_scene_handlers(),
        ExecutionEngine::new(ScriptExecutor),
    )
}

/// **VALUE**: Verifies that starting a running server fails without disturbing it.
///
/// **WHY THIS MATTERS**: Hosts often call start from UI toggles and auto-start hooks that
/// can race; a second start must not rebind, rotate the token or drop clients.
///
/// **BUG THIS CATCHES**: Would catch a second start replacing the first server.
#[tokio::test]
async fn given_running_server_when_started_again_then_already_running_and_first_untouched() {
    // GIVEN: A running server with a connected client
    let bridge = start_test_bridge(&test_config(true));
    let token = bridge.supervisor.server_info().token;
    let mut stream = connect(bridge.address).await;

    // WHEN: Starting again
    let result = bridge.supervisor.start(&test_config(true));

    // THEN: AlreadyRunning; same token, client still served
    assert!(matches!(result, Err(ServerError::AlreadyRunning { .. })));
    assert_eq!(bridge.supervisor.server_info().token, token);
    let response = request(
        &mut stream,
        &json!({"id": 1, "token": token, "code": "print('alive')"}),
    )
    .await;
    assert_eq!(response["output"], json!("alive\n"));
}

#[tokio::test]
async fn given_running_server_when_stopped_then_open_connections_are_closed() {
    // GIVEN: A running server with a connected client
    let bridge = start_test_bridge(&test_config(false));
    let mut stream = connect(bridge.address).await;
    let state = Arc::clone(bridge.supervisor.state());
    assert!(wait_until(|| state.connection_count() == 1).await);

    // WHEN: Stopping
    bridge.supervisor.stop();

    // THEN: The client sees the close and the server reports stopped
    assert!(is_connection_closed(&mut stream).await);
    let info = bridge.supervisor.server_info();
    assert!(!info.running);
    assert_eq!(info.port, None);
    assert_eq!(info.connection_count, 0);
}

#[tokio::test]
async fn given_stopped_server_when_stopped_again_then_no_effect() {
    let supervisor = idle_supervisor();

    supervisor.stop();
    supervisor.stop();

    assert!(!supervisor.is_running());
}

/// **VALUE**: Verifies that a stopped server can be restarted and releases its port.
///
/// **WHY THIS MATTERS**: Users toggle the server on and off within one host session.
///
/// **BUG THIS CATCHES**: Would catch the listener leaking past stop, making rebinds fail.
#[tokio::test]
async fn given_stopped_server_when_started_again_on_same_port_then_serves_requests() {
    // GIVEN: A server that was started and stopped
    let queue = Arc::new(TaskQueue::new());
    let _host = TestHost::spawn(Arc::clone(&queue), test_scene());
    let supervisor = Supervisor::new(
        queue,
        HandlerRegistry::with_scene_handlers(),
        ExecutionEngine::new(ScriptExecutor),
    );
    let first = supervisor.start(&test_config(false)).expect("first start");
    supervisor.stop();

    // WHEN: Starting again on the same port
    let mut config = test_config(false);
    config.server.port = first.port();
    let second = supervisor.start(&config).expect("restart on the same port");

    // THEN: It serves requests on that port
    assert_eq!(second, first);
    let mut stream = connect(second).await;
    let response = request(&mut stream, &json!({"id": 1, "code": "print('again')"})).await;
    assert_eq!(response["output"], json!("again\n"));
}

#[tokio::test]
async fn given_port_in_use_when_starting_then_bind_error_and_not_running() {
    let bridge = start_test_bridge(&test_config(false));
    let other = idle_supervisor();
    let mut config = test_config(false);
    config.server.port = bridge.address.port();

    let result = other.start(&config);

    assert!(matches!(result, Err(ServerError::Bind { .. })));
    assert!(!other.is_running());
    assert_eq!(other.server_info().port, None);
}

#[tokio::test]
async fn given_network_disabled_when_starting_then_refuses_to_bind() {
    let supervisor = idle_supervisor();
    let mut config = test_config(false);
    config.server.network_enabled = false;

    let result = supervisor.start(&config);

    assert!(matches!(result, Err(ServerError::NetworkDisabled { .. })));
    assert!(!supervisor.is_running());
}

#[tokio::test]
async fn given_running_server_when_info_requested_then_reports_address_and_connections() {
    // GIVEN: A running server with two clients
    let bridge = start_test_bridge(&test_config(false));
    let _first = connect(bridge.address).await;
    let _second = connect(bridge.address).await;
    let state = Arc::clone(bridge.supervisor.state());

    // WHEN / THEN: The snapshot reflects them
    assert!(wait_until(|| state.connection_count() == 2).await);
    let info = bridge.supervisor.server_info();
    assert!(info.running);
    assert_eq!(info.host.as_deref(), Some("127.0.0.1"));
    assert_eq!(info.port, Some(bridge.address.port()));
    assert_eq!(info.host_version, bridge_core::HOST_VERSION);
}

#[tokio::test]
async fn given_supervisor_dropped_when_client_connected_then_connection_closed() {
    let bridge = start_test_bridge(&test_config(false));
    let mut stream = connect(bridge.address).await;

    let closed = tokio::time::timeout(TEST_TIMEOUT, async {
        drop(bridge);
        is_connection_closed(&mut stream).await
    })
    .await
    .expect("drop should not hang");

    assert!(closed);
}
