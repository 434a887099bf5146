use crate::bridge_tests::helpers::{
    TestHost, connect, receive_json, request, send_json, test_config, wait_until,
};

use bridge_core::error::HandlerError;
use bridge_core::exec::{ExecutionEngine, ScriptExecutor};
use bridge_core::handlers::params::required_str;
use bridge_core::handlers::{Handler, HandlerOutcome, HandlerRegistry, Params};
use bridge_core::ipc::Supervisor;
use bridge_core::task_queue::TaskQueue;
use bridge_core::value::HostValue;

use std::sync::Arc;

use serde_json::json;

/// Host state for these tests: the order in which markers reached the host.
type Journal = Vec<String>;

/// `record {marker}` appends the marker to the journal; `"panic"` panics.
struct Record;

impl Handler<Journal> for Record {
    fn name(&self) -> &'static str {
        "record"
    }

    fn call(&self, host: &mut Journal, params: &Params) -> Result<HandlerOutcome, HandlerError> {
        let marker = required_str(params, "marker")?;
        if marker == "panic" {
            panic!("record refused to run");
        }
        host.push(marker.to_string());
        Ok(HandlerOutcome::success(
            format!("recorded {marker}"),
            HostValue::from(host.len()),
        ))
    }
}

fn journal_supervisor(queue: Arc<TaskQueue<Journal>>) -> Supervisor<Journal> {
    let mut handlers: HandlerRegistry<Journal> = HandlerRegistry::new();
    handlers.register(Record);
    Supervisor::new(queue, handlers, ExecutionEngine::new(ScriptExecutor))
}

fn record(id: u64, marker: &str) -> serde_json::Value {
    json!({"id": id, "handler": "record", "params": {"marker": marker}})
}

/// **VALUE**: Verifies that work from different connections reaches the host in submission order.
///
/// **WHY THIS MATTERS**: The host is single-threaded and stateful. Clients rely on a request
/// submitted earlier observing nothing from one submitted later.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Each connection had its own queue drained in arbitrary order
/// - The drain loop reordered or batched tasks by connection
#[tokio::test]
async fn given_two_connections_when_tasks_queued_then_host_runs_them_fifo() {
    // GIVEN: A running server whose host is not draining yet
    let queue = Arc::new(TaskQueue::new());
    let supervisor = journal_supervisor(Arc::clone(&queue));
    let address = supervisor.start(&test_config(false)).expect("start");
    let mut first = connect(address).await;
    let mut second = connect(address).await;

    // WHEN: Connection one submits, then connection two, then the host drains once
    send_json(&mut first, &record(1, "first")).await;
    assert!(wait_until(|| queue.pending() == 1).await);
    send_json(&mut second, &record(1, "second")).await;
    assert!(wait_until(|| queue.pending() == 2).await);

    let mut journal = Journal::new();
    let report = queue.drain(&mut journal);

    // THEN: Both ran in one pass, in submission order, and each client got its own result
    assert_eq!(report.executed, 2);
    assert_eq!(journal, vec!["first", "second"]);
    assert_eq!(receive_json(&mut first).await["result"], json!(1));
    assert_eq!(receive_json(&mut second).await["result"], json!(2));
}

/// **VALUE**: Verifies that a panicking task is reported to its client and does not block others.
///
/// **WHY THIS MATTERS**: One buggy handler must not take down the host's idle loop or
/// strand every other client waiting on the queue.
///
/// **BUG THIS CATCHES**: Would catch a panic escaping the drain loop.
#[tokio::test]
async fn given_panicking_task_when_drained_then_error_response_and_next_task_runs() {
    // GIVEN: A running server with a draining host
    let queue = Arc::new(TaskQueue::new());
    let _host = TestHost::spawn(Arc::clone(&queue), Journal::new());
    let supervisor = journal_supervisor(Arc::clone(&queue));
    let address = supervisor.start(&test_config(false)).expect("start");
    let mut stream = connect(address).await;

    // WHEN: A panicking request is followed by a normal one
    let failed = request(&mut stream, &record(1, "panic")).await;
    let recorded = request(&mut stream, &record(2, "after")).await;

    // THEN: The panic is reported as a handler failure, and the host kept going
    assert_eq!(failed["output"], serde_json::Value::Null);
    assert!(
        failed["error"]
            .as_str()
            .is_some_and(|e| e.starts_with("Handler 'record' failed:")),
        "unexpected error: {failed}"
    );
    assert_eq!(recorded["output"], json!("recorded after"));
    assert_eq!(recorded["result"], json!(1));
}
