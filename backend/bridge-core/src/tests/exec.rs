use crate::exec::{
    BufferSink, CodeExecutor, ExecutionEngine, OutputSink, ScriptExecutor, StreamSink,
};
use crate::task_queue::TaskQueue;
use crate::tests::fixtures::HostThread;

use std::sync::Arc;

use tokio::sync::mpsc;

fn run(source: &str) -> (Result<(), crate::error::ExecError>, String) {
    let mut sink = BufferSink::default();
    let result = CodeExecutor::<()>::execute(&ScriptExecutor, &mut (), source, &mut sink);
    (result, sink.into_output())
}

#[test]
fn given_print_of_string_when_executed_then_output_has_trailing_newline() {
    let (result, output) = run("print('hi')");

    assert!(result.is_ok());
    assert_eq!(output, "hi\n");
}

#[test]
fn given_print_with_mixed_literals_when_executed_then_space_joined() {
    let (result, output) = run("# setup\n\nprint(\"a\", 1, 2.0, True, None)\npass");

    assert!(result.is_ok());
    assert_eq!(output, "a 1 2.0 True None\n");
}

#[test]
fn given_raise_when_executed_then_error_carries_kind_and_message() {
    let (result, output) = run("print('before')\nraise ValueError(\"bad input\")\nprint('after')");

    let error = result.expect_err("raise must fail");
    assert_eq!(error.client_message(), "ValueError: bad input");
    assert_eq!(output, "before\n");
}

/// **VALUE**: Verifies that denied primitives behave as if they do not exist.
///
/// **WHY THIS MATTERS**: The sandbox must never let client code reach eval, file or process primitives.
///
/// **BUG THIS CATCHES**: Would catch a deny-list entry being dropped or only checked at statement start.
#[test]
fn given_denied_primitive_when_executed_then_name_error() {
    // GIVEN: Denied names used directly and as a print argument
    let sources = ["open('/etc/passwd')", "eval('1')", "print(exec('x'))"];

    for source in sources {
        // WHEN: Executing
        let (result, _) = run(source);

        // THEN: NameError naming the primitive
        let error = result.expect_err("denied primitive must fail");
        assert_eq!(error.kind, "NameError", "source: {source}");
        assert!(error.message.contains("is not defined"), "source: {source}");
    }
}

#[test]
fn given_unsupported_statement_when_executed_then_syntax_error() {
    let (result, _) = run("x = 1");

    assert_eq!(result.expect_err("must fail").kind, "SyntaxError");
}

#[test]
fn given_stream_sink_when_written_then_sends_one_chunk_per_non_blank_line() {
    // GIVEN: A stream sink
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut sink = StreamSink::new(tx);

    // WHEN: Writing text with blank lines and a trailing newline
    sink.write("first\n\n   \nsecond\n");
    sink.write("\n");

    // THEN: Only the non-blank lines were sent, without newlines
    assert_eq!(sink.sent(), 2);
    assert_eq!(rx.try_recv().ok().as_deref(), Some("first"));
    assert_eq!(rx.try_recv().ok().as_deref(), Some("second"));
    assert!(rx.try_recv().is_err());
}

#[test]
fn given_closed_channel_when_stream_sink_written_then_does_not_panic() {
    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);
    let mut sink = StreamSink::new(tx);

    sink.write("line\n");

    assert_eq!(sink.sent(), 0);
}

/// **VALUE**: Verifies the engine runs code on the host thread and maps failures to `(None, "Kind: msg")`.
///
/// **WHY THIS MATTERS**: This is the exact `(output, error)` contract the connection copies onto the wire.
///
/// **BUG THIS CATCHES**: Would catch partial output leaking into a failed result.
#[tokio::test]
async fn given_engine_when_executing_then_success_and_failure_follow_output_error_contract() {
    // GIVEN: An engine with a host thread draining its queue
    let queue: Arc<TaskQueue<()>> = Arc::new(TaskQueue::new());
    let _host = HostThread::spawn(Arc::clone(&queue), ());
    let engine: ExecutionEngine<()> = ExecutionEngine::new(ScriptExecutor);

    // WHEN: Executing good and bad code
    let ok = engine.execute(String::from("print('hi')"), &queue).await;
    let failed = engine
        .execute(String::from("print('partial')\nraise KeyError('k')"), &queue)
        .await;

    // THEN: Exactly one of output/error is set
    assert_eq!(ok.output.as_deref(), Some("hi\n"));
    assert_eq!(ok.error, None);
    assert_eq!(failed.output, None);
    assert_eq!(failed.error.as_deref(), Some("KeyError: k"));
}

#[tokio::test]
async fn given_engine_when_streaming_then_lines_arrive_and_outcome_output_is_empty() {
    // GIVEN: An engine with a host thread
    let queue: Arc<TaskQueue<()>> = Arc::new(TaskQueue::new());
    let _host = HostThread::spawn(Arc::clone(&queue), ());
    let engine: ExecutionEngine<()> = ExecutionEngine::new(ScriptExecutor);
    let (tx, mut rx) = mpsc::unbounded_channel();

    // WHEN: Streaming three prints
    let outcome = engine
        .execute_streaming(String::from("print(1)\nprint(2)\nprint(3)"), tx, &queue)
        .await;

    // THEN: Three chunks, then an empty successful outcome
    let mut chunks = Vec::new();
    while let Some(chunk) = rx.recv().await {
        chunks.push(chunk);
    }
    assert_eq!(chunks, vec!["1", "2", "3"]);
    assert_eq!(outcome.output.as_deref(), Some(""));
    assert!(outcome.is_success());
}
