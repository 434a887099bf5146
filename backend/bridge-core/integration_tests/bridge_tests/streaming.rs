use crate::bridge_tests::helpers::{
    connect, receive_json, request, send_json, start_test_bridge, test_config,
};

use serde_json::{Value, json};

/// **VALUE**: Verifies that streaming mode emits one chunk per printed line, then a terminal.
///
/// **WHY THIS MATTERS**: Long-running scripts report progress through chunks; clients stop
/// reading at the first `stream_end: true`.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Lines are batched into one chunk or lost
/// - The terminal message is missing or arrives before the last chunk
#[tokio::test]
async fn given_streaming_request_when_code_prints_lines_then_one_chunk_each_then_terminal() {
    // GIVEN: A connected client
    let bridge = start_test_bridge(&test_config(false));
    let mut stream = connect(bridge.address).await;
    let source = (1..=5)
        .map(|i| format!("print('line {i}')"))
        .collect::<Vec<_>>()
        .join("\n");

    // WHEN: Sending streaming code that prints five lines
    send_json(&mut stream, &json!({"id": "s1", "code": source, "stream": true})).await;

    // THEN: Five chunks, then the terminal message
    for i in 1..=5 {
        let chunk = receive_json(&mut stream).await;
        assert_eq!(
            chunk,
            json!({"id": "s1", "chunk": format!("line {i}"), "stream_end": false})
        );
    }
    let terminal = receive_json(&mut stream).await;
    assert_eq!(
        terminal,
        json!({"id": "s1", "output": "", "error": null, "stream_end": true})
    );
}

#[tokio::test]
async fn given_streaming_code_that_fails_then_chunks_before_failure_then_error_terminal() {
    let bridge = start_test_bridge(&test_config(false));
    let mut stream = connect(bridge.address).await;

    send_json(
        &mut stream,
        &json!({"id": 9, "code": "print('started')\nraise ValueError('halt')", "stream": true}),
    )
    .await;

    let chunk = receive_json(&mut stream).await;
    let terminal = receive_json(&mut stream).await;
    assert_eq!(chunk["chunk"], json!("started"));
    assert_eq!(terminal["output"], Value::Null);
    assert_eq!(terminal["error"], json!("ValueError: halt"));
    assert_eq!(terminal["stream_end"], json!(true));
}

#[tokio::test]
async fn given_stream_finished_when_next_request_sent_then_connection_still_usable() {
    let bridge = start_test_bridge(&test_config(false));
    let mut stream = connect(bridge.address).await;

    let terminal = request(&mut stream, &json!({"id": 1, "code": "pass", "stream": true})).await;
    let response = request(&mut stream, &json!({"id": 2, "code": "print('next')"})).await;

    assert_eq!(terminal["stream_end"], json!(true));
    assert_eq!(response["output"], json!("next\n"));
}
