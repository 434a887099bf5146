use crate::bridge_tests::helpers::{
    connect, is_connection_closed, receive_json, request, send_frame, send_json,
    start_test_bridge, test_config,
};

use serde_json::{Value, json};
use tokio::io::AsyncWriteExt;

/// **VALUE**: Verifies the basic round trip: code in, printed output back.
///
/// **WHY THIS MATTERS**: This is the primary use of the bridge. Every client depends on it.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Framing on either side disagrees on prefix size or byte order
/// - Code never reaches the host thread
/// - The response id or `stream_end` flag is missing
#[tokio::test]
async fn given_running_bridge_when_code_sent_then_receives_printed_output() {
    // GIVEN: A running bridge and a connected client
    let bridge = start_test_bridge(&test_config(false));
    let mut stream = connect(bridge.address).await;

    // WHEN: Sending a print
    let response = request(&mut stream, &json!({"id": "1", "code": "print('hi')"})).await;

    // THEN: The output comes back under the same id
    assert_eq!(
        response,
        json!({"id": "1", "output": "hi\n", "error": null, "stream_end": true})
    );
}

#[tokio::test]
async fn given_pipelined_requests_when_sent_then_responses_arrive_in_request_order() {
    // GIVEN: A connected client
    let bridge = start_test_bridge(&test_config(false));
    let mut stream = connect(bridge.address).await;

    // WHEN: Writing three requests before reading anything
    for i in 0..3 {
        send_json(&mut stream, &json!({"id": i, "code": format!("print({i})")})).await;
    }

    // THEN: Responses come back one per request, in order
    for i in 0..3 {
        let response = receive_json(&mut stream).await;
        assert_eq!(response["id"], json!(i));
        assert_eq!(response["output"], json!(format!("{i}\n")));
    }
}

#[tokio::test]
async fn given_handler_request_when_sent_then_result_is_returned() {
    let bridge = start_test_bridge(&test_config(false));
    let mut stream = connect(bridge.address).await;

    let response = request(
        &mut stream,
        &json!({"id": 7, "handler": "get_object_info", "params": {"name": "Cube"}}),
    )
    .await;

    assert_eq!(response["output"], json!("Retrieved info for object: Cube"));
    assert_eq!(response["result"]["object"]["type"], json!("MESH"));
    assert_eq!(response["result"]["object"]["active"], json!(true));
}

#[tokio::test]
async fn given_malformed_json_when_sent_then_error_response_and_connection_stays_open() {
    // GIVEN: A connected client
    let bridge = start_test_bridge(&test_config(false));
    let mut stream = connect(bridge.address).await;

    // WHEN: Sending a frame that is not JSON
    send_frame(&mut stream, b"not json at all").await;
    let error = receive_json(&mut stream).await;

    // THEN: An error with a null id, and the connection still serves requests
    assert_eq!(error["id"], Value::Null);
    assert!(error["error"].as_str().is_some_and(|e| e.starts_with("Invalid JSON")));
    let response = request(&mut stream, &json!({"id": 2, "code": "print('still here')"})).await;
    assert_eq!(response["output"], json!("still here\n"));
}

/// **VALUE**: Verifies that a frame cut off mid-payload ends the connection silently.
///
/// **WHY THIS MATTERS**: A partial frame cannot be answered; the server must not hang or
/// execute half a message.
///
/// **BUG THIS CATCHES**: Would catch the server waiting forever on a half-closed socket or
/// replying to a truncated message.
#[tokio::test]
async fn given_truncated_frame_when_peer_half_closes_then_connection_closed_without_response() {
    // GIVEN: A connected client
    let bridge = start_test_bridge(&test_config(false));
    let mut stream = connect(bridge.address).await;

    // WHEN: Announcing 100 bytes, sending 3, then closing the write side
    stream
        .write_all(&100u32.to_be_bytes())
        .await
        .expect("write prefix");
    stream.write_all(b"{\"i").await.expect("write partial");
    stream.shutdown().await.expect("half close");

    // THEN: The server closes without writing anything
    assert!(is_connection_closed(&mut stream).await);
}

#[tokio::test]
async fn given_oversized_frame_when_announced_then_connection_closed() {
    // GIVEN: A bridge with a small frame limit
    let mut config = test_config(false);
    config.server.max_frame_bytes = 64;
    let bridge = start_test_bridge(&config);
    let mut stream = connect(bridge.address).await;

    // WHEN: Announcing a frame over the limit
    stream
        .write_all(&1_000u32.to_be_bytes())
        .await
        .expect("write prefix");

    // THEN: The connection is dropped
    assert!(is_connection_closed(&mut stream).await);
}
