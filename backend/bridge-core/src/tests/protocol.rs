use crate::error::{DispatchError, FramingError, ProtocolError, SerializationError};
use crate::protocol::{Directive, Request, Response, read_frame, write_frame};
use crate::value::HostValue;

use serde_json::{Value, json};

fn frame(payload: &[u8]) -> Vec<u8> {
    let mut bytes = (payload.len() as u32).to_be_bytes().to_vec();
    bytes.extend_from_slice(payload);
    bytes
}

fn wire(response: &Response) -> Value {
    let text = response.to_wire().expect("response should serialize");
    serde_json::from_str(&text).expect("wire text should be JSON")
}

// ============================================
// FRAMING
// ============================================

#[tokio::test]
async fn given_written_frame_when_read_back_then_payload_matches() {
    // GIVEN: A frame written to a buffer
    let mut buffer = Vec::new();
    write_frame(&mut buffer, br#"{"id":1}"#)
        .await
        .expect("write should succeed");

    // WHEN: Reading it back
    let mut reader = buffer.as_slice();
    let payload = read_frame(&mut reader, 1024).await.expect("read should succeed");

    // THEN: Big-endian prefix followed by the payload
    assert_eq!(&buffer[..4], &[0, 0, 0, 8]);
    assert_eq!(payload.as_deref(), Some(&br#"{"id":1}"#[..]));
}

#[tokio::test]
async fn given_clean_eof_between_frames_when_reading_then_returns_none() {
    let mut reader: &[u8] = &[];

    let payload = read_frame(&mut reader, 1024).await.expect("clean EOF is not an error");

    assert!(payload.is_none());
}

/// **VALUE**: Verifies that a stream ending inside the length prefix is a framing error.
///
/// **WHY THIS MATTERS**: A half-read prefix means the byte stream is out of sync; continuing would misparse everything after.
///
/// **BUG THIS CATCHES**: Would catch a short prefix being treated as a clean disconnect or zero-padded.
#[tokio::test]
async fn given_eof_mid_prefix_when_reading_then_truncated_error() {
    // GIVEN: Only two of four prefix bytes
    let mut reader: &[u8] = &[0, 0];

    // WHEN: Reading
    let error = read_frame(&mut reader, 1024)
        .await
        .expect_err("partial prefix must fail");

    // THEN: Reported as truncation
    assert!(error.is_truncation());
}

#[tokio::test]
async fn given_eof_mid_payload_when_reading_then_truncated_error() {
    // GIVEN: A prefix announcing 10 bytes followed by only 3
    let mut bytes = 10u32.to_be_bytes().to_vec();
    bytes.extend_from_slice(b"abc");
    let mut reader = bytes.as_slice();

    // WHEN: Reading
    let error = read_frame(&mut reader, 1024)
        .await
        .expect_err("short payload must fail");

    // THEN: Reported as truncation
    assert!(matches!(error, FramingError::Truncated { .. }));
}

#[tokio::test]
async fn given_length_above_limit_when_reading_then_frame_too_large() {
    let bytes = frame(&[b'x'; 64]);
    let mut reader = bytes.as_slice();

    let error = read_frame(&mut reader, 16)
        .await
        .expect_err("oversized frame must fail");

    assert!(matches!(
        error,
        FramingError::FrameTooLarge { size: 64, max: 16, .. }
    ));
}

// ============================================
// REQUESTS
// ============================================

#[test]
fn given_invalid_json_when_parsing_then_invalid_json_error() {
    let error = Request::parse(b"{not json").expect_err("must fail");

    assert!(matches!(error, ProtocolError::InvalidJson { .. }));
    assert!(error.message().starts_with("Invalid JSON: "));
}

#[test]
fn given_message_without_id_when_parsing_then_missing_id_error() {
    let error = Request::parse(br#"{"code":"pass"}"#).expect_err("must fail");

    assert_eq!(error.message(), "Missing required field: id");
}

#[test]
fn given_non_object_json_when_parsing_then_not_an_object_error() {
    let error = Request::parse(b"[1,2,3]").expect_err("must fail");

    assert!(matches!(error, ProtocolError::NotAnObject { .. }));
}

#[test]
fn given_handler_request_when_reading_directive_then_returns_name_and_params() {
    // GIVEN: A handler request with a token
    let request = Request::parse(
        br#"{"id":"7","token":"t","handler":"list_objects","params":{"type":"MESH"}}"#,
    )
    .expect("valid request");

    // WHEN: Reading the directive
    let directive = request.directive().expect("valid directive");

    // THEN: Fields are split out
    assert_eq!(request.id, json!("7"));
    assert_eq!(request.token, Some(json!("t")));
    let Directive::Handler { name, params } = directive else {
        panic!("expected a handler directive");
    };
    assert_eq!(name, "list_objects");
    assert_eq!(params.get("type"), Some(&json!("MESH")));
}

#[test]
fn given_code_request_without_stream_when_reading_directive_then_defaults_to_non_streaming() {
    let request = Request::parse(br#"{"id":1,"code":"print('hi')"}"#).expect("valid request");

    assert_eq!(
        request.directive().expect("valid directive"),
        Directive::Code {
            source: String::from("print('hi')"),
            stream: false
        }
    );
}

/// **VALUE**: Verifies that carrying both `code` and `handler` is rejected instead of silently picking one.
///
/// **WHY THIS MATTERS**: A client that sends both has a bug; running either branch hides it.
///
/// **BUG THIS CATCHES**: Would catch a regression to "first-checked field wins" precedence.
#[test]
fn given_code_and_handler_when_reading_directive_then_ambiguous_error() {
    let request =
        Request::parse(br#"{"id":1,"code":"pass","handler":"list_objects"}"#).expect("valid");

    let error = request.directive().expect_err("must be ambiguous");

    assert!(matches!(error, DispatchError::AmbiguousDirective { .. }));
}

#[test]
fn given_neither_code_nor_handler_when_reading_directive_then_missing_directive_error() {
    let request = Request::parse(br#"{"id":1}"#).expect("valid");

    let error = request.directive().expect_err("must be missing");

    assert!(!request.has_directive());
    assert_eq!(
        error.message(),
        r#"Missing required field: either "code" or "handler""#
    );
}

#[test]
fn given_wrongly_typed_fields_when_reading_directive_then_invalid_params() {
    let bad_params = Request::parse(br#"{"id":1,"handler":"x","params":[1]}"#).expect("valid");
    let bad_stream = Request::parse(br#"{"id":1,"code":"pass","stream":"yes"}"#).expect("valid");

    assert!(matches!(
        bad_params.directive(),
        Err(DispatchError::InvalidParams { .. })
    ));
    assert!(matches!(
        bad_stream.directive(),
        Err(DispatchError::InvalidParams { .. })
    ));
}

// ============================================
// RESPONSES
// ============================================

#[test]
fn given_execution_response_when_encoded_then_matches_wire_shape() {
    let response = Response::Execution {
        id: json!("1"),
        output: Some(String::from("hi\n")),
        error: None,
    };

    assert_eq!(
        wire(&response),
        json!({"id": "1", "output": "hi\n", "error": null, "stream_end": true})
    );
}

#[test]
fn given_chunk_response_when_encoded_then_stream_end_is_false() {
    let response = Response::chunk(json!(5), "line");

    assert_eq!(
        wire(&response),
        json!({"id": 5, "chunk": "line", "stream_end": false})
    );
    assert!(!response.ends_stream());
}

#[test]
fn given_auth_responses_when_encoded_then_only_relevant_fields_present() {
    let failed = Response::auth_failed(json!("2"), "Authentication required: missing token");
    let succeeded = Response::auth_succeeded(json!("3"), "1.0.0");

    assert_eq!(
        wire(&failed),
        json!({"id": "2", "authenticated": false, "error": "Authentication required: missing token"})
    );
    assert_eq!(
        wire(&succeeded),
        json!({"id": "3", "authenticated": true, "host_version": "1.0.0"})
    );
}

/// **VALUE**: Verifies that a non-serializable handler result is localized under `root['result']`.
///
/// **WHY THIS MATTERS**: The error path is what tells a handler author which field to fix.
///
/// **BUG THIS CATCHES**: Would catch the path prefix being lost when the result is embedded in a response.
#[test]
fn given_handler_result_with_set_when_encoded_then_error_path_starts_at_result() {
    // GIVEN: A handler response holding a set
    let response = Response::Handler {
        id: json!(1),
        output: Some(String::from("ok")),
        error: None,
        result: Some(HostValue::map([("tags", HostValue::Set(vec![]))])),
    };

    // WHEN: Encoding
    let error = response.to_wire().expect_err("sets cannot be encoded");

    // THEN: The path is rooted at the response
    assert_eq!(error.path(), "root['result']['tags']");
}

#[test]
fn given_serialization_error_when_building_fallback_then_minimal_error_response() {
    let error = SerializationError::value("root['result']", "set", None);

    let fallback = Response::serialization_fallback(json!(9), &error);

    assert_eq!(
        wire(&fallback),
        json!({
            "id": 9,
            "output": null,
            "error": "JSON serialization error: Non-serializable object at path 'root['result']': type set",
            "stream_end": true
        })
    );
}
