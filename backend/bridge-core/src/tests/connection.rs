use crate::HOST_VERSION;
use crate::error::{AuthError, HandlerError};
use crate::exec::{ExecutionEngine, ScriptExecutor};
use crate::handlers::{Handler, HandlerOutcome, HandlerRegistry, Params};
use crate::ipc::connection::process_message;
use crate::ipc::{BridgeServices, ConnectionState};
use crate::protocol::read_frame;
use crate::scene::Scene;
use crate::task_queue::TaskQueue;
use crate::tests::fixtures::{HostThread, sample_scene};
use crate::value::HostValue;

use common::RedactedToken;

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{Value, json};

const TOKEN: &str = "secret-token";

struct Fixture {
    services: BridgeServices<Scene>,
    _host: HostThread,
}

impl Fixture {
    fn new() -> Self {
        Self::with_registry(HandlerRegistry::with_scene_handlers())
    }

    fn with_registry(registry: HandlerRegistry<Scene>) -> Self {
        let queue = Arc::new(TaskQueue::new());
        let host = HostThread::spawn(Arc::clone(&queue), sample_scene());
        let services = BridgeServices::new(queue, registry, ExecutionEngine::new(ScriptExecutor));
        Self {
            services,
            _host: host,
        }
    }

    /// Sends one message and returns every response frame it produced.
    async fn send(&self, state: &mut ConnectionState, message: Value) -> Vec<Value> {
        self.send_raw(state, message.to_string().as_bytes()).await
    }

    async fn send_raw(&self, state: &mut ConnectionState, payload: &[u8]) -> Vec<Value> {
        let mut written = Vec::new();
        process_message(payload, state, &self.services, &mut written, peer())
            .await
            .expect("writing to a Vec cannot fail");

        let mut reader = written.as_slice();
        let mut responses = Vec::new();
        while let Some(frame) = read_frame(&mut reader, u32::MAX)
            .await
            .expect("responses are well framed")
        {
            responses.push(serde_json::from_slice(&frame).expect("responses are JSON"));
        }
        responses
    }
}

fn peer() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 50000))
}

fn open() -> ConnectionState {
    ConnectionState::new(None)
}

fn guarded() -> ConnectionState {
    ConnectionState::new(Some(RedactedToken::new(TOKEN.to_string())))
}

// ============================================
// CONNECTION STATE
// ============================================

#[test]
fn given_no_expected_token_when_authenticating_then_always_succeeds() {
    let mut state = open();

    assert!(state.authenticate(None).is_ok());
    assert!(state.is_authenticated());
    assert!(!state.requires_token());
}

#[test]
fn given_expected_token_when_authenticating_then_checks_presence_and_value() {
    let mut state = guarded();

    assert!(matches!(
        state.authenticate(None),
        Err(AuthError::MissingToken { .. })
    ));
    assert!(matches!(
        state.authenticate(Some(&json!("wrong"))),
        Err(AuthError::InvalidToken { .. })
    ));
    assert!(matches!(
        state.authenticate(Some(&json!(42))),
        Err(AuthError::InvalidToken { .. })
    ));
    assert!(!state.is_authenticated());

    assert!(state.authenticate(Some(&json!(TOKEN))).is_ok());
    assert!(state.is_authenticated());
}

// ============================================
// DISPATCH
// ============================================

#[tokio::test]
async fn given_print_code_when_processed_then_execution_response_with_output() {
    let fixture = Fixture::new();
    let mut state = open();

    let responses = fixture
        .send(&mut state, json!({"id": "1", "code": "print('hi')"}))
        .await;

    assert_eq!(
        responses,
        vec![json!({"id": "1", "output": "hi\n", "error": null, "stream_end": true})]
    );
}

#[tokio::test]
async fn given_failing_code_when_processed_then_error_set_and_output_null() {
    let fixture = Fixture::new();
    let mut state = open();

    let responses = fixture
        .send(&mut state, json!({"id": 2, "code": "raise RuntimeError('nope')"}))
        .await;

    assert_eq!(responses[0]["id"], json!(2));
    assert_eq!(responses[0]["output"], Value::Null);
    assert_eq!(responses[0]["error"], json!("RuntimeError: nope"));
}

/// **VALUE**: Verifies that streaming code yields one chunk per printed line then one terminal message.
///
/// **WHY THIS MATTERS**: Clients read until `stream_end` is true; a missing terminal hangs them.
///
/// **BUG THIS CATCHES**: Would catch chunks written after the terminal or lines lost at the end.
#[tokio::test]
async fn given_streaming_code_when_processed_then_chunks_precede_terminal() {
    // GIVEN: An open connection
    let fixture = Fixture::new();
    let mut state = open();

    // WHEN: Streaming three prints
    let responses = fixture
        .send(
            &mut state,
            json!({"id": "s", "code": "print('a')\nprint('b')\nprint('c')", "stream": true}),
        )
        .await;

    // THEN: Three chunks then the terminal
    assert_eq!(responses.len(), 4);
    for (response, expected) in responses.iter().zip(["a", "b", "c"]) {
        assert_eq!(
            response,
            &json!({"id": "s", "chunk": expected, "stream_end": false})
        );
    }
    assert_eq!(
        responses[3],
        json!({"id": "s", "output": "", "error": null, "stream_end": true})
    );
}

#[tokio::test]
async fn given_handler_request_when_processed_then_result_included() {
    let fixture = Fixture::new();
    let mut state = open();

    let responses = fixture
        .send(
            &mut state,
            json!({"id": 3, "handler": "list_objects", "params": {"type": "CAMERA"}}),
        )
        .await;

    let response = &responses[0];
    assert_eq!(response["output"], json!("Found 1 objects of type CAMERA"));
    assert_eq!(response["error"], Value::Null);
    assert_eq!(response["result"]["objects"][0]["name"], json!("Camera"));
    assert_eq!(response["stream_end"], json!(true));
}

#[tokio::test]
async fn given_unknown_handler_when_processed_then_error_names_handler() {
    let fixture = Fixture::new();
    let mut state = open();

    let responses = fixture
        .send(&mut state, json!({"id": 4, "handler": "nope"}))
        .await;

    assert_eq!(
        responses,
        vec![json!({
            "id": 4,
            "output": null,
            "error": "Handler 'nope' failed: Unknown handler: nope",
            "stream_end": true
        })]
    );
}

#[tokio::test]
async fn given_invalid_messages_when_processed_then_error_responses_and_connection_usable() {
    // GIVEN: An open connection
    let fixture = Fixture::new();
    let mut state = open();

    // WHEN: Sending garbage, a message without an id and one without a directive
    let garbage = fixture.send_raw(&mut state, b"{oops").await;
    let no_id = fixture.send(&mut state, json!({"code": "pass"})).await;
    let no_directive = fixture.send(&mut state, json!({"id": 9})).await;
    let valid = fixture
        .send(&mut state, json!({"id": 10, "code": "print(1)"}))
        .await;

    // THEN: Each error is answered, and the next valid request still works
    assert_eq!(garbage[0]["id"], Value::Null);
    assert!(garbage[0]["error"].as_str().is_some_and(|e| e.starts_with("Invalid JSON")));
    assert_eq!(no_id[0]["error"], json!("Missing required field: id"));
    assert_eq!(no_directive[0]["id"], json!(9));
    assert_eq!(
        no_directive[0]["error"],
        json!(r#"Missing required field: either "code" or "handler""#)
    );
    assert_eq!(valid[0]["output"], json!("1\n"));
}

/// Returns a mapping keyed by a tuple, which has no JSON representation.
struct TupleKeyed;

impl Handler<Scene> for TupleKeyed {
    fn name(&self) -> &'static str {
        "tuple_keyed"
    }

    fn call(&self, _host: &mut Scene, _params: &Params) -> Result<HandlerOutcome, HandlerError> {
        let key = HostValue::Tuple(vec![HostValue::Int(1), HostValue::Int(2)]);
        Ok(HandlerOutcome::success(
            "built",
            HostValue::Map(vec![(key, HostValue::Int(2))]),
        ))
    }
}

/// **VALUE**: Verifies that a handler result with no JSON form still produces
/// exactly one frame, naming the offending path.
///
/// **WHY THIS MATTERS**: A client waits for one answer per request. Dropping
/// the frame would leave it blocked forever and desynchronize every later
/// response on the connection.
///
/// **BUG THIS CATCHES**: Would catch `send_response` returning early on a
/// serialization failure, or the fallback losing the request id.
#[tokio::test]
async fn given_unserializable_result_when_processed_then_fallback_frame_and_connection_usable() {
    // GIVEN: A registry whose handler returns a tuple-keyed mapping
    let mut registry = HandlerRegistry::with_scene_handlers();
    registry.register(TupleKeyed);
    let fixture = Fixture::with_registry(registry);
    let mut state = open();

    // WHEN: The handler is invoked
    let responses = fixture
        .send(&mut state, json!({"id": 7, "handler": "tuple_keyed", "params": {}}))
        .await;

    // THEN: One minimal error frame for the same id, localized to the key
    assert_eq!(responses.len(), 1);
    let fallback = &responses[0];
    assert_eq!(fallback["id"], json!(7));
    assert_eq!(fallback["output"], Value::Null);
    assert_eq!(fallback["stream_end"], json!(true));
    assert!(fallback.get("result").is_none());
    let error = fallback["error"].as_str().expect("error is a string");
    assert!(error.starts_with("JSON serialization error: "), "{error}");
    assert!(error.contains("root['result'][(1, 2)]"), "{error}");

    // THEN: The next request on the same connection is answered normally
    let next = fixture
        .send(&mut state, json!({"id": 8, "code": "print('still here')"}))
        .await;
    assert_eq!(
        next,
        vec![json!({"id": 8, "output": "still here\n", "error": null, "stream_end": true})]
    );
}

// ============================================
// AUTHENTICATION
// ============================================

#[tokio::test]
async fn given_token_required_when_message_has_no_token_then_auth_error_and_nothing_runs() {
    let fixture = Fixture::new();
    let mut state = guarded();

    let responses = fixture
        .send(&mut state, json!({"id": 1, "code": "print('x')"}))
        .await;

    assert_eq!(
        responses,
        vec![json!({
            "id": 1,
            "authenticated": false,
            "error": "Authentication required: missing token"
        })]
    );
    assert!(!state.is_authenticated());
}

#[tokio::test]
async fn given_token_required_when_bare_auth_message_then_acknowledged_with_version() {
    let fixture = Fixture::new();
    let mut state = guarded();

    let responses = fixture
        .send(&mut state, json!({"id": "auth", "token": TOKEN}))
        .await;

    assert_eq!(
        responses,
        vec![json!({"id": "auth", "authenticated": true, "host_version": HOST_VERSION})]
    );
    assert!(state.is_authenticated());
}

/// **VALUE**: Verifies that authentication is sticky for the rest of the connection.
///
/// **WHY THIS MATTERS**: Clients send the token once and then only directives.
///
/// **BUG THIS CATCHES**: Would catch later messages being re-checked for a token.
#[tokio::test]
async fn given_authenticated_connection_when_later_messages_lack_token_then_executed() {
    // GIVEN: A connection authenticated by a message that also carries code
    let fixture = Fixture::new();
    let mut state = guarded();
    let first = fixture
        .send(&mut state, json!({"id": 1, "token": TOKEN, "code": "print('first')"}))
        .await;

    // WHEN: Sending without a token
    let second = fixture
        .send(&mut state, json!({"id": 2, "code": "print('second')"}))
        .await;

    // THEN: Both ran; the first was executed rather than acknowledged
    assert_eq!(first[0]["output"], json!("first\n"));
    assert_eq!(second[0]["output"], json!("second\n"));
}

#[tokio::test]
async fn given_wrong_token_when_processed_then_invalid_token_error() {
    let fixture = Fixture::new();
    let mut state = guarded();

    let responses = fixture
        .send(&mut state, json!({"id": 1, "token": "guess"}))
        .await;

    assert_eq!(responses[0]["authenticated"], json!(false));
    assert_eq!(
        responses[0]["error"],
        json!("Authentication failed: invalid token")
    );
}
