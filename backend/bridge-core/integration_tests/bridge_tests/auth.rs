use crate::bridge_tests::helpers::{connect, request, start_test_bridge, test_config};

use serde_json::json;

/// **VALUE**: Verifies that an unauthenticated message is rejected and not executed.
///
/// **WHY THIS MATTERS**: With token auth on, the token is the only thing standing between
/// a local process and arbitrary code execution in the host.
///
/// **BUG THIS CATCHES**: Would catch code running before the token is checked.
#[tokio::test]
async fn given_token_required_when_message_has_no_token_then_auth_error() {
    // GIVEN: A bridge requiring a token
    let bridge = start_test_bridge(&test_config(true));
    let mut stream = connect(bridge.address).await;

    // WHEN: Sending code without a token
    let response = request(&mut stream, &json!({"id": 1, "code": "print('x')"})).await;

    // THEN: Auth failure, no output
    assert_eq!(
        response,
        json!({
            "id": 1,
            "authenticated": false,
            "error": "Authentication required: missing token"
        })
    );
}

#[tokio::test]
async fn given_token_required_when_authenticated_once_then_later_messages_run() {
    // GIVEN: A bridge requiring a token, and the token it generated
    let bridge = start_test_bridge(&test_config(true));
    let token = bridge
        .supervisor
        .server_info()
        .token
        .expect("token is generated when required");
    let mut stream = connect(bridge.address).await;

    // WHEN: Authenticating with a bare auth message, then sending code
    let ack = request(&mut stream, &json!({"id": "auth", "token": token})).await;
    let response = request(&mut stream, &json!({"id": 2, "code": "print('ok')"})).await;

    // THEN: Acknowledged with the host version, then executed
    assert_eq!(ack["authenticated"], json!(true));
    assert_eq!(ack["host_version"], json!(bridge_core::HOST_VERSION));
    assert!(ack.get("error").is_none());
    assert_eq!(response["output"], json!("ok\n"));
}

#[tokio::test]
async fn given_wrong_token_when_sent_then_invalid_token_and_connection_not_authenticated() {
    let bridge = start_test_bridge(&test_config(true));
    let mut stream = connect(bridge.address).await;

    let rejected = request(&mut stream, &json!({"id": 1, "token": "guess"})).await;
    let still_rejected = request(&mut stream, &json!({"id": 2, "code": "print(1)"})).await;

    assert_eq!(rejected["error"], json!("Authentication failed: invalid token"));
    assert_eq!(still_rejected["authenticated"], json!(false));
}

#[tokio::test]
async fn given_separate_connections_when_one_authenticates_then_other_is_still_rejected() {
    let bridge = start_test_bridge(&test_config(true));
    let token = bridge.supervisor.server_info().token.expect("token");
    let mut first = connect(bridge.address).await;
    let mut second = connect(bridge.address).await;

    let ack = request(&mut first, &json!({"id": 1, "token": token})).await;
    let rejected = request(&mut second, &json!({"id": 1, "code": "print(1)"})).await;

    assert_eq!(ack["authenticated"], json!(true));
    assert_eq!(rejected["authenticated"], json!(false));
}

#[tokio::test]
async fn given_token_disabled_when_sending_code_then_runs_without_token() {
    let bridge = start_test_bridge(&test_config(false));
    let mut stream = connect(bridge.address).await;

    let response = request(&mut stream, &json!({"id": 1, "code": "print('open')"})).await;

    assert_eq!(response["output"], json!("open\n"));
    assert_eq!(bridge.supervisor.server_info().token, None);
}
