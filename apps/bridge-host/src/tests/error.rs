// Unit tests for error module
// Tests error serialization (used for status output)

use crate::error::HostError;

use bridge_core::error::{ConfigError, ServerError};

/// **VALUE**: Tests that errors can be serialized with their variant tag.
///
/// **WHY THIS MATTERS**: Status output reports errors as JSON. If serialization breaks,
/// operators get opaque errors.
///
/// **BUG THIS CATCHES**: Would catch if someone removes the `#[derive(Serialize)]`
/// or changes the `type`/`data` tagging.
#[test]
fn given_host_error_when_serialized_then_tagged_with_type_and_data() {
    // GIVEN: A HostError
    let err = HostError::host("Test");

    // WHEN: Serializing to JSON
    let json = serde_json::to_value(&err).expect("Error should be serializable");

    // THEN: Variant tag and message are present
    assert_eq!(json["type"], "Host");
    assert_eq!(json["data"]["message"], "Test");
}

#[test]
fn given_server_error_when_converted_then_core_variant_keeps_message() {
    let err = HostError::from(ServerError::already_running());

    match err {
        HostError::Core { message, .. } => assert!(
            message.contains("Server is already running"),
            "unexpected message: {message}"
        ),
        other => panic!("Expected Core variant, got {other:?}"),
    }
}

#[test]
fn given_config_error_when_converted_then_config_variant() {
    let err = HostError::from(ConfigError::validation("server.host cannot be empty"));

    assert!(matches!(err, HostError::Config { .. }));
    assert!(err.to_string().contains("server.host cannot be empty"));
}
