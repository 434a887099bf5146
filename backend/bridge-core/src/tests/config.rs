use crate::config::{BridgeConfig, ENV_AUTO_START, ENV_HOST, ENV_PORT, ENV_REQUIRE_TOKEN};
use crate::error::ConfigError;

use std::collections::HashMap;
use std::time::Duration;

use tempfile::TempDir;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn given_defaults_then_server_binds_localhost_4777_without_token() {
    let config = BridgeConfig::default();

    assert_eq!(config.version, 1);
    assert_eq!(config.server.address(), "localhost:4777");
    assert!(!config.server.require_token);
    assert!(!config.server.auto_start);
    assert!(config.server.network_enabled);
    assert_eq!(config.server.shutdown_timeout(), Duration::from_secs(5));
    assert!(config.validate().is_ok());
}

#[test]
fn given_missing_file_when_loading_then_returns_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let config = BridgeConfig::load(temp_dir.path()).expect("missing file is not an error");

    assert_eq!(config, BridgeConfig::default());
}

/// **VALUE**: Verifies that a saved config loads back unchanged and leaves no temp file.
///
/// **WHY THIS MATTERS**: The host persists its settings between sessions through this file.
///
/// **BUG THIS CATCHES**: Would catch the temp file never being renamed into place.
#[test]
fn given_saved_config_when_loading_then_values_round_trip() {
    // GIVEN: A customised config saved to disk
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = BridgeConfig::default();
    config.server.port = 5123;
    config.server.require_token = true;
    config.save(temp_dir.path()).expect("save should succeed");

    // WHEN: Loading it back
    let loaded = BridgeConfig::load(temp_dir.path()).expect("load should succeed");

    // THEN: Same values, and only the final file remains
    assert_eq!(loaded, config);
    assert!(temp_dir.path().join("bridge.json").exists());
    assert!(!temp_dir.path().join("bridge.json.tmp").exists());
}

#[test]
fn given_partial_file_when_loading_then_missing_fields_use_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(
        temp_dir.path().join("bridge.json"),
        r#"{"server": {"port": 6000}}"#,
    )
    .expect("write config");

    let config = BridgeConfig::load(temp_dir.path()).expect("load should succeed");

    assert_eq!(config.server.port, 6000);
    assert_eq!(config.server.host, "localhost");
    assert_eq!(config.version, 1);
}

#[test]
fn given_malformed_file_when_loading_then_parse_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(temp_dir.path().join("bridge.json"), "{not json").expect("write config");

    let result = BridgeConfig::load(temp_dir.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn given_invalid_values_when_validating_then_validation_error() {
    let mut low_port = BridgeConfig::default();
    low_port.server.port = 80;
    let mut empty_host = BridgeConfig::default();
    empty_host.server.host = String::from("  ");
    let mut future_version = BridgeConfig::default();
    future_version.version = 2;

    for config in [low_port, empty_host, future_version] {
        assert!(
            matches!(config.validate(), Err(ConfigError::ValidationError { .. })),
            "config should be rejected: {config:?}"
        );
    }
}

#[test]
fn given_env_overrides_when_applied_then_fields_replaced() {
    // GIVEN: Every supported override
    let mut config = BridgeConfig::default();
    let vars = lookup(&[
        (ENV_HOST, "127.0.0.1"),
        (ENV_PORT, " 5555 "),
        (ENV_REQUIRE_TOKEN, "yes"),
        (ENV_AUTO_START, "ON"),
    ]);

    // WHEN: Applying them
    config.apply_env_overrides(vars).expect("overrides are valid");

    // THEN: The config reflects them
    assert_eq!(config.server.address(), "127.0.0.1:5555");
    assert!(config.server.require_token);
    assert!(config.server.auto_start);
}

#[test]
fn given_unparseable_override_when_applied_then_parse_error_names_variable() {
    let mut config = BridgeConfig::default();

    let error = config
        .apply_env_overrides(lookup(&[(ENV_REQUIRE_TOKEN, "maybe")]))
        .expect_err("maybe is not a flag");

    assert!(error.to_string().contains(ENV_REQUIRE_TOKEN), "{error}");
}

#[test]
fn given_override_to_privileged_port_when_applied_then_validation_error() {
    let mut config = BridgeConfig::default();

    let result = config.apply_env_overrides(lookup(&[(ENV_PORT, "22")]));

    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}
