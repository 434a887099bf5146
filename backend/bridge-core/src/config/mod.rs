use crate::error::ConfigError;
use crate::protocol::DEFAULT_MAX_FRAME_BYTES;
use crate::{DEFAULT_HOST, DEFAULT_PORT};

use common::ErrorLocation;

use std::panic::Location;
use std::path::Path;
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "bridge.json";
const CONFIG_VERSION: u32 = 1;
const MIN_PORT: u16 = 1024;

pub const ENV_HOST: &str = "BRIDGE_HOST";
pub const ENV_PORT: &str = "BRIDGE_PORT";
pub const ENV_REQUIRE_TOKEN: &str = "BRIDGE_REQUIRE_TOKEN";
pub const ENV_AUTO_START: &str = "BRIDGE_AUTO_START";

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub auto_start: bool,
    #[serde(default)]
    pub require_token: bool,
    /// Mirrors the host's "allow online access" switch; `start` refuses to
    /// bind while it is off.
    #[serde(default = "default_network_enabled")]
    pub network_enabled: bool,
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: u32,
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            auto_start: false,
            require_token: false,
            network_enabled: default_network_enabled(),
            max_frame_bytes: default_max_frame_bytes(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
        }
    }
}

impl ServerConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// `host:port` as passed to the socket layer.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BridgeConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: ServerConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_network_enabled() -> bool {
    true
}
fn default_max_frame_bytes() -> u32 {
    DEFAULT_MAX_FRAME_BYTES
}
fn default_shutdown_timeout_ms() -> u64 {
    5_000
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ============================================
// IMPLEMENTATION
// ============================================

impl BridgeConfig {
    /// Load config from {config_dir}/bridge.json.
    ///
    /// # Returns
    ///
    /// Returns defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read, parsed
    /// or validated.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: BridgeConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/bridge.json using temp file + rename.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation,
    /// serialization, the write or the rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{CONFIG_FILE_NAME}.tmp"));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::validation(format!(
                "Invalid version: {} (expected 1-{})",
                self.version, CONFIG_VERSION
            )));
        }

        if self.server.host.trim().is_empty() {
            return Err(ConfigError::validation("server.host cannot be empty"));
        }

        if self.server.port < MIN_PORT {
            return Err(ConfigError::validation(format!(
                "Invalid port: {} (must be {MIN_PORT}-65535)",
                self.server.port
            )));
        }

        if self.server.max_frame_bytes == 0 {
            return Err(ConfigError::validation(
                "server.max_frame_bytes must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Applies `BRIDGE_*` overrides read through `lookup`, then validates.
    ///
    /// `lookup` is usually `|key| std::env::var(key).ok()`; tests pass a map.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] if an override cannot be parsed, or
    /// [`ConfigError::ValidationError`] if the result is invalid.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            info!("{} overrides server.host", ENV_HOST);
            self.server.host = host;
        }

        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::env_override(ENV_PORT, &port))?;
            info!("{} overrides server.port", ENV_PORT);
        }

        if let Some(flag) = lookup(ENV_REQUIRE_TOKEN) {
            self.server.require_token = parse_flag(&flag)
                .ok_or_else(|| ConfigError::env_override(ENV_REQUIRE_TOKEN, &flag))?;
            info!("{} overrides server.require_token", ENV_REQUIRE_TOKEN);
        }

        if let Some(flag) = lookup(ENV_AUTO_START) {
            self.server.auto_start = parse_flag(&flag)
                .ok_or_else(|| ConfigError::env_override(ENV_AUTO_START, &flag))?;
            info!("{} overrides server.auto_start", ENV_AUTO_START);
        }

        self.validate()
    }
}
