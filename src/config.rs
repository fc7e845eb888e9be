//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub hub: HubConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Connection handling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// Maximum number of concurrent connections
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Largest inbound text frame accepted, in bytes
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,

    /// Hard ceiling enforced by the transport; larger frames drop the connection
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

fn default_max_connections() -> usize {
    1000
}

fn default_max_message_bytes() -> usize {
    64 * 1024 // 64 KB
}

fn default_max_frame_bytes() -> usize {
    1024 * 1024 // 1 MB
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            max_message_bytes: default_max_message_bytes(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

impl HubConfig {
    /// Largest message the transport buffers before giving up on a connection
    ///
    /// Never below `max_message_bytes`, so oversized frames under the ceiling
    /// still get an error reply instead of a dropped connection.
    pub fn transport_limit(&self) -> usize {
        self.max_frame_bytes.max(self.max_message_bytes)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// First existing config file among the default locations
    pub fn locate() -> Option<PathBuf> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("switchboard").join("config.toml")),
            Some(PathBuf::from("/etc/switchboard/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        config_paths.into_iter().flatten().find(|p| p.exists())
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Server overrides
        if let Some(host) = var("SWITCHBOARD_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("SWITCHBOARD_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }

        // Hub overrides
        if let Some(max) = var("SWITCHBOARD_MAX_CONNECTIONS").and_then(|m| m.parse().ok()) {
            self.hub.max_connections = max;
        }

        // Logging overrides
        if let Some(level) = var("SWITCHBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("SWITCHBOARD_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Switchboard Configuration
#
# Environment variables override these settings:
# - SWITCHBOARD_HOST
# - SWITCHBOARD_PORT
# - SWITCHBOARD_MAX_CONNECTIONS
# - SWITCHBOARD_LOG_LEVEL
# - SWITCHBOARD_LOG_FORMAT

[server]
# Host to bind to
host = "0.0.0.0"

# Port to listen on
port = 8090

[hub]
# Maximum number of concurrent WebSocket connections
max_connections = 1000

# Largest inbound text frame accepted (bytes); larger ones get an error reply
max_message_bytes = 65536

# Hard ceiling on inbound frames (bytes); larger ones close the connection
max_frame_bytes = 1048576

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.addr(), "0.0.0.0:8090");
        assert_eq!(config.hub.max_connections, 1000);
        assert_eq!(config.hub.max_message_bytes, 65536);
        assert_eq!(config.hub.transport_limit(), 1024 * 1024);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.is_json());
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config = Config::parse(&generate_default_config()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.server.addr(), defaults.server.addr());
        assert_eq!(config.hub.max_connections, defaults.hub.max_connections);
        assert_eq!(config.hub.max_message_bytes, defaults.hub.max_message_bytes);
        assert_eq!(config.hub.max_frame_bytes, defaults.hub.max_frame_bytes);
        assert_eq!(config.logging.format, defaults.logging.format);
    }

    #[test]
    fn test_transport_limit_covers_message_limit() {
        let config = Config::parse("[hub]\nmax_message_bytes = 4096\nmax_frame_bytes = 1024\n")
            .unwrap();
        assert_eq!(config.hub.transport_limit(), 4096);

        let config = Config::parse("[hub]\nmax_message_bytes = 16\nmax_frame_bytes = 64\n")
            .unwrap();
        assert_eq!(config.hub.transport_limit(), 64);
    }

    #[test]
    fn test_partial_config() {
        let config =
            Config::parse("[server]\nport = 9000\n\n[logging]\nformat = \"json\"\n").unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.hub.max_connections, 1000);
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[hub]\nmax_connections = 5").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.hub.max_connections, 5);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();

        let result = Config::load(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SWITCHBOARD_HOST", "127.0.0.1"),
            ("SWITCHBOARD_PORT", "7000"),
            ("SWITCHBOARD_MAX_CONNECTIONS", "not-a-number"),
            ("SWITCHBOARD_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.addr(), "127.0.0.1:7000");
        // Unparseable values are ignored
        assert_eq!(config.hub.max_connections, 1000);
        assert!(config.logging.is_json());
    }
}
