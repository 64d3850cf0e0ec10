//! Application configuration.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on. Overridable with the `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum concurrent WebSocket connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> usize {
    32
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            max_connections: default_max_connections(),
        }
    }
}

/// Simulator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Generate synthetic monitoring data while no device is connected.
    #[serde(default = "default_simulator_enabled")]
    pub enabled: bool,
    /// Tick interval in milliseconds.
    #[serde(default = "default_simulator_interval_ms")]
    pub interval_ms: u64,
}

fn default_simulator_enabled() -> bool {
    true
}

fn default_simulator_interval_ms() -> u64 {
    2_000
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            enabled: default_simulator_enabled(),
            interval_ms: default_simulator_interval_ms(),
        }
    }
}

/// Device liveness configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessConfig {
    /// Check interval in milliseconds.
    #[serde(default = "default_liveness_check_interval_ms")]
    pub check_interval_ms: u64,
    /// Device is considered gone after this long without a push or an
    /// open channel.
    #[serde(default = "default_liveness_timeout_window_ms")]
    pub timeout_window_ms: u64,
}

fn default_liveness_check_interval_ms() -> u64 {
    5_000
}

fn default_liveness_timeout_window_ms() -> u64 {
    10_000
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: default_liveness_check_interval_ms(),
            timeout_window_ms: default_liveness_timeout_window_ms(),
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Simulator settings.
    #[serde(default)]
    pub simulator: SimulatorConfig,
    /// Device liveness settings.
    #[serde(default)]
    pub liveness: LivenessConfig,
    /// Telemetry settings.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration for the given CLI path.
    ///
    /// Resolution order: `--config` flag, then the `ESPRELAY_CONFIG`
    /// env var, then `config/default.toml` if present, then pure
    /// defaults. An explicitly named file must exist and parse.
    pub fn load(cli_path: Option<String>) -> AppResult<Self> {
        let mut config = match cli_path.or_else(|| std::env::var("ESPRELAY_CONFIG").ok()) {
            Some(path) => Self::from_file(&path)?,
            None => {
                let default_path = "config/default.toml";
                if Path::new(default_path).exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_port_override(std::env::var("PORT").ok());
        Ok(config)
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Apply the `PORT` override to the listen port.
    ///
    /// Non-numeric values are ignored rather than fatal, so a stray
    /// platform variable cannot keep the relay from starting.
    fn apply_port_override(&mut self, value: Option<String>) {
        if let Some(raw) = value {
            match raw.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => {
                    tracing::warn!(value = %raw, "Ignoring non-numeric PORT override");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.max_connections, 32);
        assert!(config.simulator.enabled);
        assert_eq!(config.simulator.interval_ms, 2_000);
        assert_eq!(config.liveness.check_interval_ms, 5_000);
        assert_eq!(config.liveness.timeout_window_ms, 10_000);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 8080

            [simulator]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.max_connections, 32);
        assert!(!config.simulator.enabled);
        assert_eq!(config.liveness.timeout_window_ms, 10_000);
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_port_override() {
        let mut config = AppConfig::default();
        config.apply_port_override(Some("8123".to_string()));
        assert_eq!(config.server.port, 8123);

        config.apply_port_override(Some("not-a-port".to_string()));
        assert_eq!(config.server.port, 8123);

        config.apply_port_override(None);
        assert_eq!(config.server.port, 8123);
    }

    #[test]
    fn test_from_file_missing_is_config_error() {
        let result = AppConfig::from_file("/nonexistent/esprelay.toml");
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
