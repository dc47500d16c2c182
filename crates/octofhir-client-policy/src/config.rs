//! Client policy engine configuration.
//!
//! This module provides the configuration types for the client policy
//! engine itself. Per-condition settings live in
//! [`ComponentConfig`](crate::component::ComponentConfig) and are owned by
//! the realm.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Log levels accepted by [`LoggingConfig::level`].
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Root client policy configuration.
///
/// # Example (TOML)
///
/// ```toml
/// enabled = true
/// short_circuit = false
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientPolicyConfig {
    /// Enable/disable client policy evaluation entirely.
    /// When disabled, evaluation returns no decisions and no executors run.
    pub enabled: bool,

    /// Stop polling a policy's conditions at the first `NO` vote.
    /// Disabling this polls every condition for diagnostics; the verdict
    /// is the same either way.
    pub short_circuit: bool,

    /// Logging configuration (consumed by binaries, not by the core).
    pub logging: LoggingConfig,
}

impl Default for ClientPolicyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            short_circuit: true,
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),

    /// The configuration document could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration file could not be read.
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientPolicyConfig {
    /// Parses and validates a TOML configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML and any error
    /// reported by [`validate`](Self::validate).
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise the
    /// errors of [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the log level is empty and
    /// `ConfigError::InvalidValue` if it is not a known level.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.logging.level.trim();
        if level.is_empty() {
            return Err(ConfigError::Missing("logging.level".to_string()));
        }

        if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue(format!(
                "Invalid log level: '{}'. Must be one of {}",
                level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientPolicyConfig::default();
        assert!(config.enabled);
        assert!(config.short_circuit);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_default_config_validates() {
        let config = ClientPolicyConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_log_level_fails_validation() {
        let mut config = ClientPolicyConfig::default();
        config.logging.level = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn test_unknown_log_level_fails_validation() {
        let mut config = ClientPolicyConfig::default();
        config.logging.level = "verbose".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
        assert!(err.to_string().contains("verbose"));
    }

    #[test]
    fn test_from_toml_partial_document() {
        let config = ClientPolicyConfig::from_toml_str(
            r#"
            short_circuit = false

            [logging]
            level = "DEBUG"
            "#,
        )
        .unwrap();

        assert!(config.enabled);
        assert!(!config.short_circuit);
        assert_eq!(config.logging.level, "DEBUG");
    }

    #[test]
    fn test_from_toml_malformed() {
        let err = ClientPolicyConfig::from_toml_str("enabled = maybe").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client-policy.toml");
        std::fs::write(&path, "enabled = false\n").unwrap();

        let config = ClientPolicyConfig::from_file(&path).unwrap();
        assert!(!config.enabled);

        let missing = ClientPolicyConfig::from_file(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue("test error".to_string());
        assert_eq!(err.to_string(), "Invalid configuration value: test error");

        let err = ConfigError::Missing("required_field".to_string());
        assert_eq!(
            err.to_string(),
            "Missing required configuration: required_field"
        );
    }
}
