//! Configuration management for mediacork
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use mediacork::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `MEDIACORK__<section>__<key>`
//!
//! Examples:
//! - `MEDIACORK__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `MEDIACORK__NEGOTIATION__DEFAULT_ACCEPT=text/html`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/mediacork.toml`.
//! This can be overridden using the `MEDIACORK_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use models::{Config, NegotiationConfig, ServerConfig};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Failed to render configuration: {0}")]
    RenderError(#[from] toml::ser::Error),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or
    /// validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[negotiation]
charset = "utf-8"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.negotiation.charset, "utf-8");
        assert_eq!(config.negotiation.default_accept, "*/*");
    }

    #[test]
    fn test_validation_rejects_bad_alias() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[negotiation.formats]
csv = ["csv"]
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::InvalidFormatMediaType { .. })
        ));
    }

    #[test]
    fn test_configured_aliases_extend_builtins() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[negotiation.formats]
yaml = ["application/yaml", "text/yaml"]
json = ["application/json"]
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        let aliases = config.negotiation.format_aliases();
        assert_eq!(aliases.expand("yaml"), vec!["application/yaml", "text/yaml"]);
        assert_eq!(aliases.expand("json"), vec!["application/json"]);
        assert_eq!(aliases.expand("html").len(), 2);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let rendered = Config::default().to_toml().unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.server.bind_addr, Config::default().server.bind_addr);
        assert_eq!(parsed.negotiation.stream_chunk_size, 65536);
    }
}
