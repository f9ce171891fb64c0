//! Configuration management for the lead agent
//!
//! Supports loading configuration from:
//! - YAML/TOML/JSON files under `config/` (`default`, then `{env}`)
//! - Environment variables (`INMO_AGENT__SECTION__KEY`)
//!
//! Every field has a default, so an empty environment yields a working
//! development configuration.

pub mod agent;
pub mod prompts;
pub mod settings;

pub use agent::{AgentConfig, DialogueMode};
pub use prompts::PromptsConfig;
pub use settings::{
    load_settings, load_settings_from, CatalogConfig, LlmSettings, ObservabilityConfig,
    RuntimeEnvironment, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(path) => ConfigError::FileNotFound(path),
            other => ConfigError::ParseError(other.to_string()),
        }
    }
}
