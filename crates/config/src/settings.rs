//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{AgentConfig, ConfigError, DialogueMode, PromptsConfig};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation
    #[default]
    Development,
    /// Staging mode
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Conversation agent configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// Model collaborator configuration
    #[serde(default)]
    pub llm: LlmSettings,

    /// Prompt and reply templates
    #[serde(default)]
    pub prompts: PromptsConfig,

    /// Property catalog seeding
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_api_key")]
    pub api_key: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    /// Azure OpenAI API version; when set, `model` names the deployment
    #[serde(default)]
    pub api_version: Option<String>,
}

fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key() -> String {
    std::env::var("OPENAI_API_KEY").unwrap_or_default()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    400
}

fn default_llm_timeout_secs() -> u64 {
    30
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            api_key: default_api_key(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout_secs(),
            api_version: None,
        }
    }
}

/// Optional listing seed for the in-memory catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON array of properties
    #[serde(default)]
    pub seed_path: Option<String>,

    /// Tenant the seed is registered under
    #[serde(default = "default_tenant_id")]
    pub tenant_id: String,
}

fn default_tenant_id() -> String {
    "default".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            seed_path: None,
            tenant_id: default_tenant_id(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_agent()?;
        self.validate_prompts()?;
        self.validate_llm()?;
        Ok(())
    }

    fn validate_agent(&self) -> Result<(), ConfigError> {
        let agent = &self.agent;

        if agent.max_history == 0 {
            return Err(ConfigError::invalid("agent.max_history", "must be at least 1"));
        }
        if agent.search_limit == 0 {
            return Err(ConfigError::invalid("agent.search_limit", "must be at least 1"));
        }
        if agent.tool_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "agent.tool_timeout_secs",
                "must be at least 1 second",
            ));
        }
        if agent.reset_commands.iter().all(|c| c.trim().is_empty()) {
            return Err(ConfigError::invalid(
                "agent.reset_commands",
                "at least one non-empty command is required",
            ));
        }

        Ok(())
    }

    fn validate_prompts(&self) -> Result<(), ConfigError> {
        let count = self.prompts.unavailable_replies.len();
        if count != 2 {
            return Err(ConfigError::invalid(
                "prompts.unavailable_replies",
                format!("expected exactly 2 messages, got {}", count),
            ));
        }
        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;

        if !(0.0..=2.0).contains(&llm.temperature) {
            return Err(ConfigError::invalid(
                "llm.temperature",
                format!("Must be between 0.0 and 2.0, got {}", llm.temperature),
            ));
        }

        if self.environment.is_production()
            && self.agent.mode == DialogueMode::Model
            && llm.api_key.trim().is_empty()
        {
            return Err(ConfigError::MissingField("llm.api_key".to_string()));
        }

        Ok(())
    }
}

/// Load settings from `config/` and the environment
///
/// Priority: env vars > config/{env}.* > config/default.* > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from an explicit config directory
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    // Load default config
    let default_path = dir.join("default");
    builder = builder.add_source(File::with_name(&default_path.to_string_lossy()).required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        let env_path = dir.join(env_name);
        builder = builder.add_source(File::with_name(&env_path.to_string_lossy()).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("INMO_AGENT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.environment, RuntimeEnvironment::Development);
        assert_eq!(settings.agent.max_history, 10);
        assert_eq!(settings.catalog.tenant_id, "default");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_agent_validation() {
        let mut settings = Settings::default();

        settings.agent.max_history = 0;
        assert!(settings.validate_agent().is_err());
        settings.agent.max_history = 10;

        settings.agent.search_limit = 0;
        assert!(settings.validate_agent().is_err());
        settings.agent.search_limit = 10;

        settings.agent.tool_timeout_secs = 0;
        assert!(settings.validate_agent().is_err());
        settings.agent.tool_timeout_secs = 5;

        settings.agent.reset_commands = vec!["  ".to_string()];
        assert!(settings.validate_agent().is_err());
        settings.agent.reset_commands = vec!["/reset".to_string()];

        assert!(settings.validate_agent().is_ok());
    }

    #[test]
    fn test_unavailable_replies_must_be_two() {
        let mut settings = Settings::default();
        settings.prompts.unavailable_replies.pop();
        assert!(settings.validate_prompts().is_err());
    }

    #[test]
    fn test_temperature_bounds() {
        let mut settings = Settings::default();
        settings.llm.temperature = 2.5;
        assert!(settings.validate_llm().is_err());
        settings.llm.temperature = 1.0;
        assert!(settings.validate_llm().is_ok());
    }

    #[test]
    fn test_production_requires_api_key_in_model_mode() {
        let mut settings = Settings::default();
        settings.environment = RuntimeEnvironment::Production;
        settings.llm.api_key = String::new();
        assert!(settings.validate_llm().is_err());

        settings.agent.mode = DialogueMode::Guided;
        assert!(settings.validate_llm().is_ok());

        settings.agent.mode = DialogueMode::Model;
        settings.llm.api_key = "sk-test".to_string();
        assert!(settings.validate_llm().is_ok());
    }

    #[test]
    fn test_load_layers_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[agent]\nsearch_limit = 5\nmax_history = 6\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("staging.toml"),
            "environment = \"staging\"\n[agent]\nmode = \"guided\"\nmax_history = 8\n",
        )
        .unwrap();

        let settings = load_settings_from(dir.path(), Some("staging")).unwrap();
        assert_eq!(settings.environment, RuntimeEnvironment::Staging);
        assert_eq!(settings.agent.mode, DialogueMode::Guided);
        assert_eq!(settings.agent.search_limit, 5);
        assert_eq!(settings.agent.max_history, 8);
        assert_eq!(settings.agent.tool_timeout_secs, 10);
    }

    #[test]
    fn test_env_vars_override_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[llm]\nmodel = \"from-file\"\nmax_tokens = 100\n",
        )
        .unwrap();

        // Only llm fields are touched; no other loader test asserts on them
        std::env::set_var("INMO_AGENT__LLM__MODEL", "from-env");
        std::env::set_var("INMO_AGENT__LLM__MAX_TOKENS", "512");
        let result = load_settings_from(dir.path(), None);
        std::env::remove_var("INMO_AGENT__LLM__MODEL");
        std::env::remove_var("INMO_AGENT__LLM__MAX_TOKENS");

        let settings = result.unwrap();
        assert_eq!(settings.llm.model, "from-env");
        assert_eq!(settings.llm.max_tokens, 512);
        assert!(settings.llm.api_version.is_none());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[agent]\nsearch_limit = 0\n").unwrap();

        let err = load_settings_from(dir.path(), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
