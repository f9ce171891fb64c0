//! Conversation agent settings

use serde::{Deserialize, Serialize};

/// Which dialogue drives the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DialogueMode {
    /// Language model with tool calling
    #[default]
    Model,
    /// Deterministic step-by-step questionnaire, no model calls
    Guided,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub mode: DialogueMode,

    /// History entries kept per session
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Listings returned by a property search
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Per tool call budget
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,

    /// Texts that reset the conversation, compared trimmed and lowercased
    #[serde(default = "default_reset_commands")]
    pub reset_commands: Vec<String>,

    /// Summary used when the model escalates without one
    #[serde(default = "default_handoff_summary")]
    pub default_handoff_summary: String,

    /// Attach a visitor's open lead from storage when the session has none
    #[serde(default = "default_true")]
    pub attach_prior_lead: bool,
}

fn default_max_history() -> usize {
    10
}

fn default_search_limit() -> usize {
    10
}

fn default_tool_timeout_secs() -> u64 {
    10
}

fn default_reset_commands() -> Vec<String> {
    vec!["/reset".to_string(), "reset".to_string()]
}

fn default_handoff_summary() -> String {
    "Lead interesado".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            mode: DialogueMode::default(),
            max_history: default_max_history(),
            search_limit: default_search_limit(),
            tool_timeout_secs: default_tool_timeout_secs(),
            reset_commands: default_reset_commands(),
            default_handoff_summary: default_handoff_summary(),
            attach_prior_lead: true,
        }
    }
}

impl AgentConfig {
    /// Whether `text` is one of the configured reset commands
    pub fn is_reset_command(&self, text: &str) -> bool {
        let normalized = text.trim().to_lowercase();
        self.reset_commands
            .iter()
            .any(|cmd| cmd.trim().to_lowercase() == normalized)
    }
}
