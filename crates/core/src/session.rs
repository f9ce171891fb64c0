//! Ephemeral per-visitor conversation state

use serde::{Deserialize, Serialize};

use crate::lead::{LeadData, LeadId, SourceType};

/// Step of the guided dialogue. The model-driven dialogue carries it but never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Start,
    AskOperation,
    AskZone,
    AskBudget,
    ShowResults,
    Handoff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Conversation session for one visitor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub step: Step,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<LeadData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<LeadId>,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    /// Listing ids last shown by the guided dialogue
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub last_results: Vec<String>,
}

/// Identity a turn runs under, resolved by the channel layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationScope {
    pub visitor_id: String,
    pub tenant_id: String,
    pub source_type: SourceType,
}

impl ConversationScope {
    pub fn new(
        visitor_id: impl Into<String>,
        tenant_id: impl Into<String>,
        source_type: SourceType,
    ) -> Self {
        Self {
            visitor_id: visitor_id.into(),
            tenant_id: tenant_id.into(),
            source_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session() {
        let session = Session::default();
        assert_eq!(session.step, Step::Start);
        assert!(session.data.is_none());
        assert!(session.lead_id.is_none());
        assert!(session.history.is_empty());
    }

    #[test]
    fn test_session_serialization() {
        let session = Session {
            step: Step::AskBudget,
            lead_id: Some(3),
            history: vec![ChatMessage::user("hola")],
            ..Default::default()
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["step"], "ask_budget");
        assert_eq!(json["leadId"], 3);
        assert_eq!(json["history"][0]["role"], "user");
        assert!(json.get("lastResults").is_none());
    }
}
