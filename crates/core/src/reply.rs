//! Entry-point request and reply shapes

use serde::{Deserialize, Serialize};

use crate::lead::SourceType;
use crate::session::ConversationScope;

/// Inbound message as handed over by a channel adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotRequest {
    pub user_id: String,
    pub text: String,
    pub tenant_id: String,
    #[serde(default)]
    pub source_type: SourceType,
}

impl BotRequest {
    pub fn new(
        user_id: impl Into<String>,
        text: impl Into<String>,
        tenant_id: impl Into<String>,
        source_type: SourceType,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            text: text.into(),
            tenant_id: tenant_id.into(),
            source_type,
        }
    }

    pub fn scope(&self) -> ConversationScope {
        ConversationScope::new(&self.user_id, &self.tenant_id, self.source_type)
    }
}

/// Human handoff signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handoff {
    pub summary: String,
}

/// Reply returned for every inbound message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotReply {
    pub messages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handoff: Option<Handoff>,
}

impl BotReply {
    pub fn new(messages: Vec<String>) -> Self {
        Self {
            messages,
            handoff: None,
        }
    }

    pub fn text(message: impl Into<String>) -> Self {
        Self::new(vec![message.into()])
    }

    pub fn with_handoff(mut self, summary: impl Into<String>) -> Self {
        self.handoff = Some(Handoff {
            summary: summary.into(),
        });
        self
    }
}
