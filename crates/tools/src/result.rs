//! Tool results fed back into the second model call

use inmo_agent_core::{Message, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

/// `{role: "tool", tool_call_id, content}` with JSON-encoded content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub role: Role,
    pub tool_call_id: String,
    pub content: String,
}

impl ToolResult {
    pub fn success(tool_call_id: impl Into<String>, payload: &Value) -> Self {
        Self {
            role: Role::Tool,
            tool_call_id: tool_call_id.into(),
            content: payload.to_string(),
        }
    }

    pub fn failure(tool_call_id: impl Into<String>, error: &ToolError) -> Self {
        Self::success(tool_call_id, &error.to_payload())
    }

    /// Decoded content
    pub fn payload(&self) -> Value {
        serde_json::from_str(&self.content).unwrap_or(Value::Null)
    }

    pub fn is_error(&self) -> bool {
        self.payload().get("error").is_some()
    }

    pub fn to_message(&self) -> Message {
        Message::tool(self.content.clone(), self.tool_call_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_result() {
        let result = ToolResult::success("call_1", &json!({"ok": true, "leadId": 3}));
        assert!(!result.is_error());
        assert_eq!(result.payload()["leadId"], 3);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call_1");
    }

    #[test]
    fn test_failure_result_to_message() {
        let result = ToolResult::failure("call_2", &ToolError::UnknownTool("x".into()));
        assert!(result.is_error());

        let message = result.to_message();
        assert_eq!(message.role, Role::Tool);
        assert_eq!(message.tool_call_id.as_deref(), Some("call_2"));
        assert_eq!(message.content, r#"{"error":"Unknown tool: x"}"#);
    }
}
