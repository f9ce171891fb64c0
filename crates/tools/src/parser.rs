//! Tolerant parsing of model-emitted tool calls

use inmo_agent_core::ToolCall;
use serde_json::{json, Value};

/// Keep the well-formed calls, drop the rest
pub fn parse_tool_calls(raw: &[Value]) -> Vec<ToolCall> {
    let calls: Vec<ToolCall> = raw
        .iter()
        .filter_map(|value| serde_json::from_value::<ToolCall>(value.clone()).ok())
        .collect();

    let dropped = raw.len() - calls.len();
    if dropped > 0 {
        tracing::warn!(dropped, kept = calls.len(), "Discarded malformed tool calls");
    }

    calls
}

/// Parse an argument string, falling back to `{}` on malformed JSON
pub fn safe_json_parse(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| json!({}))
}
