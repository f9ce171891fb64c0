//! Tool protocol layer
//!
//! Bridges model-emitted tool calls to deterministic backend actions:
//! - `catalog`: the fixed tool set and its JSON schemas (a stable contract with prompts)
//! - `parser`: tolerant parsing of raw tool calls and their argument strings
//! - `invocation`: one validated variant per tool
//! - `result`: tool results fed back to the model

pub mod catalog;
pub mod error;
pub mod invocation;
pub mod parser;
pub mod result;
pub mod schema;

pub use catalog::{
    find_schema, tool_catalog, tool_definitions, ESCALATE, SAVE_CONTACT, SEARCH_PROPERTIES,
};
pub use error::ToolError;
pub use invocation::{ContactArgs, EscalateArgs, SearchArgs, ToolInvocation};
pub use parser::{parse_tool_calls, safe_json_parse};
pub use result::ToolResult;
pub use schema::{InputSchema, PropertySchema, ToolSchema};
