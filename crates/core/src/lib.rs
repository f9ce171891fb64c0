//! Core traits and types for the real-estate lead agent
//!
//! This crate provides foundational types used across all other crates:
//! - Session, lead and property domain types
//! - LLM request/response types and the `LanguageModel` trait
//! - Entry-point request/reply shapes
//! - Error types

pub mod error;
pub mod lead;
pub mod llm_types;
pub mod property;
pub mod reply;
pub mod session;
pub mod traits;

pub use error::{Error, Result};
pub use lead::{Lead, LeadData, LeadId, LeadPatch, NewLead, Operation, SourceType};
pub use llm_types::{
    FinishReason, FunctionCall, GenerateRequest, GenerateResponse, Message, Role, TokenUsage,
    ToolCall, ToolCallKind, ToolDefinition,
};
pub use property::Property;
pub use reply::{BotReply, BotRequest, Handoff};
pub use session::{ChatMessage, ChatRole, ConversationScope, Session, Step};

pub use traits::LanguageModel;
