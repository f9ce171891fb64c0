//! Core traits for the lead agent
//!
//! Collaborators the conversation core consumes through trait objects so that
//! backends can be swapped and tests can use scripted fakes:
//!
//! ```text
//! Language Models:
//!   - LanguageModel: chat generation with tool calling
//! ```
//!
//! Storage seams (sessions, leads, property catalog) live in the persistence crate.

mod llm;

pub use llm::LanguageModel;
