//! Unified error type shared across the agent crates

use thiserror::Error;

/// Errors surfaced at crate boundaries.
///
/// Collaborator crates convert their own error enums into this one so the
/// conversation layer can branch on the failure class instead of the backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Rate limit, quota exhaustion or timeout on the model collaborator
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Model answered but the response could not be used
    #[error("Model protocol error: {0}")]
    ModelProtocol(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the model collaborator signalled a capacity condition
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, Error::ModelUnavailable(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Internal(format!("serialization: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
