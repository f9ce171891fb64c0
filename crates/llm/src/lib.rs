//! LLM integration
//!
//! Features:
//! - OpenAI-compatible chat completions (OpenAI, Azure OpenAI, vLLM, local servers)
//! - Tool calling in the OpenAI function format
//! - Capacity errors classified so callers can degrade to a fallback reply

pub mod backend;

pub use backend::{OpenAIBackend, OpenAIConfig};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for inmo_agent_core::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::RateLimited(_) | LlmError::Timeout => {
                inmo_agent_core::Error::ModelUnavailable(err.to_string())
            }
            LlmError::InvalidResponse(_) => inmo_agent_core::Error::ModelProtocol(err.to_string()),
            other => inmo_agent_core::Error::Llm(other.to_string()),
        }
    }
}
