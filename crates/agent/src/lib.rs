//! Conversation core for the real-estate lead agent
//!
//! Features:
//! - Model-driven dialogue with function calling (`controller`)
//! - Sequential tool execution against the shared session (`orchestrator`)
//! - Deterministic guided dialogue for model-less deployments (`guided`)
//! - Lead create-or-reuse and partial updates (`lead_service`)
//! - Catalog search with budget accounting (`property_search`)

pub mod controller;
pub mod extraction;
pub mod guided;
pub mod lead_service;
pub mod orchestrator;
pub mod property_search;
pub mod session_service;

pub use controller::{LeadAgent, LeadAgentBuilder};
pub use extraction::{extract_contact, ExtractedContact};
pub use guided::{GuidedDialogue, GuidedTurn};
pub use lead_service::LeadService;
pub use orchestrator::{OrchestratorConfig, ToolBatch, ToolOrchestrator};
pub use property_search::{PropertySearch, SearchCriteria, SearchOutcome};

use inmo_agent_persistence::PersistenceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("Storage error: {0}")]
    Storage(#[from] PersistenceError),

    #[error(transparent)]
    Core(#[from] inmo_agent_core::Error),
}
