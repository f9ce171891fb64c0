//! Persistence error types

use inmo_agent_core::LeadId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistenceError {
    #[error("Lead not found: {0}")]
    LeadNotFound(LeadId),

    #[error("Lead {lead_id} does not belong to tenant {tenant_id}")]
    TenantMismatch { lead_id: LeadId, tenant_id: String },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<PersistenceError> for inmo_agent_core::Error {
    fn from(err: PersistenceError) -> Self {
        inmo_agent_core::Error::Storage(err.to_string())
    }
}
