//! Storage collaborators for the lead agent
//!
//! Provides the storage seams the conversation core is written against:
//! - Sessions (per-visitor conversation state)
//! - Leads (tenant-scoped qualification records)
//! - Properties (tenant-scoped listing catalog with an explicit cache)
//!
//! Each seam ships an in-memory implementation. Durable backends implement the
//! same traits.

pub mod error;
pub mod leads;
pub mod properties;
pub mod sessions;

pub use error::PersistenceError;
pub use leads::{InMemoryLeadStore, LeadStore};
pub use properties::{CatalogQuery, InMemoryPropertyCatalog, PropertyCatalog};
pub use sessions::{InMemorySessionStore, SessionStore};
