//! Lead store

use async_trait::async_trait;
use chrono::Utc;
use inmo_agent_core::{Lead, LeadId, LeadPatch, NewLead};
use parking_lot::RwLock;
use std::collections::BTreeMap;

use crate::PersistenceError;

/// Lead store trait
///
/// Tenant isolation is enforced here: `update` and `get` never touch a lead
/// owned by a different tenant.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Create a lead and return the assigned id
    async fn create(&self, lead: NewLead) -> Result<LeadId, PersistenceError>;

    /// Write only the fields present in `patch`
    async fn update(
        &self,
        id: LeadId,
        tenant_id: &str,
        patch: LeadPatch,
    ) -> Result<(), PersistenceError>;

    /// Most recent lead of a visitor within a tenant
    async fn find_by_visitor(
        &self,
        visitor_id: &str,
        tenant_id: &str,
    ) -> Result<Option<Lead>, PersistenceError>;

    async fn get(&self, id: LeadId, tenant_id: &str) -> Result<Option<Lead>, PersistenceError>;

    /// All leads of a tenant, newest first
    async fn list(&self, tenant_id: &str) -> Result<Vec<Lead>, PersistenceError>;
}

/// In-memory lead store with sequential ids starting at 1
#[derive(Default)]
pub struct InMemoryLeadStore {
    inner: RwLock<LeadTable>,
}

#[derive(Default)]
struct LeadTable {
    last_id: LeadId,
    rows: BTreeMap<LeadId, Lead>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn create(&self, lead: NewLead) -> Result<LeadId, PersistenceError> {
        if lead.tenant_id.is_empty() {
            return Err(PersistenceError::InvalidData("tenant_id is required".into()));
        }

        let now = Utc::now();
        let mut table = self.inner.write();
        table.last_id += 1;
        let id = table.last_id;

        table.rows.insert(
            id,
            Lead {
                id,
                tenant_id: lead.tenant_id,
                visitor_id: lead.visitor_id,
                source_type: lead.source_type,
                operacion: lead.operacion,
                zona: lead.zona,
                presupuesto_max: lead.presupuesto_max,
                nombre: lead.nombre,
                contacto: lead.contacto,
                summary: None,
                created_at: now,
                updated_at: now,
            },
        );

        Ok(id)
    }

    async fn update(
        &self,
        id: LeadId,
        tenant_id: &str,
        patch: LeadPatch,
    ) -> Result<(), PersistenceError> {
        let mut table = self.inner.write();
        let lead = table
            .rows
            .get_mut(&id)
            .ok_or(PersistenceError::LeadNotFound(id))?;

        if lead.tenant_id != tenant_id {
            return Err(PersistenceError::TenantMismatch {
                lead_id: id,
                tenant_id: tenant_id.to_string(),
            });
        }

        if patch.is_empty() {
            return Ok(());
        }

        patch.apply_to(lead);
        lead.updated_at = Utc::now();
        Ok(())
    }

    async fn find_by_visitor(
        &self,
        visitor_id: &str,
        tenant_id: &str,
    ) -> Result<Option<Lead>, PersistenceError> {
        let table = self.inner.read();
        // Ids grow with creation time, so the highest id is the latest lead
        Ok(table
            .rows
            .values()
            .rev()
            .find(|l| l.visitor_id == visitor_id && l.tenant_id == tenant_id)
            .cloned())
    }

    async fn get(&self, id: LeadId, tenant_id: &str) -> Result<Option<Lead>, PersistenceError> {
        let table = self.inner.read();
        Ok(table
            .rows
            .get(&id)
            .filter(|l| l.tenant_id == tenant_id)
            .cloned())
    }

    async fn list(&self, tenant_id: &str) -> Result<Vec<Lead>, PersistenceError> {
        let table = self.inner.read();
        Ok(table
            .rows
            .values()
            .rev()
            .filter(|l| l.tenant_id == tenant_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inmo_agent_core::{Operation, SourceType};

    fn new_lead(tenant: &str, visitor: &str) -> NewLead {
        NewLead {
            tenant_id: tenant.to_string(),
            visitor_id: visitor.to_string(),
            source_type: SourceType::WebChat,
            operacion: Some(Operation::Alquiler),
            zona: Some("Palermo".into()),
            presupuesto_max: Some(250_000.0),
            nombre: None,
            contacto: None,
        }
    }

    #[tokio::test]
    async fn test_sequential_ids() {
        let store = InMemoryLeadStore::new();
        assert_eq!(store.create(new_lead("t1", "v1")).await.unwrap(), 1);
        assert_eq!(store.create(new_lead("t1", "v2")).await.unwrap(), 2);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let store = InMemoryLeadStore::new();
        let id = store.create(new_lead("t1", "v1")).await.unwrap();

        let patch = LeadPatch {
            nombre: Some("Ana".into()),
            ..Default::default()
        };
        store.update(id, "t1", patch).await.unwrap();

        let lead = store.get(id, "t1").await.unwrap().unwrap();
        assert_eq!(lead.nombre.as_deref(), Some("Ana"));
        assert_eq!(lead.zona.as_deref(), Some("Palermo"));
        assert!(lead.summary.is_none());
        assert!(lead.updated_at >= lead.created_at);
    }

    #[tokio::test]
    async fn test_update_enforces_tenant() {
        let store = InMemoryLeadStore::new();
        let id = store.create(new_lead("t1", "v1")).await.unwrap();

        let err = store
            .update(id, "t2", LeadPatch::default().with_summary("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::TenantMismatch { .. }));
        assert!(store.get(id, "t2").await.unwrap().is_none());

        let err = store.update(99, "t1", LeadPatch::default()).await.unwrap_err();
        assert_eq!(err, PersistenceError::LeadNotFound(99));
    }

    #[tokio::test]
    async fn test_find_by_visitor_returns_latest() {
        let store = InMemoryLeadStore::new();
        store.create(new_lead("t1", "v1")).await.unwrap();
        store.create(new_lead("t2", "v1")).await.unwrap();
        let latest = store.create(new_lead("t1", "v1")).await.unwrap();

        let found = store.find_by_visitor("v1", "t1").await.unwrap().unwrap();
        assert_eq!(found.id, latest);
        assert!(store.find_by_visitor("v9", "t1").await.unwrap().is_none());
        assert_eq!(store.list("t1").await.unwrap().len(), 2);
    }
}
