//! Create-or-reuse and partial updates of persisted leads

use inmo_agent_core::{ConversationScope, Lead, LeadData, LeadId, LeadPatch, NewLead};
use inmo_agent_persistence::{LeadStore, PersistenceError};
use std::sync::Arc;

use crate::session_service::can_create_lead;

#[derive(Clone)]
pub struct LeadService {
    store: Arc<dyn LeadStore>,
}

impl LeadService {
    pub fn new(store: Arc<dyn LeadStore>) -> Self {
        Self { store }
    }

    /// Return the existing id, or create a lead when the data allows it
    ///
    /// Creation needs either complete search criteria or a name/contact.
    /// Returns `None` when neither holds.
    pub async fn load_or_create_lead(
        &self,
        scope: &ConversationScope,
        data: &LeadData,
        existing_lead_id: Option<LeadId>,
    ) -> Result<Option<LeadId>, PersistenceError> {
        if let Some(id) = existing_lead_id {
            return Ok(Some(id));
        }

        if !can_create_lead(data) && !data.has_contact() {
            return Ok(None);
        }

        let id = self
            .store
            .create(NewLead::from_data(
                &scope.tenant_id,
                &scope.visitor_id,
                scope.source_type,
                data,
            ))
            .await?;

        metrics::counter!("inmo_agent_leads_created_total", "source" => scope.source_type.as_str())
            .increment(1);
        tracing::info!(
            lead_id = id,
            tenant_id = %scope.tenant_id,
            visitor_id = %scope.visitor_id,
            source = %scope.source_type,
            contact_only = !can_create_lead(data),
            "Lead created"
        );

        Ok(Some(id))
    }

    /// Write the fields present in `partial`, plus `summary` when given
    pub async fn update_lead_data(
        &self,
        lead_id: LeadId,
        tenant_id: &str,
        partial: &LeadData,
        summary: Option<&str>,
    ) -> Result<(), PersistenceError> {
        let mut patch = LeadPatch::from_data(partial);
        if let Some(summary) = summary {
            patch = patch.with_summary(summary);
        }
        self.store.update(lead_id, tenant_id, patch).await
    }

    /// Most recent lead of the visitor, if any
    pub async fn find_prior_lead(
        &self,
        scope: &ConversationScope,
    ) -> Result<Option<Lead>, PersistenceError> {
        self.store
            .find_by_visitor(&scope.visitor_id, &scope.tenant_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use inmo_agent_core::{Operation, SourceType};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        created: Mutex<Vec<NewLead>>,
        updates: Mutex<Vec<(LeadId, String, LeadPatch)>>,
    }

    #[async_trait]
    impl LeadStore for RecordingStore {
        async fn create(&self, lead: NewLead) -> Result<LeadId, PersistenceError> {
            let mut created = self.created.lock();
            created.push(lead);
            Ok(created.len() as LeadId)
        }

        async fn update(
            &self,
            id: LeadId,
            tenant_id: &str,
            patch: LeadPatch,
        ) -> Result<(), PersistenceError> {
            self.updates.lock().push((id, tenant_id.to_string(), patch));
            Ok(())
        }

        async fn find_by_visitor(
            &self,
            _visitor_id: &str,
            _tenant_id: &str,
        ) -> Result<Option<Lead>, PersistenceError> {
            Ok(None)
        }

        async fn get(
            &self,
            _id: LeadId,
            _tenant_id: &str,
        ) -> Result<Option<Lead>, PersistenceError> {
            Ok(None)
        }

        async fn list(&self, _tenant_id: &str) -> Result<Vec<Lead>, PersistenceError> {
            Ok(Vec::new())
        }
    }

    fn scope() -> ConversationScope {
        ConversationScope::new("visitor-1", "tenant-1", SourceType::Whatsapp)
    }

    fn setup() -> (Arc<RecordingStore>, LeadService) {
        let store = Arc::new(RecordingStore::default());
        (store.clone(), LeadService::new(store))
    }

    #[tokio::test]
    async fn test_existing_id_is_reused_without_creation() {
        let (store, service) = setup();
        let data = LeadData {
            nombre: Some("Ana".into()),
            ..Default::default()
        };

        for _ in 0..2 {
            let id = service.load_or_create_lead(&scope(), &data, Some(5)).await.unwrap();
            assert_eq!(id, Some(5));
        }
        assert!(store.created.lock().is_empty());
    }

    #[tokio::test]
    async fn test_creates_with_complete_criteria() {
        let (store, service) = setup();
        let data = LeadData {
            operacion: Some(Operation::Alquiler),
            zona: Some("Palermo".into()),
            presupuesto_max: Some(250_000.0),
            ..Default::default()
        };

        let id = service.load_or_create_lead(&scope(), &data, None).await.unwrap();
        assert_eq!(id, Some(1));

        let created = store.created.lock();
        assert_eq!(created[0].tenant_id, "tenant-1");
        assert_eq!(created[0].visitor_id, "visitor-1");
        assert_eq!(created[0].source_type, SourceType::Whatsapp);
        assert_eq!(created[0].presupuesto_max, Some(250_000.0));
    }

    #[tokio::test]
    async fn test_contact_only_creation_and_insufficient_data() {
        let (store, service) = setup();

        let partial = LeadData {
            zona: Some("Palermo".into()),
            ..Default::default()
        };
        assert_eq!(service.load_or_create_lead(&scope(), &partial, None).await.unwrap(), None);
        assert!(store.created.lock().is_empty());

        let contact = LeadData {
            contacto: Some("1122".into()),
            ..partial
        };
        assert_eq!(service.load_or_create_lead(&scope(), &contact, None).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_update_maps_present_fields_and_summary() {
        let (store, service) = setup();
        let partial = LeadData {
            operacion: Some(Operation::Venta),
            presupuesto_max: Some(120_000.0),
            nombre: Some("Ana".into()),
            ..Default::default()
        };

        service
            .update_lead_data(9, "tenant-1", &partial, Some("Lead summary"))
            .await
            .unwrap();

        let updates = store.updates.lock();
        let (id, tenant, patch) = &updates[0];
        assert_eq!(*id, 9);
        assert_eq!(tenant, "tenant-1");
        assert_eq!(
            *patch,
            LeadPatch {
                operacion: Some(Operation::Venta),
                presupuesto_max: Some(120_000.0),
                nombre: Some("Ana".into()),
                summary: Some("Lead summary".into()),
                ..Default::default()
            }
        );
    }
}
