//! Tool-call execution
//!
//! Runs the calls of one model response strictly in order against the shared
//! session. One tool result is produced per call, in call order, whether the
//! call succeeded or not; a failing call never aborts its siblings.

use inmo_agent_core::{ConversationScope, Handoff, LeadData, Property, Session, ToolCall};
use inmo_agent_persistence::PersistenceError;
use inmo_agent_tools::{
    ContactArgs, EscalateArgs, SearchArgs, ToolError, ToolInvocation, ToolResult,
};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use crate::extraction::extract_contact;
use crate::lead_service::LeadService;
use crate::property_search::{PropertySearch, SearchCriteria};
use crate::session_service::{ensure_lead_data, get_lead_id, set_lead_id};

/// Results of one batch, plus the handoff raised by its last successful escalation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolBatch {
    pub results: Vec<ToolResult>,
    pub handoff: Option<Handoff>,
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub search_limit: usize,
    pub tool_timeout: Duration,
    pub default_handoff_summary: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            search_limit: 10,
            tool_timeout: Duration::from_secs(10),
            default_handoff_summary: "Lead interesado".to_string(),
        }
    }
}

struct ToolOutcome {
    payload: Value,
    handoff: Option<Handoff>,
}

impl ToolOutcome {
    fn payload(payload: Value) -> Self {
        Self {
            payload,
            handoff: None,
        }
    }
}

fn storage(err: PersistenceError) -> ToolError {
    ToolError::Storage(err.to_string())
}

pub struct ToolOrchestrator {
    search: PropertySearch,
    leads: LeadService,
    config: OrchestratorConfig,
}

impl ToolOrchestrator {
    pub fn new(search: PropertySearch, leads: LeadService, config: OrchestratorConfig) -> Self {
        Self {
            search,
            leads,
            config,
        }
    }

    pub async fn execute_tool_calls(
        &self,
        calls: &[ToolCall],
        session: &mut Session,
        scope: &ConversationScope,
    ) -> ToolBatch {
        let mut batch = ToolBatch::default();

        for call in calls {
            let started = Instant::now();
            let outcome = match ToolInvocation::from_call(call) {
                Ok(invocation) => self.execute_with_timeout(&invocation, session, scope).await,
                Err(e) => Err(e),
            };

            let label = match &outcome {
                Ok(_) => "ok",
                Err(ToolError::Timeout { .. }) => "timeout",
                Err(_) => "error",
            };
            metrics::counter!(
                "inmo_agent_tool_calls_total",
                "tool" => call.name().to_string(),
                "outcome" => label
            )
            .increment(1);

            match outcome {
                Ok(outcome) => {
                    tracing::debug!(
                        tool = call.name(),
                        call_id = %call.id,
                        duration_ms = started.elapsed().as_millis() as u64,
                        "Tool call succeeded"
                    );
                    if outcome.handoff.is_some() {
                        batch.handoff = outcome.handoff;
                    }
                    batch.results.push(ToolResult::success(&call.id, &outcome.payload));
                }
                Err(e) => {
                    tracing::warn!(
                        tool = call.name(),
                        call_id = %call.id,
                        error = %e,
                        "Tool call failed"
                    );
                    batch.results.push(ToolResult::failure(&call.id, &e));
                }
            }
        }

        batch
    }

    async fn execute_with_timeout(
        &self,
        invocation: &ToolInvocation,
        session: &mut Session,
        scope: &ConversationScope,
    ) -> Result<ToolOutcome, ToolError> {
        let timeout = self.config.tool_timeout;
        let work = async {
            match invocation {
                ToolInvocation::SearchProperties(args) => {
                    self.search_properties(args, session, scope).await
                }
                ToolInvocation::SaveContact(args) => self.save_contact(args, session, scope).await,
                ToolInvocation::Escalate(args) => self.escalate(args, session, scope).await,
            }
        };

        match tokio::time::timeout(timeout, work).await {
            Ok(result) => result,
            Err(_elapsed) => Err(ToolError::timeout(invocation.tool_name(), timeout.as_secs())),
        }
    }

    async fn search_properties(
        &self,
        args: &SearchArgs,
        session: &mut Session,
        scope: &ConversationScope,
    ) -> Result<ToolOutcome, ToolError> {
        let data = ensure_lead_data(session);
        data.operacion = Some(args.operacion);
        data.zona = Some(args.zona.clone());
        data.presupuesto_max = Some(args.presupuesto_max);

        let outcome = self
            .search
            .search(&SearchCriteria {
                tenant_id: scope.tenant_id.clone(),
                operacion: args.operacion,
                zona: args.zona.clone(),
                presupuesto_max: args.presupuesto_max,
                limit: self.config.search_limit,
            })
            .await
            .map_err(storage)?;

        // The search result stands even when lead bookkeeping fails
        let data = ensure_lead_data(session).clone();
        let existing = get_lead_id(session);
        match self.leads.load_or_create_lead(scope, &data, existing).await {
            Ok(Some(id)) => set_lead_id(session, id),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Lead bookkeeping after search failed"),
        }

        let properties: Vec<Value> = outcome.results.iter().map(property_summary).collect();
        Ok(ToolOutcome::payload(json!({
            "properties": properties,
            "userBudget": outcome.user_budget,
            "totalProperties": outcome.results.len(),
            "propertiesWithinBudget": outcome.properties_within_budget,
            "hasResults": !outcome.results.is_empty(),
            "leadId": get_lead_id(session),
        })))
    }

    async fn save_contact(
        &self,
        args: &ContactArgs,
        session: &mut Session,
        scope: &ConversationScope,
    ) -> Result<ToolOutcome, ToolError> {
        let data = ensure_lead_data(session);
        if let Some(ref nombre) = args.nombre {
            data.nombre = Some(nombre.clone());
        }
        if let Some(ref contacto) = args.contacto {
            data.contacto = Some(contacto.clone());
        }
        let data = data.clone();

        let lead_id = match get_lead_id(session) {
            Some(id) => {
                let contact_only = LeadData {
                    nombre: args.nombre.clone(),
                    contacto: args.contacto.clone(),
                    ..Default::default()
                };
                self.leads
                    .update_lead_data(id, &scope.tenant_id, &contact_only, None)
                    .await
                    .map_err(storage)?;
                Some(id)
            }
            None => {
                let created = self
                    .leads
                    .load_or_create_lead(scope, &data, None)
                    .await
                    .map_err(storage)?;
                if let Some(id) = created {
                    set_lead_id(session, id);
                }
                created
            }
        };

        Ok(ToolOutcome::payload(json!({
            "ok": true,
            "leadId": lead_id,
            "nombre": data.nombre,
            "contacto": data.contacto,
        })))
    }

    async fn escalate(
        &self,
        args: &EscalateArgs,
        session: &mut Session,
        scope: &ConversationScope,
    ) -> Result<ToolOutcome, ToolError> {
        let summary = args
            .summary_or(&self.config.default_handoff_summary)
            .to_string();

        // Session values win; the summary only fills what the visitor never gave
        let mut lead_view = ensure_lead_data(session).clone();
        if lead_view.nombre.is_none() || lead_view.contacto.is_none() {
            let extracted = extract_contact(&summary);
            if !extracted.is_empty() {
                tracing::info!(
                    found_nombre = extracted.nombre.is_some(),
                    found_contacto = extracted.contacto.is_some(),
                    low_confidence = true,
                    "Contact extracted from handoff summary"
                );
                tracing::debug!(
                    nombre = extracted.nombre.as_deref().unwrap_or(""),
                    contacto = extracted.contacto.as_deref().unwrap_or(""),
                    "Extracted contact values"
                );
                lead_view.nombre = lead_view.nombre.or(extracted.nombre);
                lead_view.contacto = lead_view.contacto.or(extracted.contacto);
            }
        }

        let lead_id = self
            .leads
            .load_or_create_lead(scope, &lead_view, get_lead_id(session))
            .await
            .map_err(storage)?;

        if let Some(id) = lead_id {
            set_lead_id(session, id);
            let patch = LeadData {
                nombre: lead_view.nombre.clone(),
                contacto: lead_view.contacto.clone(),
                zona: lead_view.zona.clone(),
                ..Default::default()
            };
            self.leads
                .update_lead_data(id, &scope.tenant_id, &patch, Some(&summary))
                .await
                .map_err(storage)?;
        }

        tracing::info!(lead_id = ?lead_id, summary = %summary, "Handoff requested");

        Ok(ToolOutcome {
            payload: json!({
                "ok": true,
                "leadId": lead_id,
                "summary": summary,
            }),
            handoff: Some(Handoff { summary }),
        })
    }
}

fn property_summary(property: &Property) -> Value {
    json!({
        "id": property.id,
        "titulo": property.titulo,
        "precio": property.precio,
        "zona": property.zona,
        "link": property.link,
        "tipo": property.tipo,
        "ambientes": property.ambientes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use inmo_agent_core::{Lead, LeadId, LeadPatch, NewLead, Operation, SourceType};
    use inmo_agent_persistence::{InMemoryLeadStore, InMemoryPropertyCatalog, LeadStore};
    use inmo_agent_tools::{ESCALATE, SAVE_CONTACT, SEARCH_PROPERTIES};
    use std::sync::Arc;

    /// Lead store that stalls or fails on every write
    enum DegradedLeads {
        Stalled,
        Offline,
    }

    impl DegradedLeads {
        async fn write(&self) -> Result<(), PersistenceError> {
            match self {
                DegradedLeads::Stalled => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(())
                }
                DegradedLeads::Offline => {
                    Err(PersistenceError::Unavailable("leads offline".to_string()))
                }
            }
        }
    }

    #[async_trait]
    impl LeadStore for DegradedLeads {
        async fn create(&self, _lead: NewLead) -> Result<LeadId, PersistenceError> {
            self.write().await?;
            Ok(1)
        }

        async fn update(
            &self,
            _id: LeadId,
            _tenant_id: &str,
            _patch: LeadPatch,
        ) -> Result<(), PersistenceError> {
            self.write().await
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

    struct Fixture {
        leads: Arc<InMemoryLeadStore>,
        orchestrator: ToolOrchestrator,
        scope: ConversationScope,
    }

    fn catalog() -> Arc<InMemoryPropertyCatalog> {
        let catalog = InMemoryPropertyCatalog::new();
        catalog.load(
            "t1",
            vec![
                Property::new(
                    "JSON-0001",
                    Operation::Venta,
                    "Belgrano",
                    500_000.0,
                    "Depto Belgrano",
                ),
                Property::new(
                    "JSON-0002",
                    Operation::Alquiler,
                    "Palermo",
                    200_000.0,
                    "PH Palermo",
                ),
            ],
        );
        Arc::new(catalog)
    }

    fn fixture() -> Fixture {
        let leads = Arc::new(InMemoryLeadStore::new());
        let orchestrator = ToolOrchestrator::new(
            PropertySearch::new(catalog()),
            LeadService::new(leads.clone()),
            OrchestratorConfig::default(),
        );
        Fixture {
            leads,
            orchestrator,
            scope: ConversationScope::new("v1", "t1", SourceType::WebChat),
        }
    }

    fn call(id: &str, name: &str, arguments: &str) -> ToolCall {
        ToolCall::function(id, name, arguments)
    }

    #[tokio::test]
    async fn test_search_stamps_session_and_creates_lead() {
        let f = fixture();
        let mut session = Session::default();

        let batch = f
            .orchestrator
            .execute_tool_calls(
                &[call(
                    "c1",
                    SEARCH_PROPERTIES,
                    r#"{"operacion":"venta","zona":"Belgrano","presupuestoMax":400000}"#,
                )],
                &mut session,
                &f.scope,
            )
            .await;

        assert_eq!(batch.results.len(), 1);
        assert!(batch.handoff.is_none());
        let payload = batch.results[0].payload();
        assert_eq!(payload["totalProperties"], 1);
        assert_eq!(payload["propertiesWithinBudget"], 0);
        assert_eq!(payload["hasResults"], true);
        assert_eq!(payload["userBudget"], 400_000.0);
        assert_eq!(payload["properties"][0]["id"], "JSON-0001");
        assert_eq!(payload["leadId"], 1);

        let data = session.data.as_ref().unwrap();
        assert_eq!(data.operacion, Some(Operation::Venta));
        assert_eq!(data.zona.as_deref(), Some("Belgrano"));
        assert_eq!(session.lead_id, Some(1));
        assert_eq!(f.leads.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_calls_do_not_abort_batch() {
        let f = fixture();
        let mut session = Session::default();

        let batch = f
            .orchestrator
            .execute_tool_calls(
                &[
                    call("c1", "borrarTodo", "{}"),
                    call("c2", SEARCH_PROPERTIES, "not-json"),
                    call("c3", SAVE_CONTACT, r#"{"nombre":"Ana"}"#),
                ],
                &mut session,
                &f.scope,
            )
            .await;

        let ids: Vec<&str> = batch.results.iter().map(|r| r.tool_call_id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
        assert_eq!(batch.results[0].payload()["error"], "Unknown tool: borrarTodo");
        assert!(batch.results[1].is_error());
        assert!(!batch.results[2].is_error());
        assert_eq!(batch.results[2].payload()["leadId"], 1);
        assert_eq!(session.data.unwrap().nombre.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn test_save_contact_patches_existing_lead() {
        let f = fixture();
        let mut session = Session::default();

        f.orchestrator
            .execute_tool_calls(
                &[
                    call(
                        "c1",
                        SEARCH_PROPERTIES,
                        r#"{"operacion":"alquiler","zona":"Palermo","presupuestoMax":250000}"#,
                    ),
                    call("c2", SAVE_CONTACT, r#"{"contacto":" 1155443322 "}"#),
                ],
                &mut session,
                &f.scope,
            )
            .await;

        assert_eq!(f.leads.len(), 1);
        let lead = f.leads.get(1, "t1").await.unwrap().unwrap();
        assert_eq!(lead.contacto.as_deref(), Some("1155443322"));
        assert_eq!(lead.zona.as_deref(), Some("Palermo"));
    }

    #[tokio::test]
    async fn test_escalate_extracts_contact_and_raises_handoff() {
        let f = fixture();
        let mut session = Session {
            data: Some(LeadData {
                zona: Some("Belgrano".into()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let batch = f
            .orchestrator
            .execute_tool_calls(
                &[call(
                    "c1",
                    ESCALATE,
                    r#"{"summary":"Lead Ana Gómez busca en Belgrano, contacto: 1122."}"#,
                )],
                &mut session,
                &f.scope,
            )
            .await;

        let payload = batch.results[0].payload();
        assert_eq!(payload["ok"], true);
        assert_eq!(payload["leadId"], 1);
        assert_eq!(
            batch.handoff.unwrap().summary,
            "Lead Ana Gómez busca en Belgrano, contacto: 1122."
        );

        let lead = f.leads.get(1, "t1").await.unwrap().unwrap();
        assert_eq!(lead.nombre.as_deref(), Some("Ana Gómez"));
        assert_eq!(lead.contacto.as_deref(), Some("1122"));
        assert_eq!(lead.zona.as_deref(), Some("Belgrano"));
        assert!(lead.is_handed_off());

        // Extracted values stay out of the session
        let data = session.data.unwrap();
        assert!(data.nombre.is_none());
        assert!(data.contacto.is_none());
    }

    #[tokio::test]
    async fn test_escalate_without_summary_uses_default_and_last_wins() {
        let f = fixture();
        let mut session = Session::default();

        let batch = f
            .orchestrator
            .execute_tool_calls(
                &[
                    call("c1", ESCALATE, r#"{"summary":"Primero"}"#),
                    call("c2", ESCALATE, "{}"),
                ],
                &mut session,
                &f.scope,
            )
            .await;

        assert_eq!(batch.results.len(), 2);
        // No lead data at all: nothing can be created
        assert_eq!(batch.results[1].payload()["leadId"], Value::Null);
        assert_eq!(batch.handoff.unwrap().summary, "Lead interesado");
        assert!(f.leads.is_empty());
    }

    #[tokio::test]
    async fn test_escalate_fills_only_missing_fields() {
        let f = fixture();
        let mut session = Session {
            data: Some(LeadData {
                nombre: Some("Juan Perez".into()),
                ..Default::default()
            }),
            ..Default::default()
        };

        f.orchestrator
            .execute_tool_calls(
                &[call(
                    "c1",
                    ESCALATE,
                    r#"{"summary":"Lead Juan Perez quiere visitar depto en Belgrano, contacto: 11223344"}"#,
                )],
                &mut session,
                &f.scope,
            )
            .await;

        let lead = f.leads.get(1, "t1").await.unwrap().unwrap();
        assert_eq!(lead.nombre.as_deref(), Some("Juan Perez"));
        assert_eq!(lead.contacto.as_deref(), Some("11223344"));

        // A name given by the visitor is never replaced by the summary's
        let f = fixture();
        let mut session = Session {
            data: Some(LeadData {
                nombre: Some("María".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        f.orchestrator
            .execute_tool_calls(
                &[call(
                    "c1",
                    ESCALATE,
                    r#"{"summary":"Lead Juan Perez quiere visitar depto en Belgrano, contacto: 11223344"}"#,
                )],
                &mut session,
                &f.scope,
            )
            .await;

        let lead = f.leads.get(1, "t1").await.unwrap().unwrap();
        assert_eq!(lead.nombre.as_deref(), Some("María"));
        assert_eq!(lead.contacto.as_deref(), Some("11223344"));
        assert!(session.data.unwrap().contacto.is_none());
    }

    #[tokio::test]
    async fn test_saved_contact_is_used_by_later_escalation() {
        let f = fixture();
        let mut session = Session::default();

        let batch = f
            .orchestrator
            .execute_tool_calls(
                &[
                    call("c1", SAVE_CONTACT, r#"{"nombre":"Ana","contacto":"1144556677"}"#),
                    call(
                        "c2",
                        ESCALATE,
                        r#"{"summary":"Lead Pedro Gil quiere ver un PH, contacto: 9999"}"#,
                    ),
                ],
                &mut session,
                &f.scope,
            )
            .await;

        assert_eq!(batch.results.len(), 2);
        assert_eq!(batch.results[0].payload()["leadId"], 1);
        assert_eq!(batch.results[1].payload()["leadId"], 1);
        assert!(batch.handoff.is_some());

        assert_eq!(f.leads.len(), 1);
        let lead = f.leads.get(1, "t1").await.unwrap().unwrap();
        assert_eq!(lead.nombre.as_deref(), Some("Ana"));
        assert_eq!(lead.contacto.as_deref(), Some("1144556677"));
        assert!(lead.is_handed_off());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_storage_times_out_per_call() {
        let orchestrator = ToolOrchestrator::new(
            PropertySearch::new(catalog()),
            LeadService::new(Arc::new(DegradedLeads::Stalled)),
            OrchestratorConfig {
                tool_timeout: Duration::from_secs(1),
                ..Default::default()
            },
        );
        let scope = ConversationScope::new("v1", "t1", SourceType::WebChat);
        let mut session = Session::default();

        let batch = orchestrator
            .execute_tool_calls(
                &[
                    call("c1", SAVE_CONTACT, r#"{"nombre":"Ana"}"#),
                    call("c2", "nope", "{}"),
                ],
                &mut session,
                &scope,
            )
            .await;

        assert_eq!(batch.results.len(), 2);
        assert_eq!(batch.results[0].tool_call_id, "c1");
        assert_eq!(
            batch.results[0].payload()["error"],
            "Tool guardarContactoLead timed out after 1s"
        );
        assert_eq!(batch.results[1].tool_call_id, "c2");
        assert_eq!(batch.results[1].payload()["error"], "Unknown tool: nope");
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported_per_call() {
        let orchestrator = ToolOrchestrator::new(
            PropertySearch::new(catalog()),
            LeadService::new(Arc::new(DegradedLeads::Offline)),
            OrchestratorConfig::default(),
        );
        let scope = ConversationScope::new("v1", "t1", SourceType::WebChat);
        let mut session = Session::default();

        let batch = orchestrator
            .execute_tool_calls(
                &[
                    call("c1", SAVE_CONTACT, r#"{"nombre":"Ana"}"#),
                    call(
                        "c2",
                        SEARCH_PROPERTIES,
                        r#"{"operacion":"alquiler","zona":"Palermo","presupuestoMax":250000}"#,
                    ),
                ],
                &mut session,
                &scope,
            )
            .await;

        assert_eq!(
            batch.results[0].payload()["error"],
            "Storage error: Storage unavailable: leads offline"
        );
        // The search stands without a lead id
        let payload = batch.results[1].payload();
        assert!(!batch.results[1].is_error());
        assert_eq!(payload["totalProperties"], 1);
        assert_eq!(payload["leadId"], Value::Null);
        assert!(session.lead_id.is_none());
    }
}
