//! Per-message entry point
//!
//! One inbound message runs through:
//! 1. Reset command check (no model call)
//! 2. Session load, history append and persist
//! 3. First model call with the tool catalog
//! 4. Tool execution and a second model call when tools were requested
//! 5. Fallbacks: capacity message on model unavailability, generic error otherwise
//!
//! The guided dialogue replaces steps 3-4 when the configured mode asks for it.

use inmo_agent_config::{AgentConfig, DialogueMode, PromptsConfig, Settings};
use inmo_agent_core::{
    BotReply, BotRequest, ChatMessage, ChatRole, ConversationScope, FinishReason,
    GenerateRequest, GenerateResponse, LanguageModel, LeadData, LeadId, Message, Session,
    ToolDefinition,
};
use inmo_agent_persistence::{LeadStore, PropertyCatalog, SessionStore};
use inmo_agent_tools::{parse_tool_calls, tool_definitions};
use std::sync::Arc;
use std::time::Duration;

use crate::guided::GuidedDialogue;
use crate::lead_service::LeadService;
use crate::orchestrator::{OrchestratorConfig, ToolOrchestrator};
use crate::property_search::PropertySearch;
use crate::session_service::{add_message_to_history, ensure_lead_data, get_history, set_lead_id};
use crate::AgentError;

/// Outcome of a model call that may have hit a capacity condition
enum ModelCall {
    Answered(GenerateResponse),
    Unavailable,
}

pub struct LeadAgent {
    model: Option<Arc<dyn LanguageModel>>,
    sessions: Arc<dyn SessionStore>,
    leads: LeadService,
    orchestrator: ToolOrchestrator,
    guided: GuidedDialogue,
    tools: Vec<ToolDefinition>,
    config: AgentConfig,
    prompts: PromptsConfig,
}

impl LeadAgent {
    pub fn builder() -> LeadAgentBuilder {
        LeadAgentBuilder::default()
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Reply to one inbound message. Never fails: errors become a fallback reply.
    pub async fn bot_reply(&self, request: &BotRequest) -> BotReply {
        metrics::counter!("inmo_agent_turns_total", "source" => request.source_type.as_str())
            .increment(1);
        tracing::info!(
            visitor_id = %request.user_id,
            tenant_id = %request.tenant_id,
            source = %request.source_type,
            chars = request.text.chars().count(),
            "Turn started"
        );

        if self.config.is_reset_command(&request.text) {
            if let Err(e) = self.sessions.reset(&request.user_id).await {
                tracing::warn!(visitor_id = %request.user_id, error = %e, "Session reset failed");
            }
            tracing::info!(visitor_id = %request.user_id, "Conversation reset");
            return BotReply::text(self.prompts.reset_reply.clone());
        }

        let result = match self.config.mode {
            DialogueMode::Model => self.model_turn(request).await,
            DialogueMode::Guided => self.guided_turn(request).await,
        };

        match result {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(
                    visitor_id = %request.user_id,
                    tenant_id = %request.tenant_id,
                    error = %e,
                    "Turn failed"
                );
                metrics::counter!("inmo_agent_fallback_replies_total", "reason" => "error")
                    .increment(1);
                BotReply::text(self.prompts.error_reply.clone())
            }
        }
    }

    async fn model_turn(&self, request: &BotRequest) -> Result<BotReply, AgentError> {
        let model = self
            .model
            .as_ref()
            .ok_or(AgentError::MissingCollaborator("model"))?;
        let scope = request.scope();

        let mut session = self.sessions.get(&request.user_id).await?;
        ensure_lead_data(&mut session);
        add_message_to_history(
            &mut session,
            ChatMessage::user(request.text.clone()),
            self.config.max_history,
        );
        self.sessions.set(&request.user_id, session.clone()).await?;

        let base = GenerateRequest::new(self.prompts.system_prompt.clone())
            .with_messages(get_history(&session).iter().map(to_model_message));

        let first = match self.call_model(model.as_ref(), base.clone()).await? {
            ModelCall::Answered(response) => response,
            ModelCall::Unavailable => return Ok(self.unavailable_reply()),
        };

        // Prior-lead lookup waits until the model has answered
        self.attach_prior_lead(&mut session, &scope).await;

        let calls = parse_tool_calls(&first.tool_calls);
        if calls.is_empty() {
            let text = self.non_empty(&first.text);
            self.finish_turn(&request.user_id, &mut session, &text).await?;
            return Ok(BotReply::text(text));
        }

        tracing::debug!(
            visitor_id = %request.user_id,
            calls = calls.len(),
            "Model requested tools"
        );

        let batch = self
            .orchestrator
            .execute_tool_calls(&calls, &mut session, &scope)
            .await;
        self.sessions.set(&request.user_id, session.clone()).await?;

        let follow_up = base
            .with_message(Message::assistant_tool_calls(first.text.clone(), calls))
            .with_messages(batch.results.iter().map(|r| r.to_message()));

        let second = match self.call_model(model.as_ref(), follow_up).await? {
            ModelCall::Answered(response) => response,
            ModelCall::Unavailable => return Ok(self.unavailable_reply()),
        };
        if second.has_tool_calls() {
            tracing::debug!("Ignoring tool calls in follow-up response");
        }

        let text = self.non_empty(&second.text);
        self.finish_turn(&request.user_id, &mut session, &text).await?;

        let mut reply = BotReply::text(text);
        if let Some(handoff) = batch.handoff {
            if let Some(lead_id) = session.lead_id {
                self.spawn_summary_update(lead_id, &scope, handoff.summary.clone());
            }
            reply = reply.with_handoff(handoff.summary);
        }
        Ok(reply)
    }

    async fn guided_turn(&self, request: &BotRequest) -> Result<BotReply, AgentError> {
        let scope = request.scope();
        let mut session = self.sessions.get(&request.user_id).await?;

        let turn = self.guided.handle(&request.text, &mut session, &scope).await?;
        if turn.reset {
            self.sessions.reset(&request.user_id).await?;
        } else {
            self.sessions.set(&request.user_id, session).await?;
        }
        Ok(turn.reply)
    }

    async fn call_model(
        &self,
        model: &dyn LanguageModel,
        request: GenerateRequest,
    ) -> Result<ModelCall, AgentError> {
        match model.generate_with_tools(request, &self.tools).await {
            Ok(response) => {
                match response.finish_reason {
                    FinishReason::Length => {
                        tracing::warn!(
                            model = model.model_name(),
                            "Model reply truncated at max tokens"
                        )
                    }
                    FinishReason::ContentFilter => {
                        tracing::warn!(
                            model = model.model_name(),
                            "Model reply blocked by content filter"
                        )
                    }
                    FinishReason::Stop | FinishReason::ToolCalls => {}
                }
                Ok(ModelCall::Answered(response))
            }
            Err(e) if e.is_model_unavailable() => {
                tracing::warn!(model = model.model_name(), error = %e, "Model unavailable");
                Ok(ModelCall::Unavailable)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Attach the visitor's most recent lead unless it was already handed off
    async fn attach_prior_lead(&self, session: &mut Session, scope: &ConversationScope) {
        if !self.config.attach_prior_lead || session.lead_id.is_some() {
            return;
        }

        match self.leads.find_prior_lead(scope).await {
            Ok(Some(lead)) if !lead.is_handed_off() => {
                set_lead_id(session, lead.id);
                ensure_lead_data(session).fill_missing_from(&lead);
                tracing::debug!(
                    lead_id = lead.id,
                    visitor_id = %scope.visitor_id,
                    "Prior lead attached"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Prior lead lookup failed"),
        }
    }

    async fn finish_turn(
        &self,
        visitor_id: &str,
        session: &mut Session,
        text: &str,
    ) -> Result<(), AgentError> {
        add_message_to_history(session, ChatMessage::assistant(text), self.config.max_history);
        self.sessions.set(visitor_id, session.clone()).await?;
        Ok(())
    }

    fn spawn_summary_update(&self, lead_id: LeadId, scope: &ConversationScope, summary: String) {
        let leads = self.leads.clone();
        let tenant_id = scope.tenant_id.clone();
        tokio::spawn(async move {
            if let Err(e) = leads
                .update_lead_data(lead_id, &tenant_id, &LeadData::default(), Some(&summary))
                .await
            {
                tracing::warn!(lead_id, error = %e, "Handoff summary update failed");
            }
        });
    }

    fn non_empty(&self, text: &str) -> String {
        if text.trim().is_empty() {
            self.prompts.empty_reply.clone()
        } else {
            text.to_string()
        }
    }

    fn unavailable_reply(&self) -> BotReply {
        metrics::counter!("inmo_agent_fallback_replies_total", "reason" => "model_unavailable")
            .increment(1);
        BotReply::new(self.prompts.unavailable_replies.clone())
    }
}

fn to_model_message(message: &ChatMessage) -> Message {
    match message.role {
        ChatRole::User => Message::user(message.content.clone()),
        ChatRole::Assistant => Message::assistant(message.content.clone()),
    }
}

#[derive(Default)]
pub struct LeadAgentBuilder {
    model: Option<Arc<dyn LanguageModel>>,
    sessions: Option<Arc<dyn SessionStore>>,
    leads: Option<Arc<dyn LeadStore>>,
    catalog: Option<Arc<dyn PropertyCatalog>>,
    config: AgentConfig,
    prompts: PromptsConfig,
}

impl LeadAgentBuilder {
    pub fn model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn sessions(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn leads(mut self, leads: Arc<dyn LeadStore>) -> Self {
        self.leads = Some(leads);
        self
    }

    pub fn catalog(mut self, catalog: Arc<dyn PropertyCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn prompts(mut self, prompts: PromptsConfig) -> Self {
        self.prompts = prompts;
        self
    }

    /// Agent and prompt sections of loaded settings
    pub fn settings(self, settings: &Settings) -> Self {
        self.config(settings.agent.clone())
            .prompts(settings.prompts.clone())
    }

    pub fn build(self) -> Result<LeadAgent, AgentError> {
        if self.config.mode == DialogueMode::Model && self.model.is_none() {
            return Err(AgentError::MissingCollaborator("model"));
        }
        let sessions = self
            .sessions
            .ok_or(AgentError::MissingCollaborator("sessions"))?;
        let leads = LeadService::new(self.leads.ok_or(AgentError::MissingCollaborator("leads"))?);
        let search = PropertySearch::new(
            self.catalog
                .ok_or(AgentError::MissingCollaborator("catalog"))?,
        );

        let orchestrator = ToolOrchestrator::new(
            search.clone(),
            leads.clone(),
            OrchestratorConfig {
                search_limit: self.config.search_limit,
                tool_timeout: Duration::from_secs(self.config.tool_timeout_secs),
                default_handoff_summary: self.config.default_handoff_summary.clone(),
            },
        );

        Ok(LeadAgent {
            model: self.model,
            sessions,
            guided: GuidedDialogue::new(search, leads.clone()),
            leads,
            orchestrator,
            tools: tool_definitions(),
            config: self.config,
            prompts: self.prompts,
        })
    }
}
