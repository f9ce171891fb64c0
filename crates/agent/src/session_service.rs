//! Typed accessors over a session value

use inmo_agent_core::{ChatMessage, LeadData, LeadId, Session};

/// Default history window
pub const MAX_HISTORY: usize = 10;

/// Initialize `data` if absent and return it
pub fn ensure_lead_data(session: &mut Session) -> &mut LeadData {
    session.data.get_or_insert_with(LeadData::default)
}

pub fn get_lead_id(session: &Session) -> Option<LeadId> {
    session.lead_id
}

pub fn set_lead_id(session: &mut Session, lead_id: LeadId) {
    session.lead_id = Some(lead_id);
}

/// Append and keep only the most recent `max_history` entries
pub fn add_message_to_history(session: &mut Session, message: ChatMessage, max_history: usize) {
    session.history.push(message);
    let len = session.history.len();
    if len > max_history {
        session.history.drain(..len - max_history);
    }
}

pub fn get_history(session: &Session) -> &[ChatMessage] {
    &session.history
}

/// Operation, non-empty zone and a positive finite budget are all present
pub fn can_create_lead(data: &LeadData) -> bool {
    let has_zone = data.zona.as_deref().is_some_and(|z| !z.trim().is_empty());
    let has_budget = data
        .presupuesto_max
        .is_some_and(|b| b.is_finite() && b > 0.0);
    data.operacion.is_some() && has_zone && has_budget
}
