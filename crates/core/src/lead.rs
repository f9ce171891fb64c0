//! Lead records and the structured qualification data collected per session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier assigned by the lead store on creation
pub type LeadId = i64;

/// Operation type the visitor is looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Venta,
    Alquiler,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Venta => "venta",
            Operation::Alquiler => "alquiler",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "venta" => Ok(Operation::Venta),
            "alquiler" => Ok(Operation::Alquiler),
            other => Err(format!("unknown operation: {}", other)),
        }
    }
}

/// Channel a conversation originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    #[default]
    WebChat,
    Whatsapp,
    Form,
    Backoffice,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::WebChat => "web_chat",
            SourceType::Whatsapp => "whatsapp",
            SourceType::Form => "form",
            SourceType::Backoffice => "backoffice",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web_chat" => Ok(SourceType::WebChat),
            "whatsapp" => Ok(SourceType::Whatsapp),
            "form" => Ok(SourceType::Form),
            "backoffice" => Ok(SourceType::Backoffice),
            other => Err(format!("unknown source type: {}", other)),
        }
    }
}

/// Qualification fields filled incrementally during a conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operacion: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zona: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presupuesto_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacto: Option<String>,
}

impl LeadData {
    /// True when a non-empty name or contact is present
    pub fn has_contact(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.nombre) || filled(&self.contacto)
    }

    /// Fill fields that are still absent from a stored lead
    pub fn fill_missing_from(&mut self, lead: &Lead) {
        if self.operacion.is_none() {
            self.operacion = lead.operacion;
        }
        if self.zona.is_none() {
            self.zona = lead.zona.clone();
        }
        if self.presupuesto_max.is_none() {
            self.presupuesto_max = lead.presupuesto_max;
        }
        if self.nombre.is_none() {
            self.nombre = lead.nombre.clone();
        }
        if self.contacto.is_none() {
            self.contacto = lead.contacto.clone();
        }
    }
}

/// Persisted lead record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub tenant_id: String,
    pub visitor_id: String,
    pub source_type: SourceType,
    pub operacion: Option<Operation>,
    pub zona: Option<String>,
    pub presupuesto_max: Option<f64>,
    pub nombre: Option<String>,
    pub contacto: Option<String>,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// A lead with a summary has already been handed to a human
    pub fn is_handed_off(&self) -> bool {
        self.summary.is_some()
    }
}

/// Fields for a lead creation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLead {
    pub tenant_id: String,
    pub visitor_id: String,
    pub source_type: SourceType,
    pub operacion: Option<Operation>,
    pub zona: Option<String>,
    pub presupuesto_max: Option<f64>,
    pub nombre: Option<String>,
    pub contacto: Option<String>,
}

impl NewLead {
    pub fn from_data(
        tenant_id: impl Into<String>,
        visitor_id: impl Into<String>,
        source_type: SourceType,
        data: &LeadData,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            visitor_id: visitor_id.into(),
            source_type,
            operacion: data.operacion,
            zona: data.zona.clone(),
            presupuesto_max: data.presupuesto_max,
            nombre: data.nombre.clone(),
            contacto: data.contacto.clone(),
        }
    }
}

/// Partial update: only `Some` fields are written
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operacion: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zona: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presupuesto_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacto: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl LeadPatch {
    pub fn from_data(data: &LeadData) -> Self {
        Self {
            operacion: data.operacion,
            zona: data.zona.clone(),
            presupuesto_max: data.presupuesto_max,
            nombre: data.nombre.clone(),
            contacto: data.contacto.clone(),
            summary: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.operacion.is_none()
            && self.zona.is_none()
            && self.presupuesto_max.is_none()
            && self.nombre.is_none()
            && self.contacto.is_none()
            && self.summary.is_none()
    }

    /// Write the present fields onto a stored lead
    pub fn apply_to(&self, lead: &mut Lead) {
        if let Some(op) = self.operacion {
            lead.operacion = Some(op);
        }
        if let Some(ref zona) = self.zona {
            lead.zona = Some(zona.clone());
        }
        if let Some(budget) = self.presupuesto_max {
            lead.presupuesto_max = Some(budget);
        }
        if let Some(ref nombre) = self.nombre {
            lead.nombre = Some(nombre.clone());
        }
        if let Some(ref contacto) = self.contacto {
            lead.contacto = Some(contacto.clone());
        }
        if let Some(ref summary) = self.summary {
            lead.summary = Some(summary.clone());
        }
    }
}
