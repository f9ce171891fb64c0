//! Typed tool invocations
//!
//! Each catalog tool maps to one variant with a validating constructor.
//! Arguments are parsed tolerantly, checked against the catalog schema and
//! then converted to typed fields.

use inmo_agent_core::{Operation, ToolCall};
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::catalog::{tool_catalog, ESCALATE, SAVE_CONTACT, SEARCH_PROPERTIES};
use crate::error::ToolError;
use crate::parser::safe_json_parse;

static VALIDATORS: Lazy<HashMap<String, JSONSchema>> = Lazy::new(|| {
    tool_catalog()
        .iter()
        .filter_map(|tool| {
            let schema = tool.input_schema.to_value();
            match JSONSchema::compile(&schema) {
                Ok(compiled) => Some((tool.name.clone(), compiled)),
                Err(e) => {
                    tracing::error!(tool = %tool.name, error = %e, "Tool schema failed to compile");
                    None
                }
            }
        })
        .collect()
});

fn validate_structure(tool: &str, args: &Value) -> Result<(), ToolError> {
    let Some(validator) = VALIDATORS.get(tool) else {
        return Err(ToolError::UnknownTool(tool.to_string()));
    };

    if let Err(errors) = validator.validate(args) {
        let reason = errors
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ToolError::invalid_arguments(tool, reason));
    }
    Ok(())
}

/// `buscarPropiedades` arguments
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchArgs {
    pub operacion: Operation,
    pub zona: String,
    pub presupuesto_max: f64,
}

impl SearchArgs {
    pub fn from_value(args: &Value) -> Result<Self, ToolError> {
        validate_structure(SEARCH_PROPERTIES, args)?;
        serde_json::from_value(args.clone())
            .map_err(|e| ToolError::invalid_arguments(SEARCH_PROPERTIES, e.to_string()))
    }
}

/// `guardarContactoLead` arguments, trimmed
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContactArgs {
    pub nombre: Option<String>,
    pub contacto: Option<String>,
}

#[derive(Deserialize)]
struct RawContactArgs {
    #[serde(default)]
    nombre: Option<String>,
    #[serde(default)]
    contacto: Option<String>,
}

impl ContactArgs {
    /// At least one field must be non-empty after trimming
    pub fn from_value(args: &Value) -> Result<Self, ToolError> {
        validate_structure(SAVE_CONTACT, args)?;
        let raw: RawContactArgs = serde_json::from_value(args.clone())
            .map_err(|e| ToolError::invalid_arguments(SAVE_CONTACT, e.to_string()))?;

        let clean = |v: Option<String>| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let parsed = Self {
            nombre: clean(raw.nombre),
            contacto: clean(raw.contacto),
        };

        if parsed.nombre.is_none() && parsed.contacto.is_none() {
            return Err(ToolError::invalid_arguments(
                SAVE_CONTACT,
                "nombre or contacto is required",
            ));
        }
        Ok(parsed)
    }
}

/// `derivarAHumano` arguments
///
/// A missing or blank summary is kept as `None`; the executor substitutes the
/// configured placeholder instead of rejecting the call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EscalateArgs {
    pub summary: Option<String>,
}

impl EscalateArgs {
    pub fn from_value(args: &Value) -> Self {
        if validate_structure(ESCALATE, args).is_err() {
            return Self::default();
        }
        let summary = args
            .get("summary")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);
        Self { summary }
    }

    pub fn summary_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.summary.as_deref().unwrap_or(default)
    }
}

/// One validated call per catalog tool
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    SearchProperties(SearchArgs),
    SaveContact(ContactArgs),
    Escalate(EscalateArgs),
}

impl ToolInvocation {
    /// Validate a parsed tool call. Malformed argument JSON is read as `{}`.
    pub fn from_call(call: &ToolCall) -> Result<Self, ToolError> {
        let args = safe_json_parse(&call.function.arguments);

        match call.name() {
            SEARCH_PROPERTIES => SearchArgs::from_value(&args).map(Self::SearchProperties),
            SAVE_CONTACT => ContactArgs::from_value(&args).map(Self::SaveContact),
            ESCALATE => Ok(Self::Escalate(EscalateArgs::from_value(&args))),
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::SearchProperties(_) => SEARCH_PROPERTIES,
            Self::SaveContact(_) => SAVE_CONTACT,
            Self::Escalate(_) => ESCALATE,
        }
    }
}
