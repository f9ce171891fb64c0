//! Fixed tool catalog exposed to the model
//!
//! Names, argument names and required sets are part of the prompt contract and
//! must not change without retuning the system prompt.

use inmo_agent_core::ToolDefinition;
use once_cell::sync::Lazy;

use crate::schema::{InputSchema, PropertySchema, ToolSchema};

pub const SEARCH_PROPERTIES: &str = "buscarPropiedades";
pub const SAVE_CONTACT: &str = "guardarContactoLead";
pub const ESCALATE: &str = "derivarAHumano";

static CATALOG: Lazy<Vec<ToolSchema>> = Lazy::new(|| {
    vec![
        ToolSchema {
            name: SEARCH_PROPERTIES.to_string(),
            description: "Busca propiedades disponibles según operación, zona y presupuesto máximo"
                .to_string(),
            input_schema: InputSchema::object()
                .property(
                    "operacion",
                    PropertySchema::enum_type(
                        "Tipo de operación",
                        vec!["venta".into(), "alquiler".into()],
                    ),
                    true,
                )
                .property(
                    "zona",
                    PropertySchema::string("Zona o barrio buscado"),
                    true,
                )
                .property(
                    "presupuestoMax",
                    PropertySchema::number("Presupuesto máximo del cliente"),
                    true,
                ),
        },
        ToolSchema {
            name: SAVE_CONTACT.to_string(),
            description: "Guarda el nombre y/o el contacto (teléfono o email) del cliente"
                .to_string(),
            input_schema: InputSchema::object()
                .property("nombre", PropertySchema::string("Nombre del cliente"), false)
                .property(
                    "contacto",
                    PropertySchema::string("Teléfono o email de contacto"),
                    false,
                ),
        },
        ToolSchema {
            name: ESCALATE.to_string(),
            description: "Deriva la conversación a un asesor humano con un resumen del lead"
                .to_string(),
            input_schema: InputSchema::object().property(
                "summary",
                PropertySchema::string(
                    "Resumen con nombre, contacto, operación, zona y presupuesto del cliente",
                ),
                true,
            ),
        },
    ]
});

/// The three tools, in a stable order
pub fn tool_catalog() -> &'static [ToolSchema] {
    &CATALOG
}

pub fn find_schema(name: &str) -> Option<&'static ToolSchema> {
    CATALOG.iter().find(|schema| schema.name == name)
}

/// Catalog in the shape handed to the model collaborator
pub fn tool_definitions() -> Vec<ToolDefinition> {
    CATALOG.iter().map(ToolDefinition::from).collect()
}
