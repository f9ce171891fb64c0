//! Property listings as read from the catalog

use serde::{Deserialize, Serialize};

use crate::lead::Operation;

/// Immutable listing snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub operacion: Operation,
    pub zona: String,
    pub precio: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub titulo: String,
    #[serde(default)]
    pub link: String,
    #[serde(default = "default_available")]
    pub disponible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambientes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banos: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dormitorios: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imagenes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_phone: Option<String>,
}

fn default_currency() -> String {
    "ARS".to_string()
}

fn default_available() -> bool {
    true
}

impl Property {
    /// Minimal available listing, used by fixtures and seed loaders
    pub fn new(
        id: impl Into<String>,
        operacion: Operation,
        zona: impl Into<String>,
        precio: f64,
        titulo: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            operacion,
            zona: zona.into(),
            precio,
            currency: default_currency(),
            titulo: titulo.into(),
            link: String::new(),
            disponible: true,
            tipo: None,
            ambientes: None,
            banos: None,
            dormitorios: None,
            imagenes: Vec::new(),
            address: None,
            seller_name: None,
            seller_phone: None,
        }
    }

    pub fn unavailable(mut self) -> Self {
        self.disponible = false;
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    /// Case-insensitive containment of the requested zone
    pub fn zone_matches(&self, zona: &str) -> bool {
        self.zona.to_lowercase().contains(&zona.trim().to_lowercase())
    }
}
