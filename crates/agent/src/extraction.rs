//! Best-effort recovery of name and contact from a free-text handoff summary
//!
//! The model sometimes hands off without having called the contact tool. The
//! summary it writes usually reads like `Lead Ana Gómez ... contacto: 1122`.
//! Both patterns are heuristics: callers treat the result as low confidence.

use once_cell::sync::Lazy;
use regex::Regex;

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Lead\s+([A-ZÁÉÍÓÚÑ][\wáéíóúñ]*(?:\s+[A-ZÁÉÍÓÚÑ][\wáéíóúñ]*)*)").unwrap()
});
static CONTACT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)contacto\s*:\s*([^\s,;]+)").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContact {
    pub nombre: Option<String>,
    pub contacto: Option<String>,
}

impl ExtractedContact {
    pub fn is_empty(&self) -> bool {
        self.nombre.is_none() && self.contacto.is_none()
    }
}

pub fn extract_contact(summary: &str) -> ExtractedContact {
    let nombre = NAME_PATTERN
        .captures(summary)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty());

    let contacto = CONTACT_PATTERN
        .captures(summary)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_end_matches('.').to_string())
        .filter(|s| !s.is_empty());

    ExtractedContact { nombre, contacto }
}
