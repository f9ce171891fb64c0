//! Catalog seeding from a JSON listing file

use anyhow::{Context, Result};
use inmo_agent_core::Property;
use inmo_agent_persistence::InMemoryPropertyCatalog;
use std::path::Path;

pub fn read_properties(path: &Path) -> Result<Vec<Property>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading catalog seed {}", path.display()))?;
    let properties: Vec<Property> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing catalog seed {}", path.display()))?;
    Ok(properties)
}

/// Replace the tenant's listings with the file contents; returns the count loaded
pub fn seed_catalog(
    catalog: &InMemoryPropertyCatalog,
    tenant_id: &str,
    path: &Path,
) -> Result<usize> {
    let properties = read_properties(path)?;
    Ok(catalog.load(tenant_id, properties))
}
