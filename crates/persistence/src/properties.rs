//! Property catalog

use async_trait::async_trait;
use dashmap::DashMap;
use inmo_agent_core::{Operation, Property};

use crate::PersistenceError;

/// Catalog query. Budget is deliberately absent: the caller applies it.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub tenant_id: String,
    pub operacion: Operation,
    pub zona: String,
    /// Hint for server-side stores; the in-memory catalog returns every match
    pub limit: usize,
}

/// Property catalog trait
#[async_trait]
pub trait PropertyCatalog: Send + Sync {
    /// Tenant listings matching operation and zone (case-insensitive containment)
    async fn search(&self, query: &CatalogQuery) -> Result<Vec<Property>, PersistenceError>;
}

/// Tenant-keyed listing cache
///
/// Contents only change through `load` and `clear`; there is no expiry.
#[derive(Default)]
pub struct InMemoryPropertyCatalog {
    by_tenant: DashMap<String, Vec<Property>>,
}

impl InMemoryPropertyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached listings of a tenant, returning how many were stored
    pub fn load(&self, tenant_id: impl Into<String>, properties: Vec<Property>) -> usize {
        let tenant_id = tenant_id.into();
        let count = properties.len();
        tracing::info!(tenant_id = %tenant_id, count, "Property catalog loaded");
        self.by_tenant.insert(tenant_id, properties);
        count
    }

    /// Drop every cached listing
    pub fn clear(&self) {
        self.by_tenant.clear();
    }

    /// Cached listings across tenants
    pub fn count(&self) -> usize {
        self.by_tenant.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn count_for(&self, tenant_id: &str) -> usize {
        self.by_tenant
            .get(tenant_id)
            .map(|entry| entry.value().len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl PropertyCatalog for InMemoryPropertyCatalog {
    async fn search(&self, query: &CatalogQuery) -> Result<Vec<Property>, PersistenceError> {
        let Some(listings) = self.by_tenant.get(&query.tenant_id) else {
            return Ok(Vec::new());
        };

        Ok(listings
            .iter()
            .filter(|p| p.operacion == query.operacion && p.zone_matches(&query.zona))
            .cloned()
            .collect())
    }
}
