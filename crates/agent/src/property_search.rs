//! Property search over the catalog collaborator

use inmo_agent_core::{Operation, Property};
use inmo_agent_persistence::{CatalogQuery, PersistenceError, PropertyCatalog};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    pub tenant_id: String,
    pub operacion: Operation,
    pub zona: String,
    pub presupuesto_max: f64,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Cheapest matches first, over-budget listings included
    pub results: Vec<Property>,
    pub user_budget: f64,
    /// Counted over `results`, after truncation
    pub properties_within_budget: usize,
}

#[derive(Clone)]
pub struct PropertySearch {
    catalog: Arc<dyn PropertyCatalog>,
}

impl PropertySearch {
    pub fn new(catalog: Arc<dyn PropertyCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn search(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<SearchOutcome, PersistenceError> {
        let query = CatalogQuery {
            tenant_id: criteria.tenant_id.clone(),
            operacion: criteria.operacion,
            zona: criteria.zona.clone(),
            limit: criteria.limit,
        };
        let candidates = self.catalog.search(&query).await?;
        let fetched = candidates.len();

        // The collaborator may be coarser than we are; re-apply every filter
        let mut results: Vec<Property> = candidates
            .into_iter()
            .filter(|p| p.disponible)
            .filter(|p| p.operacion == criteria.operacion)
            .filter(|p| p.zone_matches(&criteria.zona))
            .collect();
        results.sort_by(|a, b| a.precio.total_cmp(&b.precio));
        results.truncate(criteria.limit);

        let properties_within_budget = results
            .iter()
            .filter(|p| p.precio <= criteria.presupuesto_max)
            .count();

        tracing::debug!(
            tenant_id = %criteria.tenant_id,
            operacion = %criteria.operacion,
            zona = %criteria.zona,
            fetched,
            returned = results.len(),
            within_budget = properties_within_budget,
            "Property search"
        );

        Ok(SearchOutcome {
            results,
            user_budget: criteria.presupuesto_max,
            properties_within_budget,
        })
    }
}
