//! Paginated listing and search operations.
//!
//! Listings share the same token gate as mutations. Page sizes are
//! clamped rather than rejected: a missing limit gets the configured
//! default, an oversized one is cut to the maximum, and a zero limit is
//! treated as missing.

use prodgraph_core::types::{EntityKind, Functionality, Incident, Page, Product};
use prodgraph_core::OntologyError;

use crate::gateway::OntologyService;

impl OntologyService {
    fn clamp_limit(&self, limit: Option<u32>) -> u32 {
        match limit {
            None | Some(0) => self.pagination.default_page_size,
            Some(n) => n.min(self.pagination.max_page_size),
        }
    }

    /// One page of products ordered by code.
    pub async fn list_products(
        &self,
        token: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Page<Product>, OntologyError> {
        self.gate(token)?;

        let limit = self.clamp_limit(limit);
        let offset = offset.unwrap_or(0);
        let (items, total) = self.store().list_products(limit, offset).await?;
        Ok(Page::new(items, total, offset))
    }

    /// Case-insensitive substring search over product code and name.
    pub async fn search_products(
        &self,
        token: &str,
        query: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Product>, OntologyError> {
        self.gate(token)?;

        let query = query.trim();
        if query.is_empty() {
            return Err(OntologyError::Validation {
                entity: EntityKind::Product,
                fields: vec!["query"],
            });
        }

        let limit = self.clamp_limit(limit);
        self.store().search_products(query, limit).await
    }

    /// One page of functionalities ordered by code.
    pub async fn list_functionalities(
        &self,
        token: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Page<Functionality>, OntologyError> {
        self.gate(token)?;

        let limit = self.clamp_limit(limit);
        let offset = offset.unwrap_or(0);
        let (items, total) = self.store().list_functionalities(limit, offset).await?;
        Ok(Page::new(items, total, offset))
    }

    /// Incidents owned by a functionality, newest first. `NotFound` when
    /// the functionality itself does not exist, so an empty page always
    /// means "exists but quiet".
    pub async fn list_incidents_by_functionality(
        &self,
        token: &str,
        code: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Page<Incident>, OntologyError> {
        self.gate(token)?;

        if self.store().get_functionality(code).await?.is_none() {
            return Err(OntologyError::not_found(EntityKind::Functionality, code));
        }

        let limit = self.clamp_limit(limit);
        let offset = offset.unwrap_or(0);
        let (items, total) = self
            .store()
            .incidents_by_functionality(code, limit, offset)
            .await?;
        Ok(Page::new(items, total, offset))
    }

    /// Incidents reachable through a product's assigned functionalities,
    /// newest first.
    pub async fn list_incidents_by_product(
        &self,
        token: &str,
        code: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Page<Incident>, OntologyError> {
        self.gate(token)?;

        if self.store().get_product(code).await?.is_none() {
            return Err(OntologyError::not_found(EntityKind::Product, code));
        }

        let limit = self.clamp_limit(limit);
        let offset = offset.unwrap_or(0);
        let (items, total) = self
            .store()
            .incidents_by_product(code, limit, offset)
            .await?;
        Ok(Page::new(items, total, offset))
    }
}
