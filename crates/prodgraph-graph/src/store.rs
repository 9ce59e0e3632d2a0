//! `OntologyStore` implementation backed by Neo4j.
//!
//! This is the store boundary: raw [`GraphError`] detail is logged here
//! and translated into the caller-facing [`OntologyError`] taxonomy.
//! Constraint violations become `DuplicateCode`, connectivity failures
//! become `StoreUnavailable`, everything else is `Internal`.

use async_trait::async_trait;

use prodgraph_core::requests::ProductPatch;
use prodgraph_core::types::{
    Component, EntityKind, Functionality, Incident, OwnerKind, Product, Resolution,
};
use prodgraph_core::{OntologyError, OntologyStore};

use crate::client::{GraphClient, GraphError};

/// Translate a backend failure for an operation on `entity` / `code`.
fn map_err(err: GraphError, entity: EntityKind, code: &str) -> OntologyError {
    match err {
        GraphError::ConstraintViolation(detail) => {
            tracing::debug!(%entity, code, detail, "uniqueness constraint violation");
            OntologyError::duplicate(entity, code)
        }
        GraphError::Timeout(secs) => {
            tracing::warn!(%entity, code, secs, "store call timed out");
            OntologyError::StoreUnavailable(format!("query timed out after {secs}s"))
        }
        GraphError::Connection(detail) => {
            tracing::error!(%entity, code, detail, "store connection failure");
            OntologyError::StoreUnavailable("connection failure".to_string())
        }
        GraphError::Query(source) => {
            tracing::error!(%entity, code, error = %source, "store query failure");
            OntologyError::Internal("store query failure".to_string())
        }
        GraphError::Serialization(detail) => {
            tracing::error!(%entity, code, detail, "store row decode failure");
            OntologyError::Internal("store row decode failure".to_string())
        }
    }
}

#[async_trait]
impl OntologyStore for GraphClient {
    // ── Products ─────────────────────────────────────────────────

    async fn create_product(
        &self,
        product: &Product,
        functionalities: &[String],
    ) -> Result<(), OntologyError> {
        let created = self
            .insert_product(product, functionalities)
            .await
            .map_err(|e| map_err(e, EntityKind::Product, &product.code))?;

        if created {
            return Ok(());
        }

        // The guarded write produced no row: at least one functionality is
        // missing. Name the first absent one.
        for code in functionalities {
            let exists = self
                .fetch_functionality(code)
                .await
                .map_err(|e| map_err(e, EntityKind::Functionality, code))?
                .is_some();
            if !exists {
                return Err(OntologyError::not_found(EntityKind::Functionality, code));
            }
        }
        Err(OntologyError::Internal(
            "product creation produced no row".to_string(),
        ))
    }

    async fn get_product(&self, code: &str) -> Result<Option<Product>, OntologyError> {
        self.fetch_product(code)
            .await
            .map_err(|e| map_err(e, EntityKind::Product, code))
    }

    async fn update_product(
        &self,
        code: &str,
        patch: &ProductPatch,
    ) -> Result<Product, OntologyError> {
        if let Some(name) = patch.name.as_deref() {
            let found = self
                .set_product_name(code, name)
                .await
                .map_err(|e| map_err(e, EntityKind::Product, code))?;
            if !found {
                return Err(OntologyError::not_found(EntityKind::Product, code));
            }
        }

        self.fetch_product(code)
            .await
            .map_err(|e| map_err(e, EntityKind::Product, code))?
            .ok_or_else(|| OntologyError::not_found(EntityKind::Product, code))
    }

    async fn delete_product(&self, code: &str) -> Result<(), OntologyError> {
        let deleted = self
            .remove_product(code)
            .await
            .map_err(|e| map_err(e, EntityKind::Product, code))?;
        if deleted {
            Ok(())
        } else {
            Err(OntologyError::not_found(EntityKind::Product, code))
        }
    }

    async fn list_products(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Product>, u64), OntologyError> {
        self.fetch_products(limit, offset)
            .await
            .map_err(|e| map_err(e, EntityKind::Product, ""))
    }

    async fn search_products(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Product>, OntologyError> {
        GraphClient::search_products(self, query, limit)
            .await
            .map_err(|e| map_err(e, EntityKind::Product, ""))
    }

    // ── Functionalities ──────────────────────────────────────────

    async fn create_functionality(
        &self,
        functionality: &Functionality,
    ) -> Result<(), OntologyError> {
        self.insert_functionality(functionality)
            .await
            .map_err(|e| map_err(e, EntityKind::Functionality, &functionality.code))
    }

    async fn get_functionality(
        &self,
        code: &str,
    ) -> Result<Option<Functionality>, OntologyError> {
        self.fetch_functionality(code)
            .await
            .map_err(|e| map_err(e, EntityKind::Functionality, code))
    }

    async fn list_functionalities(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Functionality>, u64), OntologyError> {
        self.fetch_functionalities(limit, offset)
            .await
            .map_err(|e| map_err(e, EntityKind::Functionality, ""))
    }

    // ── Components ───────────────────────────────────────────────

    async fn create_component(&self, component: &Component) -> Result<(), OntologyError> {
        self.insert_component(component)
            .await
            .map_err(|e| map_err(e, EntityKind::Component, &component.code))
    }

    async fn get_component(&self, code: &str) -> Result<Option<Component>, OntologyError> {
        self.fetch_component(code)
            .await
            .map_err(|e| map_err(e, EntityKind::Component, code))
    }

    // ── Assignments ──────────────────────────────────────────────

    async fn assign_functionalities(
        &self,
        owner: OwnerKind,
        owner_code: &str,
        codes: &[String],
    ) -> Result<(), OntologyError> {
        let merged = self
            .merge_assignments(owner, owner_code, codes)
            .await
            .map_err(|e| map_err(e, owner.entity(), owner_code))?;

        if merged {
            return Ok(());
        }

        // Guarded merge matched nothing: either the owner or one of the
        // functionalities is absent.
        let owner_exists = match owner {
            OwnerKind::Product => self.get_product(owner_code).await?.is_some(),
            OwnerKind::Component => self.get_component(owner_code).await?.is_some(),
        };
        if !owner_exists {
            return Err(OntologyError::not_found(owner.entity(), owner_code));
        }

        for code in codes {
            let exists = self.get_functionality(code).await?.is_some();
            if !exists {
                return Err(OntologyError::not_found(EntityKind::Functionality, code));
            }
        }
        Err(OntologyError::Internal(
            "assignment merge produced no row".to_string(),
        ))
    }

    async fn remove_assignments(
        &self,
        owner: OwnerKind,
        owner_code: &str,
        codes: &[String],
    ) -> Result<u64, OntologyError> {
        let removed = self
            .delete_assignments(owner, owner_code, codes)
            .await
            .map_err(|e| map_err(e, owner.entity(), owner_code))?;
        Ok(removed.max(0) as u64)
    }

    async fn functionalities_of(
        &self,
        owner: OwnerKind,
        owner_code: &str,
    ) -> Result<Vec<Functionality>, OntologyError> {
        self.fetch_assigned_functionalities(owner, owner_code)
            .await
            .map_err(|e| map_err(e, owner.entity(), owner_code))
    }

    async fn products_with_functionality(
        &self,
        code: &str,
    ) -> Result<Vec<Product>, OntologyError> {
        self.fetch_products_with_functionality(code)
            .await
            .map_err(|e| map_err(e, EntityKind::Functionality, code))
    }

    // ── Incidents ────────────────────────────────────────────────

    async fn create_incident(&self, incident: &Incident) -> Result<(), OntologyError> {
        let created = self
            .insert_incident(incident)
            .await
            .map_err(|e| map_err(e, EntityKind::Incident, &incident.code))?;

        if created {
            Ok(())
        } else {
            Err(OntologyError::not_found(
                EntityKind::Functionality,
                &incident.functionality_code,
            ))
        }
    }

    async fn get_incident(&self, code: &str) -> Result<Option<Incident>, OntologyError> {
        self.fetch_incident(code)
            .await
            .map_err(|e| map_err(e, EntityKind::Incident, code))
    }

    async fn incidents_by_functionality(
        &self,
        code: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Incident>, u64), OntologyError> {
        self.fetch_incidents_by_functionality(code, limit, offset)
            .await
            .map_err(|e| map_err(e, EntityKind::Functionality, code))
    }

    async fn incidents_by_product(
        &self,
        code: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Incident>, u64), OntologyError> {
        self.fetch_incidents_by_product(code, limit, offset)
            .await
            .map_err(|e| map_err(e, EntityKind::Product, code))
    }

    // ── Resolutions ──────────────────────────────────────────────

    async fn create_resolution(&self, resolution: &Resolution) -> Result<(), OntologyError> {
        let created = self
            .insert_resolution(resolution)
            .await
            .map_err(|e| map_err(e, EntityKind::Resolution, &resolution.incident_code))?;

        if created {
            Ok(())
        } else {
            Err(OntologyError::not_found(
                EntityKind::Incident,
                &resolution.incident_code,
            ))
        }
    }

    async fn resolutions_of(
        &self,
        incident_code: &str,
    ) -> Result<Vec<Resolution>, OntologyError> {
        self.fetch_resolutions(incident_code)
            .await
            .map_err(|e| map_err(e, EntityKind::Resolution, incident_code))
    }
}
