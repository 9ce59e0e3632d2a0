//! The token-gated operation surface.
//!
//! Every public method follows the same sequence: verify the bearer
//! token, validate the request payload, then hit the store. The store is
//! never reached on an authentication or validation failure, so a
//! rejected request is guaranteed to leave the graph untouched.

use std::sync::Arc;

use prodgraph_auth::{Claims, TokenVerifier};
use prodgraph_core::requests::{
    AssignmentRequest, ComponentRegistration, FunctionalityRegistration, IncidentRegistration,
    ProductPatch, ProductRegistration, ResolutionRegistration,
};
use prodgraph_core::types::{
    AssignmentResult, Component, ComponentDetails, EntityKind, Functionality,
    FunctionalityDetails, Incident, OwnerKind, Product, ProductDetails, Resolution,
};
use prodgraph_core::{OntologyError, OntologyStore};

use crate::config::PaginationSettings;

/// The ontology service: one instance shared across all callers.
#[derive(Clone)]
pub struct OntologyService {
    store: Arc<dyn OntologyStore>,
    verifier: TokenVerifier,
    pub(crate) pagination: PaginationSettings,
}

impl OntologyService {
    pub fn new(
        store: Arc<dyn OntologyStore>,
        verifier: TokenVerifier,
        pagination: PaginationSettings,
    ) -> Self {
        Self {
            store,
            verifier,
            pagination,
        }
    }

    pub(crate) fn store(&self) -> &dyn OntologyStore {
        self.store.as_ref()
    }

    /// The gate every operation passes first.
    pub(crate) fn gate(&self, token: &str) -> Result<Claims, OntologyError> {
        self.verifier.verify(token)
    }

    // ── Products ─────────────────────────────────────────────────

    /// Register a product, optionally assigning functionalities in the
    /// same transaction. Every referenced functionality must already
    /// exist.
    pub async fn register_product(
        &self,
        token: &str,
        request: &ProductRegistration,
    ) -> Result<Product, OntologyError> {
        let claims = self.gate(token)?;
        let validated = request.validate()?;

        self.store
            .create_product(&validated.product, &validated.functionalities)
            .await?;

        tracing::info!(
            code = %validated.product.code,
            functionalities = validated.functionalities.len(),
            user = %claims.sub,
            "Product registered"
        );
        Ok(validated.product)
    }

    /// A product together with its assigned functionalities.
    pub async fn get_product(
        &self,
        token: &str,
        code: &str,
    ) -> Result<ProductDetails, OntologyError> {
        self.gate(token)?;

        let product = self
            .store
            .get_product(code)
            .await?
            .ok_or_else(|| OntologyError::not_found(EntityKind::Product, code))?;
        let functionalities = self
            .store
            .functionalities_of(OwnerKind::Product, code)
            .await?;

        Ok(ProductDetails {
            product,
            functionalities,
        })
    }

    pub async fn update_product(
        &self,
        token: &str,
        code: &str,
        patch: &ProductPatch,
    ) -> Result<Product, OntologyError> {
        let claims = self.gate(token)?;
        let patch = patch.validate()?;

        let product = self.store.update_product(code, &patch).await?;
        tracing::info!(code, user = %claims.sub, "Product updated");
        Ok(product)
    }

    /// Delete a product and its edges. Functionality nodes survive.
    pub async fn delete_product(&self, token: &str, code: &str) -> Result<(), OntologyError> {
        let claims = self.gate(token)?;
        self.store.delete_product(code).await?;
        tracing::info!(code, user = %claims.sub, "Product deleted");
        Ok(())
    }

    // ── Functionalities ──────────────────────────────────────────

    pub async fn register_functionality(
        &self,
        token: &str,
        request: &FunctionalityRegistration,
    ) -> Result<Functionality, OntologyError> {
        let claims = self.gate(token)?;
        let functionality = request.validate()?;

        self.store.create_functionality(&functionality).await?;
        tracing::info!(code = %functionality.code, user = %claims.sub, "Functionality registered");
        Ok(functionality)
    }

    pub async fn get_functionality(
        &self,
        token: &str,
        code: &str,
    ) -> Result<Functionality, OntologyError> {
        self.gate(token)?;
        self.store
            .get_functionality(code)
            .await?
            .ok_or_else(|| OntologyError::not_found(EntityKind::Functionality, code))
    }

    /// A functionality together with the products that provide it
    /// (reverse Assignment traversal).
    pub async fn get_functionality_details(
        &self,
        token: &str,
        code: &str,
    ) -> Result<FunctionalityDetails, OntologyError> {
        self.gate(token)?;

        let functionality = self
            .store
            .get_functionality(code)
            .await?
            .ok_or_else(|| OntologyError::not_found(EntityKind::Functionality, code))?;
        let products = self.store.products_with_functionality(code).await?;

        Ok(FunctionalityDetails {
            functionality,
            products,
        })
    }

    // ── Components ───────────────────────────────────────────────

    pub async fn register_component(
        &self,
        token: &str,
        request: &ComponentRegistration,
    ) -> Result<Component, OntologyError> {
        let claims = self.gate(token)?;
        let component = request.validate()?;

        self.store.create_component(&component).await?;
        tracing::info!(code = %component.code, user = %claims.sub, "Component registered");
        Ok(component)
    }

    /// A component together with its assigned functionalities.
    pub async fn get_component(
        &self,
        token: &str,
        code: &str,
    ) -> Result<ComponentDetails, OntologyError> {
        self.gate(token)?;

        let component = self
            .store
            .get_component(code)
            .await?
            .ok_or_else(|| OntologyError::not_found(EntityKind::Component, code))?;
        let functionalities = self
            .store
            .functionalities_of(OwnerKind::Component, code)
            .await?;

        Ok(ComponentDetails {
            component,
            functionalities,
        })
    }

    // ── Assignments ──────────────────────────────────────────────

    /// Assign functionalities to a product or component. Idempotent:
    /// repeating the call changes nothing and succeeds.
    pub async fn assign_functionalities(
        &self,
        token: &str,
        request: &AssignmentRequest,
    ) -> Result<AssignmentResult, OntologyError> {
        let claims = self.gate(token)?;
        let validated = request.validate()?;

        self.store
            .assign_functionalities(
                validated.owner,
                &validated.owner_code,
                &validated.functionality_codes,
            )
            .await?;

        tracing::info!(
            owner = %validated.owner,
            owner_code = %validated.owner_code,
            count = validated.functionality_codes.len(),
            user = %claims.sub,
            "Functionalities assigned"
        );
        Ok(AssignmentResult {
            owner: validated.owner,
            owner_code: validated.owner_code,
            assigned: validated.functionality_codes,
        })
    }

    /// Remove functionality assignments; returns how many edges were
    /// deleted. Codes that were never assigned are skipped silently.
    pub async fn remove_functionalities(
        &self,
        token: &str,
        request: &AssignmentRequest,
    ) -> Result<u64, OntologyError> {
        let claims = self.gate(token)?;
        let validated = request.validate()?;

        let removed = self
            .store
            .remove_assignments(
                validated.owner,
                &validated.owner_code,
                &validated.functionality_codes,
            )
            .await?;

        tracing::info!(
            owner = %validated.owner,
            owner_code = %validated.owner_code,
            removed,
            user = %claims.sub,
            "Assignments removed"
        );
        Ok(removed)
    }

    // ── Incidents ────────────────────────────────────────────────

    /// Register an incident against an existing functionality.
    pub async fn register_incident(
        &self,
        token: &str,
        request: &IncidentRegistration,
    ) -> Result<Incident, OntologyError> {
        let claims = self.gate(token)?;
        let incident = request.validate()?;

        self.store.create_incident(&incident).await?;
        tracing::info!(
            code = %incident.code,
            functionality = %incident.functionality_code,
            sla = %incident.sla_level,
            user = %claims.sub,
            "Incident registered"
        );
        Ok(incident)
    }

    pub async fn get_incident(
        &self,
        token: &str,
        code: &str,
    ) -> Result<Incident, OntologyError> {
        self.gate(token)?;
        self.store
            .get_incident(code)
            .await?
            .ok_or_else(|| OntologyError::not_found(EntityKind::Incident, code))
    }

    // ── Resolutions ──────────────────────────────────────────────

    /// Record a resolution for an existing incident. At most one
    /// resolution per incident.
    pub async fn register_resolution(
        &self,
        token: &str,
        request: &ResolutionRegistration,
    ) -> Result<Resolution, OntologyError> {
        let claims = self.gate(token)?;
        let resolution = request.validate()?;

        self.store.create_resolution(&resolution).await?;
        tracing::info!(
            incident = %resolution.incident_code,
            user = %claims.sub,
            "Resolution recorded"
        );
        Ok(resolution)
    }

    /// Resolutions recorded for an incident. `NotFound` when the incident
    /// itself does not exist; an unresolved incident yields an empty list.
    pub async fn list_resolutions(
        &self,
        token: &str,
        incident_code: &str,
    ) -> Result<Vec<Resolution>, OntologyError> {
        self.gate(token)?;

        if self.store.get_incident(incident_code).await?.is_none() {
            return Err(OntologyError::not_found(EntityKind::Incident, incident_code));
        }
        self.store.resolutions_of(incident_code).await
    }
}
