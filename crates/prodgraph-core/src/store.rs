//! The graph-store contract consumed by the ontology service.
//!
//! Implementations must provide strict node creation under uniqueness
//! constraints (duplicate codes are an error, never a silent merge),
//! idempotent edge creation (create-or-match applies to relationships
//! only), and atomic node-plus-edge writes: a created incident or
//! resolution node without its owning edge must never be observable.

use async_trait::async_trait;

use crate::error::OntologyError;
use crate::requests::ProductPatch;
use crate::types::{Component, Functionality, Incident, OwnerKind, Product, Resolution};

#[async_trait]
pub trait OntologyStore: Send + Sync {
    // ── Products ─────────────────────────────────────────────────

    /// Create a product node and its Assignment edges in one transaction.
    ///
    /// Every code in `functionalities` must already exist; otherwise the
    /// whole call fails with `NotFound` and nothing is written. A duplicate
    /// product code fails with `DuplicateCode`.
    async fn create_product(
        &self,
        product: &Product,
        functionalities: &[String],
    ) -> Result<(), OntologyError>;

    async fn get_product(&self, code: &str) -> Result<Option<Product>, OntologyError>;

    /// Apply a validated patch to mutable attributes. `NotFound` if the
    /// product does not exist.
    async fn update_product(
        &self,
        code: &str,
        patch: &ProductPatch,
    ) -> Result<Product, OntologyError>;

    /// Delete the product node and every edge touching it. Functionality
    /// nodes are never removed. `NotFound` if the product does not exist.
    async fn delete_product(&self, code: &str) -> Result<(), OntologyError>;

    /// One page of products ordered by code, plus the total count.
    async fn list_products(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Product>, u64), OntologyError>;

    /// Case-insensitive substring match over code and name.
    async fn search_products(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Product>, OntologyError>;

    // ── Functionalities ──────────────────────────────────────────

    async fn create_functionality(
        &self,
        functionality: &Functionality,
    ) -> Result<(), OntologyError>;

    async fn get_functionality(&self, code: &str) -> Result<Option<Functionality>, OntologyError>;

    async fn list_functionalities(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Functionality>, u64), OntologyError>;

    // ── Components ───────────────────────────────────────────────

    async fn create_component(&self, component: &Component) -> Result<(), OntologyError>;

    async fn get_component(&self, code: &str) -> Result<Option<Component>, OntologyError>;

    // ── Assignments ──────────────────────────────────────────────

    /// Merge Assignment edges from the owner to each functionality.
    /// Idempotent: existing edges are matched, not duplicated. The owner
    /// and every functionality must exist (`NotFound` otherwise).
    async fn assign_functionalities(
        &self,
        owner: OwnerKind,
        owner_code: &str,
        codes: &[String],
    ) -> Result<(), OntologyError>;

    /// Remove Assignment edges; returns how many were deleted. Codes
    /// without an edge are skipped silently.
    async fn remove_assignments(
        &self,
        owner: OwnerKind,
        owner_code: &str,
        codes: &[String],
    ) -> Result<u64, OntologyError>;

    /// Functionalities currently assigned to the owner, ordered by code.
    async fn functionalities_of(
        &self,
        owner: OwnerKind,
        owner_code: &str,
    ) -> Result<Vec<Functionality>, OntologyError>;

    /// Products holding an Assignment edge to the functionality, ordered
    /// by code. Missing functionality yields an empty result; existence
    /// is the caller's check.
    async fn products_with_functionality(
        &self,
        code: &str,
    ) -> Result<Vec<Product>, OntologyError>;

    // ── Incidents ────────────────────────────────────────────────

    /// Create the incident node and its owning edge atomically. `NotFound`
    /// if the functionality does not exist; `DuplicateCode` on a duplicate
    /// incident code. On failure no incident node may remain.
    async fn create_incident(&self, incident: &Incident) -> Result<(), OntologyError>;

    async fn get_incident(&self, code: &str) -> Result<Option<Incident>, OntologyError>;

    /// Incidents owned by a functionality, newest first. Missing
    /// functionality yields an empty result; existence is the caller's
    /// check.
    async fn incidents_by_functionality(
        &self,
        code: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Incident>, u64), OntologyError>;

    /// Incidents reachable through the product's assigned
    /// functionalities, newest first.
    async fn incidents_by_product(
        &self,
        code: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Incident>, u64), OntologyError>;

    // ── Resolutions ──────────────────────────────────────────────

    /// Create the resolution node and its edge atomically. `NotFound` if
    /// the incident does not exist; `DuplicateCode` if a resolution is
    /// already recorded for it.
    async fn create_resolution(&self, resolution: &Resolution) -> Result<(), OntologyError>;

    async fn resolutions_of(
        &self,
        incident_code: &str,
    ) -> Result<Vec<Resolution>, OntologyError>;
}
