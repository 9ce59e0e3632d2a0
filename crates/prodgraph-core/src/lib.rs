//! prodgraph-core: Shared types, validation, and error handling for the
//! prodgraph product ontology.
//!
//! This crate provides the foundation used across all prodgraph components:
//! - Entity types (Product, Functionality, Component, Incident, Resolution)
//! - Registration request types with field validation
//! - The `OntologyStore` trait every graph backend implements
//! - The error taxonomy surfaced to callers

pub mod error;
pub mod requests;
pub mod store;
pub mod types;

pub use error::OntologyError;
pub use store::OntologyStore;
pub use types::{
    AssignmentResult, Component, ComponentDetails, EntityKind, Functionality,
    FunctionalityDetails, Incident, OwnerKind, Page, Product, ProductDetails, Resolution,
    SlaLevel,
};
