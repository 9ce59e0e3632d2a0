//! prodgraph-graph: Neo4j backend for the product ontology.
//!
//! This crate is the single mutation point for the ontology graph. All
//! reads and writes flow through [`GraphClient`], which implements the
//! `OntologyStore` contract: strict node creation under uniqueness
//! constraints, idempotent Assignment edges, and atomic node-plus-edge
//! writes expressed as single Cypher statements.

pub mod client;
pub mod mutations;
pub mod queries;
pub mod schema;
pub mod store;

pub use client::{GraphClient, GraphConfig, GraphError};
