//! prodgraph-service: the token-gated operation surface of the ontology.
//!
//! [`OntologyService`] is the only public entry point. Every operation
//! takes a bearer token as its first argument and runs the same sequence:
//! verify the token, validate the request, then call the store. A failed
//! verification or validation never reaches the store.

pub mod config;
pub mod facade;
pub mod gateway;
pub mod seed;

pub use config::{ConfigError, ServiceConfig};
pub use gateway::OntologyService;
