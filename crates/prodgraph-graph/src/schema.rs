//! Schema bootstrap: uniqueness constraints for every entity code.
//!
//! Constraints are what make strict creation work: CREATE on an existing
//! code fails at the database instead of silently merging. Safe to run on
//! every startup thanks to IF NOT EXISTS.

use neo4rs::query;

use crate::client::{GraphClient, GraphError};

const CONSTRAINTS: &[(&str, &str)] = &[
    ("product_code", "CREATE CONSTRAINT product_code IF NOT EXISTS FOR (p:Product) REQUIRE p.code IS UNIQUE"),
    ("functionality_code", "CREATE CONSTRAINT functionality_code IF NOT EXISTS FOR (f:Functionality) REQUIRE f.code IS UNIQUE"),
    ("component_code", "CREATE CONSTRAINT component_code IF NOT EXISTS FOR (c:Component) REQUIRE c.code IS UNIQUE"),
    ("incident_code", "CREATE CONSTRAINT incident_code IF NOT EXISTS FOR (i:Incident) REQUIRE i.code IS UNIQUE"),
    // One resolution record per incident.
    ("resolution_incident_code", "CREATE CONSTRAINT resolution_incident_code IF NOT EXISTS FOR (r:Resolution) REQUIRE r.incident_code IS UNIQUE"),
];

impl GraphClient {
    /// Create all uniqueness constraints. Idempotent.
    pub async fn ensure_constraints(&self) -> Result<(), GraphError> {
        for (name, cypher) in CONSTRAINTS {
            self.run(query(cypher)).await?;
            tracing::debug!(constraint = name, "Constraint ensured");
        }
        tracing::info!(count = CONSTRAINTS.len(), "Ontology schema ready");
        Ok(())
    }
}
