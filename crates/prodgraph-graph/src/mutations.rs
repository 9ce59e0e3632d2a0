//! Write operations for the ontology graph.
//!
//! Node creation is strict: duplicate codes fail at the uniqueness
//! constraint, they are never merged. MERGE is reserved for Assignment
//! edges, whose creation is idempotent. Node-plus-edge pairs are written
//! in single Cypher statements so each executes as one transaction.

use chrono::Utc;
use neo4rs::query;

use prodgraph_core::types::{Component, Functionality, Incident, OwnerKind, Product, Resolution};

use crate::client::{GraphClient, GraphError};

/// The single relationship kind linking products and components to the
/// functionalities they provide.
pub const ASSIGNMENT_REL: &str = "ASSIGNED_FUNCTIONALITY";

impl GraphClient {
    /// Create a Product node plus Assignment edges in one statement.
    ///
    /// Returns `false` without writing anything when one of the
    /// functionality codes does not exist.
    pub async fn insert_product(
        &self,
        product: &Product,
        functionality_codes: &[String],
    ) -> Result<bool, GraphError> {
        // The node keeps the entity's own creation time; only the edge
        // stamps get a fresh clock reading.
        let q = if functionality_codes.is_empty() {
            query(
                "CREATE (p:Product {code: $code, name: $name, created_at: $created_at})
                 RETURN p.code AS code",
            )
            .param("code", product.code.clone())
            .param("name", product.name.clone())
            .param("created_at", product.created_at.to_rfc3339())
        } else {
            // The size guard makes the whole statement a no-op when any
            // functionality is missing; MERGE inside FOREACH then only ever
            // matches nodes collected by the MATCH above it.
            query(&format!(
                "MATCH (f:Functionality) WHERE f.code IN $codes
                 WITH collect(DISTINCT f) AS funcs
                 WHERE size(funcs) = size($codes)
                 CREATE (p:Product {{code: $code, name: $name, created_at: $created_at}})
                 FOREACH (f IN funcs |
                   MERGE (p)-[r:{ASSIGNMENT_REL}]->(f)
                   ON CREATE SET r.created_at = $now)
                 RETURN p.code AS code"
            ))
            .param("codes", functionality_codes.to_vec())
            .param("code", product.code.clone())
            .param("name", product.name.clone())
            .param("created_at", product.created_at.to_rfc3339())
            .param("now", Utc::now().to_rfc3339())
        };

        Ok(self.query_one(q).await?.is_some())
    }

    pub async fn insert_functionality(
        &self,
        functionality: &Functionality,
    ) -> Result<(), GraphError> {
        let q = query(
            "CREATE (f:Functionality {code: $code, name: $name, created_at: $created_at})",
        )
        .param("code", functionality.code.clone())
        .param("name", functionality.name.clone())
        .param("created_at", functionality.created_at.to_rfc3339());

        self.run(q).await
    }

    pub async fn insert_component(&self, component: &Component) -> Result<(), GraphError> {
        let q = query(
            "CREATE (c:Component {code: $code, name: $name, created_at: $created_at})",
        )
        .param("code", component.code.clone())
        .param("name", component.name.clone())
        .param("created_at", component.created_at.to_rfc3339());

        self.run(q).await
    }

    /// Create an Incident node and its owning HAS_INCIDENT edge
    /// atomically. Returns `false` when the functionality does not exist;
    /// in that case no Incident node is written.
    pub async fn insert_incident(&self, incident: &Incident) -> Result<bool, GraphError> {
        let q = query(
            "MATCH (f:Functionality {code: $functionality_code})
             CREATE (i:Incident {code: $code, description: $description,
                     sla_level: $sla_level, functionality_code: $functionality_code,
                     created_at: $created_at})
             CREATE (f)-[:HAS_INCIDENT]->(i)
             RETURN i.code AS code",
        )
        .param("functionality_code", incident.functionality_code.clone())
        .param("code", incident.code.clone())
        .param("description", incident.description.clone())
        .param("sla_level", incident.sla_level.as_str())
        .param("created_at", incident.created_at.to_rfc3339());

        Ok(self.query_one(q).await?.is_some())
    }

    /// Create a Resolution node and its HAS_RESOLUTION edge atomically.
    /// Returns `false` when the incident does not exist.
    pub async fn insert_resolution(&self, resolution: &Resolution) -> Result<bool, GraphError> {
        let q = query(
            "MATCH (i:Incident {code: $incident_code})
             CREATE (r:Resolution {incident_code: $incident_code, procedure: $procedure,
                     resolution_date: $resolution_date, created_at: $created_at})
             CREATE (i)-[:HAS_RESOLUTION]->(r)
             RETURN r.incident_code AS code",
        )
        .param("incident_code", resolution.incident_code.clone())
        .param("procedure", resolution.procedure.clone())
        .param("resolution_date", resolution.resolution_date.to_rfc3339())
        .param("created_at", resolution.created_at.to_rfc3339());

        Ok(self.query_one(q).await?.is_some())
    }

    /// Merge Assignment edges from an owner to every listed functionality.
    ///
    /// Idempotent for existing edges. Returns `false` without writing when
    /// the owner or any functionality is missing.
    pub async fn merge_assignments(
        &self,
        owner: OwnerKind,
        owner_code: &str,
        codes: &[String],
    ) -> Result<bool, GraphError> {
        let cypher = format!(
            "MATCH (o:{label} {{code: $owner_code}})
             MATCH (f:Functionality) WHERE f.code IN $codes
             WITH o, collect(DISTINCT f) AS funcs
             WHERE size(funcs) = size($codes)
             FOREACH (f IN funcs |
               MERGE (o)-[r:{ASSIGNMENT_REL}]->(f)
               ON CREATE SET r.created_at = $now)
             RETURN o.code AS code",
            label = owner.label(),
        );

        let q = query(&cypher)
            .param("owner_code", owner_code.to_string())
            .param("codes", codes.to_vec())
            .param("now", Utc::now().to_rfc3339());

        Ok(self.query_one(q).await?.is_some())
    }

    /// Delete Assignment edges; returns the number removed.
    pub async fn delete_assignments(
        &self,
        owner: OwnerKind,
        owner_code: &str,
        codes: &[String],
    ) -> Result<i64, GraphError> {
        let cypher = format!(
            "MATCH (o:{label} {{code: $owner_code}})-[r:{ASSIGNMENT_REL}]->(f:Functionality)
             WHERE f.code IN $codes
             DELETE r
             RETURN count(r) AS removed",
            label = owner.label(),
        );

        let q = query(&cypher)
            .param("owner_code", owner_code.to_string())
            .param("codes", codes.to_vec());

        match self.query_one(q).await? {
            Some(row) => Ok(row.get::<i64>("removed").unwrap_or(0)),
            None => Ok(0),
        }
    }

    /// Patch a product's name. Returns `false` when the product is missing.
    pub async fn set_product_name(&self, code: &str, name: &str) -> Result<bool, GraphError> {
        let q = query(
            "MATCH (p:Product {code: $code})
             SET p.name = $name, p.updated_at = $now
             RETURN p.code AS code",
        )
        .param("code", code.to_string())
        .param("name", name.to_string())
        .param("now", Utc::now().to_rfc3339());

        Ok(self.query_one(q).await?.is_some())
    }

    /// Remove a product node and every edge touching it. Functionality
    /// nodes stay. Returns `false` when the product is missing.
    pub async fn remove_product(&self, code: &str) -> Result<bool, GraphError> {
        let q = query(
            "MATCH (p:Product {code: $code})
             DETACH DELETE p
             RETURN count(p) AS deleted",
        )
        .param("code", code.to_string());

        match self.query_one(q).await? {
            Some(row) => Ok(row.get::<i64>("deleted").unwrap_or(0) > 0),
            None => Ok(false),
        }
    }
}
