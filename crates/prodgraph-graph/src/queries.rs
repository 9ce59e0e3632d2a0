//! Read operations for the ontology graph.
//!
//! Every query returns scalar columns rather than whole nodes, so
//! hydration stays independent of the bolt node representation.
//! Timestamps are stored as RFC3339 strings and parsed on the way out.

use chrono::{DateTime, Utc};
use neo4rs::{query, Row};

use prodgraph_core::types::{
    Component, Functionality, Incident, OwnerKind, Product, Resolution, SlaLevel,
};

use crate::client::{GraphClient, GraphError};
use crate::mutations::ASSIGNMENT_REL;

const PRODUCT_COLS: &str =
    "p.code AS code, p.name AS name, p.created_at AS created_at, p.updated_at AS updated_at";
const INCIDENT_COLS: &str = "i.code AS code, i.description AS description, \
     i.sla_level AS sla_level, i.functionality_code AS functionality_code, \
     i.created_at AS created_at";

impl GraphClient {
    // ── Products ─────────────────────────────────────────────────

    pub async fn fetch_product(&self, code: &str) -> Result<Option<Product>, GraphError> {
        let q = query(&format!(
            "MATCH (p:Product {{code: $code}}) RETURN {PRODUCT_COLS}"
        ))
        .param("code", code.to_string());

        self.query_one(q).await?.map(|row| product_from(&row)).transpose()
    }

    pub async fn fetch_products(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Product>, u64), GraphError> {
        let total = self.count_nodes("Product").await?;

        let q = query(&format!(
            "MATCH (p:Product) RETURN {PRODUCT_COLS}
             ORDER BY p.code SKIP $offset LIMIT $limit"
        ))
        .param("offset", offset as i64)
        .param("limit", limit as i64);

        let rows = self.query_rows(q).await?;
        let products = rows.iter().map(product_from).collect::<Result<_, _>>()?;
        Ok((products, total))
    }

    pub async fn search_products(
        &self,
        needle: &str,
        limit: u32,
    ) -> Result<Vec<Product>, GraphError> {
        let q = query(&format!(
            "MATCH (p:Product)
             WHERE toLower(p.code) CONTAINS toLower($needle)
                OR toLower(p.name) CONTAINS toLower($needle)
             RETURN {PRODUCT_COLS}
             ORDER BY p.code LIMIT $limit"
        ))
        .param("needle", needle.to_string())
        .param("limit", limit as i64);

        let rows = self.query_rows(q).await?;
        rows.iter().map(product_from).collect()
    }

    // ── Functionalities ──────────────────────────────────────────

    pub async fn fetch_functionality(
        &self,
        code: &str,
    ) -> Result<Option<Functionality>, GraphError> {
        let q = query(
            "MATCH (f:Functionality {code: $code})
             RETURN f.code AS code, f.name AS name, f.created_at AS created_at",
        )
        .param("code", code.to_string());

        self.query_one(q)
            .await?
            .map(|row| functionality_from(&row))
            .transpose()
    }

    pub async fn fetch_functionalities(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Functionality>, u64), GraphError> {
        let total = self.count_nodes("Functionality").await?;

        let q = query(
            "MATCH (f:Functionality)
             RETURN f.code AS code, f.name AS name, f.created_at AS created_at
             ORDER BY f.code SKIP $offset LIMIT $limit",
        )
        .param("offset", offset as i64)
        .param("limit", limit as i64);

        let rows = self.query_rows(q).await?;
        let items = rows.iter().map(functionality_from).collect::<Result<_, _>>()?;
        Ok((items, total))
    }

    /// Functionalities assigned to a product or component, ordered by code.
    pub async fn fetch_assigned_functionalities(
        &self,
        owner: OwnerKind,
        owner_code: &str,
    ) -> Result<Vec<Functionality>, GraphError> {
        let cypher = format!(
            "MATCH (o:{label} {{code: $owner_code}})-[:{ASSIGNMENT_REL}]->(f:Functionality)
             RETURN f.code AS code, f.name AS name, f.created_at AS created_at
             ORDER BY f.code",
            label = owner.label(),
        );

        let rows = self
            .query_rows(query(&cypher).param("owner_code", owner_code.to_string()))
            .await?;
        rows.iter().map(functionality_from).collect()
    }

    /// Products assigned to a functionality, ordered by code.
    pub async fn fetch_products_with_functionality(
        &self,
        code: &str,
    ) -> Result<Vec<Product>, GraphError> {
        let q = query(&format!(
            "MATCH (p:Product)-[:{ASSIGNMENT_REL}]->(:Functionality {{code: $code}})
             RETURN {PRODUCT_COLS}
             ORDER BY p.code"
        ))
        .param("code", code.to_string());

        let rows = self.query_rows(q).await?;
        rows.iter().map(product_from).collect()
    }

    // ── Components ───────────────────────────────────────────────

    pub async fn fetch_component(&self, code: &str) -> Result<Option<Component>, GraphError> {
        let q = query(
            "MATCH (c:Component {code: $code})
             RETURN c.code AS code, c.name AS name, c.created_at AS created_at",
        )
        .param("code", code.to_string());

        self.query_one(q)
            .await?
            .map(|row| component_from(&row))
            .transpose()
    }

    // ── Incidents ────────────────────────────────────────────────

    pub async fn fetch_incident(&self, code: &str) -> Result<Option<Incident>, GraphError> {
        let q = query(&format!(
            "MATCH (i:Incident {{code: $code}}) RETURN {INCIDENT_COLS}"
        ))
        .param("code", code.to_string());

        self.query_one(q).await?.map(|row| incident_from(&row)).transpose()
    }

    pub async fn fetch_incidents_by_functionality(
        &self,
        code: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Incident>, u64), GraphError> {
        let count_q = query(
            "MATCH (:Functionality {code: $code})-[:HAS_INCIDENT]->(i:Incident)
             RETURN count(i) AS total",
        )
        .param("code", code.to_string());
        let total = self.count_from(count_q).await?;

        let q = query(&format!(
            "MATCH (:Functionality {{code: $code}})-[:HAS_INCIDENT]->(i:Incident)
             RETURN {INCIDENT_COLS}
             ORDER BY i.created_at DESC SKIP $offset LIMIT $limit"
        ))
        .param("code", code.to_string())
        .param("offset", offset as i64)
        .param("limit", limit as i64);

        let rows = self.query_rows(q).await?;
        let items = rows.iter().map(incident_from).collect::<Result<_, _>>()?;
        Ok((items, total))
    }

    /// Incidents reachable through the product's assigned functionalities.
    pub async fn fetch_incidents_by_product(
        &self,
        code: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Incident>, u64), GraphError> {
        let count_q = query(&format!(
            "MATCH (:Product {{code: $code}})-[:{ASSIGNMENT_REL}]->(:Functionality)
                   -[:HAS_INCIDENT]->(i:Incident)
             RETURN count(DISTINCT i) AS total"
        ))
        .param("code", code.to_string());
        let total = self.count_from(count_q).await?;

        let q = query(&format!(
            "MATCH (:Product {{code: $code}})-[:{ASSIGNMENT_REL}]->(:Functionality)
                   -[:HAS_INCIDENT]->(i:Incident)
             WITH DISTINCT i
             RETURN {INCIDENT_COLS}
             ORDER BY i.created_at DESC SKIP $offset LIMIT $limit"
        ))
        .param("code", code.to_string())
        .param("offset", offset as i64)
        .param("limit", limit as i64);

        let rows = self.query_rows(q).await?;
        let items = rows.iter().map(incident_from).collect::<Result<_, _>>()?;
        Ok((items, total))
    }

    // ── Resolutions ──────────────────────────────────────────────

    pub async fn fetch_resolutions(
        &self,
        incident_code: &str,
    ) -> Result<Vec<Resolution>, GraphError> {
        let q = query(
            "MATCH (:Incident {code: $code})-[:HAS_RESOLUTION]->(r:Resolution)
             RETURN r.incident_code AS incident_code, r.procedure AS procedure,
                    r.resolution_date AS resolution_date, r.created_at AS created_at
             ORDER BY r.created_at DESC",
        )
        .param("code", incident_code.to_string());

        let rows = self.query_rows(q).await?;
        rows.iter().map(resolution_from).collect()
    }

    // ── Helpers ──────────────────────────────────────────────────

    async fn count_nodes(&self, label: &str) -> Result<u64, GraphError> {
        let q = query(&format!("MATCH (n:{label}) RETURN count(n) AS total"));
        self.count_from(q).await
    }

    async fn count_from(&self, q: neo4rs::Query) -> Result<u64, GraphError> {
        match self.query_one(q).await? {
            Some(row) => Ok(row.get::<i64>("total").unwrap_or(0).max(0) as u64),
            None => Ok(0),
        }
    }
}

// ── Row hydration ─────────────────────────────────────────────────

fn get_string(row: &Row, column: &str) -> Result<String, GraphError> {
    row.get::<String>(column)
        .map_err(|e| GraphError::Serialization(format!("column {column}: {e}")))
}

fn get_datetime(row: &Row, column: &str) -> Result<DateTime<Utc>, GraphError> {
    let raw = get_string(row, column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| GraphError::Serialization(format!("column {column}: {e}")))
}

fn product_from(row: &Row) -> Result<Product, GraphError> {
    let updated_at = match row.get::<Option<String>>("updated_at") {
        Ok(Some(raw)) => Some(
            DateTime::parse_from_rfc3339(&raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| GraphError::Serialization(format!("column updated_at: {e}")))?,
        ),
        _ => None,
    };

    Ok(Product {
        code: get_string(row, "code")?,
        name: get_string(row, "name")?,
        created_at: get_datetime(row, "created_at")?,
        updated_at,
    })
}

fn functionality_from(row: &Row) -> Result<Functionality, GraphError> {
    Ok(Functionality {
        code: get_string(row, "code")?,
        name: get_string(row, "name")?,
        created_at: get_datetime(row, "created_at")?,
    })
}

fn component_from(row: &Row) -> Result<Component, GraphError> {
    Ok(Component {
        code: get_string(row, "code")?,
        name: get_string(row, "name")?,
        created_at: get_datetime(row, "created_at")?,
    })
}

fn incident_from(row: &Row) -> Result<Incident, GraphError> {
    let raw_sla = get_string(row, "sla_level")?;
    let sla_level = SlaLevel::parse(&raw_sla)
        .ok_or_else(|| GraphError::Serialization(format!("unknown sla_level {raw_sla:?}")))?;

    Ok(Incident {
        code: get_string(row, "code")?,
        description: get_string(row, "description")?,
        sla_level,
        functionality_code: get_string(row, "functionality_code")?,
        created_at: get_datetime(row, "created_at")?,
    })
}

fn resolution_from(row: &Row) -> Result<Resolution, GraphError> {
    Ok(Resolution {
        incident_code: get_string(row, "incident_code")?,
        procedure: get_string(row, "procedure")?,
        resolution_date: get_datetime(row, "resolution_date")?,
        created_at: get_datetime(row, "created_at")?,
    })
}
