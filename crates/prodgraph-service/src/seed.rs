//! Development seed data.
//!
//! Writes a small demo ontology through the store contract, so seeding
//! exercises the same strict-creation paths as the service. Intended for
//! fresh databases; on an already-seeded database the duplicate codes
//! fail and are reported per entity.

use chrono::Utc;
use prodgraph_core::types::{
    Functionality, Incident, OwnerKind, Product, Resolution, SlaLevel,
};
use prodgraph_core::{OntologyError, OntologyStore};

const FUNCTIONALITIES: &[(&str, &str)] = &[
    ("REPORTES", "Report generation and export"),
    ("CONTABILIDAD", "General ledger and accounting"),
    ("GESTION", "Workflow and task management"),
    ("ANALISIS", "Data analysis and dashboards"),
    ("MONITOREO", "System health monitoring"),
];

const PRODUCTS: &[(&str, &str, &[&str])] = &[
    (
        "ERP",
        "Enterprise Resource Planning",
        &["REPORTES", "CONTABILIDAD", "GESTION"],
    ),
    ("CRM", "Customer Relationship Management", &["GESTION", "ANALISIS"]),
    ("SCM", "Supply Chain Management", &["GESTION", "MONITOREO"]),
    ("BI", "Business Intelligence Suite", &["REPORTES", "ANALISIS"]),
];

/// Populate a fresh database with the demo ontology.
pub async fn seed(store: &dyn OntologyStore) -> Result<(), OntologyError> {
    for &(code, name) in FUNCTIONALITIES {
        let functionality = Functionality {
            code: code.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        store.create_functionality(&functionality).await?;
        tracing::info!(code, "Seeded functionality");
    }

    for &(code, name, funcs) in PRODUCTS {
        let product = Product {
            code: code.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
            updated_at: None,
        };
        let codes: Vec<String> = funcs.iter().map(|c| c.to_string()).collect();
        store.create_product(&product, &codes).await?;
        tracing::info!(code, functionalities = codes.len(), "Seeded product");
    }

    let incidents = [
        Incident {
            code: "INC001".to_string(),
            description: "Monthly report export times out for large datasets".to_string(),
            sla_level: SlaLevel::High,
            functionality_code: "REPORTES".to_string(),
            created_at: Utc::now(),
        },
        Incident {
            code: "INC002".to_string(),
            description: "Dashboard widgets show stale figures after refresh".to_string(),
            sla_level: SlaLevel::Medium,
            functionality_code: "ANALISIS".to_string(),
            created_at: Utc::now(),
        },
    ];
    for incident in &incidents {
        store.create_incident(incident).await?;
        tracing::info!(code = %incident.code, "Seeded incident");
    }

    let resolution = Resolution {
        incident_code: "INC001".to_string(),
        procedure: "Raised the export worker timeout and added batch chunking".to_string(),
        resolution_date: Utc::now(),
        created_at: Utc::now(),
    };
    store.create_resolution(&resolution).await?;
    tracing::info!(incident = %resolution.incident_code, "Seeded resolution");

    let assigned = store.functionalities_of(OwnerKind::Product, "ERP").await?;
    tracing::info!(
        products = PRODUCTS.len(),
        functionalities = FUNCTIONALITIES.len(),
        erp_assignments = assigned.len(),
        "Seed complete"
    );
    Ok(())
}
