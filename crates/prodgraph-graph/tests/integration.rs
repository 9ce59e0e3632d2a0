//! Integration tests for prodgraph-graph against a live Neo4j instance.
//!
//! These tests require a running Neo4j with the default dev credentials.
//! Run with: cargo test --package prodgraph-graph --test integration -- --ignored
//!
//! Skipped automatically if Neo4j is not available. Each test works under
//! a unique code prefix so runs never collide, and cleans up after itself.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use prodgraph_core::types::{Functionality, Incident, OwnerKind, Product, Resolution, SlaLevel};
use prodgraph_core::{OntologyError, OntologyStore};
use prodgraph_graph::{GraphClient, GraphConfig};

async fn connect_or_skip() -> Option<GraphClient> {
    let config = GraphConfig::default();
    match GraphClient::connect(&config).await {
        Ok(client) => {
            client.ensure_constraints().await.ok()?;
            Some(client)
        }
        Err(e) => {
            eprintln!("Skipping integration test (Neo4j not available): {e}");
            None
        }
    }
}

/// Unique per-test code prefix, short enough to leave room in the 20-char
/// code budget.
fn unique_prefix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    format!("T{nanos:08X}")
}

async fn cleanup(client: &GraphClient, prefix: &str) {
    let q = neo4rs::query(
        "MATCH (n) WHERE n.code STARTS WITH $prefix OR n.incident_code STARTS WITH $prefix
         DETACH DELETE n",
    )
    .param("prefix", prefix.to_string());
    let _ = client.run(q).await;
}

fn make_functionality(code: &str, name: &str) -> Functionality {
    Functionality {
        code: code.to_string(),
        name: name.to_string(),
        created_at: Utc::now(),
    }
}

fn make_product(code: &str, name: &str) -> Product {
    Product {
        code: code.to_string(),
        name: name.to_string(),
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn make_incident(code: &str, functionality_code: &str) -> Incident {
    Incident {
        code: code.to_string(),
        description: "Batch export hangs at 90 percent".to_string(),
        sla_level: SlaLevel::High,
        functionality_code: functionality_code.to_string(),
        created_at: Utc::now(),
    }
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn create_product_with_functionalities_and_read_back() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let p = unique_prefix();

    let func = make_functionality(&format!("{p}F1"), "Reporting");
    client.create_functionality(&func).await.unwrap();

    let product = make_product(&format!("{p}ERP"), "Enterprise Resource Planning");
    client
        .create_product(&product, &[func.code.clone()])
        .await
        .unwrap();

    // Full round trip: the stored node must hydrate to exactly the value
    // that was registered, timestamps included.
    let fetched = client.get_product(&product.code).await.unwrap().unwrap();
    assert_eq!(fetched, product);

    let fetched_func = client
        .get_functionality(&func.code)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched_func, func);

    let assigned = client
        .functionalities_of(OwnerKind::Product, &product.code)
        .await
        .unwrap();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].code, func.code);

    let providers = client
        .products_with_functionality(&func.code)
        .await
        .unwrap();
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].code, product.code);

    cleanup(&client, &p).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn create_product_with_missing_functionality_writes_nothing() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let p = unique_prefix();

    let product = make_product(&format!("{p}CRM"), "Customer Relations");
    let err = client
        .create_product(&product, &[format!("{p}NOPE")])
        .await
        .unwrap_err();
    assert!(matches!(err, OntologyError::NotFound { .. }));

    // The guard must have prevented the node write too.
    assert!(client.get_product(&product.code).await.unwrap().is_none());

    cleanup(&client, &p).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn duplicate_product_code_is_rejected() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let p = unique_prefix();

    let product = make_product(&format!("{p}BI"), "Business Intelligence");
    client.create_product(&product, &[]).await.unwrap();

    let err = client.create_product(&product, &[]).await.unwrap_err();
    assert!(matches!(err, OntologyError::DuplicateCode { .. }));

    cleanup(&client, &p).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn assignment_is_idempotent() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let p = unique_prefix();

    let func = make_functionality(&format!("{p}F1"), "Accounting");
    client.create_functionality(&func).await.unwrap();
    let product = make_product(&format!("{p}ERP"), "ERP");
    client.create_product(&product, &[]).await.unwrap();

    let codes = vec![func.code.clone()];
    client
        .assign_functionalities(OwnerKind::Product, &product.code, &codes)
        .await
        .unwrap();
    client
        .assign_functionalities(OwnerKind::Product, &product.code, &codes)
        .await
        .unwrap();

    let assigned = client
        .functionalities_of(OwnerKind::Product, &product.code)
        .await
        .unwrap();
    assert_eq!(assigned.len(), 1);

    let removed = client
        .remove_assignments(OwnerKind::Product, &product.code, &codes)
        .await
        .unwrap();
    assert_eq!(removed, 1);

    cleanup(&client, &p).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn incident_and_resolution_lifecycle() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let p = unique_prefix();

    let func = make_functionality(&format!("{p}F1"), "Reporting");
    client.create_functionality(&func).await.unwrap();

    let incident = make_incident(&format!("{p}I1"), &func.code);
    client.create_incident(&incident).await.unwrap();

    let fetched = client.get_incident(&incident.code).await.unwrap().unwrap();
    assert_eq!(fetched, incident);
    assert_eq!(fetched.sla_level, SlaLevel::High);

    let (incidents, total) = client
        .incidents_by_functionality(&func.code, 10, 0)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(incidents[0].code, incident.code);

    let resolution = Resolution {
        incident_code: incident.code.clone(),
        procedure: "Restarted the export worker and re-ran the batch".to_string(),
        resolution_date: Utc::now(),
        created_at: Utc::now(),
    };
    client.create_resolution(&resolution).await.unwrap();

    // Second resolution for the same incident hits the uniqueness
    // constraint on incident_code.
    let err = client.create_resolution(&resolution).await.unwrap_err();
    assert!(matches!(err, OntologyError::DuplicateCode { .. }));

    let resolutions = client.resolutions_of(&incident.code).await.unwrap();
    assert_eq!(resolutions.len(), 1);
    assert_eq!(resolutions[0], resolution);

    cleanup(&client, &p).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn incident_against_missing_functionality_writes_nothing() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let p = unique_prefix();

    let incident = make_incident(&format!("{p}I1"), &format!("{p}NOPE"));
    let err = client.create_incident(&incident).await.unwrap_err();
    assert!(matches!(
        err,
        OntologyError::NotFound { code, .. } if code == format!("{p}NOPE")
    ));

    assert!(client.get_incident(&incident.code).await.unwrap().is_none());

    cleanup(&client, &p).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn incidents_reachable_through_product() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let p = unique_prefix();

    let f1 = make_functionality(&format!("{p}F1"), "Reporting");
    let f2 = make_functionality(&format!("{p}F2"), "Accounting");
    client.create_functionality(&f1).await.unwrap();
    client.create_functionality(&f2).await.unwrap();

    let product = make_product(&format!("{p}ERP"), "ERP");
    client
        .create_product(&product, &[f1.code.clone(), f2.code.clone()])
        .await
        .unwrap();

    client
        .create_incident(&make_incident(&format!("{p}I1"), &f1.code))
        .await
        .unwrap();
    client
        .create_incident(&make_incident(&format!("{p}I2"), &f2.code))
        .await
        .unwrap();

    let (incidents, total) = client.incidents_by_product(&product.code, 10, 0).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(incidents.len(), 2);

    cleanup(&client, &p).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn update_and_delete_product() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let p = unique_prefix();

    let product = make_product(&format!("{p}SCM"), "Supply Chain");
    client.create_product(&product, &[]).await.unwrap();

    let patch = prodgraph_core::requests::ProductPatch {
        name: Some("Supply Chain Management".to_string()),
    };
    let updated = client.update_product(&product.code, &patch).await.unwrap();
    assert_eq!(updated.name, "Supply Chain Management");
    assert!(updated.updated_at.is_some());

    client.delete_product(&product.code).await.unwrap();
    assert!(client.get_product(&product.code).await.unwrap().is_none());

    let err = client.delete_product(&product.code).await.unwrap_err();
    assert!(matches!(err, OntologyError::NotFound { .. }));

    cleanup(&client, &p).await;
}
