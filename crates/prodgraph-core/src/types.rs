//! Core domain types for the prodgraph ontology.
//!
//! These types represent nodes in the product knowledge graph. Every entity
//! is identified by a short alphanumeric `code`; the code is fixed at
//! creation and never changes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Entities ──────────────────────────────────────────────────────

/// A sellable product that provides one or more functionalities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A business functionality assignable to products and components.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Functionality {
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A technical component that implements functionalities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Component {
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// An incident reported against a functionality.
///
/// The owning functionality is fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Incident {
    pub code: String,
    pub description: String,
    pub sla_level: SlaLevel,
    pub functionality_code: String,
    pub created_at: DateTime<Utc>,
}

/// A resolution procedure recorded for an incident.
///
/// Keyed by `incident_code`: at most one resolution record per incident.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resolution {
    pub incident_code: String,
    pub procedure: String,
    pub resolution_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A product together with its assigned functionalities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetails {
    pub product: Product,
    pub functionalities: Vec<Functionality>,
}

/// A component together with its assigned functionalities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDetails {
    pub component: Component,
    pub functionalities: Vec<Functionality>,
}

/// A functionality together with the products that provide it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionalityDetails {
    pub functionality: Functionality,
    pub products: Vec<Product>,
}

// ── Enums ─────────────────────────────────────────────────────────

/// Closed-set SLA priority classification for incidents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SlaLevel {
    #[serde(rename = "SLA_CRITICAL")]
    Critical,
    #[serde(rename = "SLA_HIGH")]
    High,
    #[serde(rename = "SLA_MEDIUM")]
    Medium,
    #[serde(rename = "SLA_LOW")]
    Low,
}

impl SlaLevel {
    /// Parse the wire representation; `None` for anything outside the set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SLA_CRITICAL" => Some(Self::Critical),
            "SLA_HIGH" => Some(Self::High),
            "SLA_MEDIUM" => Some(Self::Medium),
            "SLA_LOW" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "SLA_CRITICAL",
            Self::High => "SLA_HIGH",
            Self::Medium => "SLA_MEDIUM",
            Self::Low => "SLA_LOW",
        }
    }
}

impl fmt::Display for SlaLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The entity families of the ontology.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Product,
    Functionality,
    Component,
    Incident,
    Resolution,
}

impl EntityKind {
    /// Graph node label for this entity family.
    pub fn label(self) -> &'static str {
        match self {
            Self::Product => "Product",
            Self::Functionality => "Functionality",
            Self::Component => "Component",
            Self::Incident => "Incident",
            Self::Resolution => "Resolution",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Entities that can own Assignment edges to functionalities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    Product,
    Component,
}

impl OwnerKind {
    pub fn entity(self) -> EntityKind {
        match self {
            Self::Product => EntityKind::Product,
            Self::Component => EntityKind::Component,
        }
    }

    pub fn label(self) -> &'static str {
        self.entity().label()
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Operation results ─────────────────────────────────────────────

/// Outcome of an idempotent functionality assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentResult {
    pub owner: OwnerKind,
    pub owner_code: String,
    /// Codes now assigned to the owner, whether the edge was created by
    /// this call or already existed.
    pub assigned: Vec<String>,
}

/// One page of an offset-paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, offset: u32) -> Self {
        let has_more = (offset as u64).saturating_add(items.len() as u64) < total;
        Self {
            items,
            total,
            has_more,
        }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            has_more: false,
        }
    }
}
