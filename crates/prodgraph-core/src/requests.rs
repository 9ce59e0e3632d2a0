//! Registration request types and field validation.
//!
//! Validation is all-or-nothing: if any required field is missing or
//! malformed the whole request is rejected with a single aggregate
//! [`OntologyError::Validation`] naming every offending field, and nothing
//! reaches the store. String fields are trimmed first; empty-after-trim
//! counts as omitted. A successful `validate()` yields the normalized
//! domain value, so partial registration cannot occur.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::OntologyError;
use crate::types::{
    Component, EntityKind, Functionality, Incident, OwnerKind, Product, Resolution, SlaLevel,
};

pub const MAX_CODE_LEN: usize = 20;
pub const MAX_NAME_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Request to register a product, optionally with functionality
/// assignments created in the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRegistration {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub functionalities: Vec<String>,
}

/// A validated product registration: the node to create plus the
/// normalized, deduplicated functionality codes to assign.
#[derive(Debug, Clone)]
pub struct ValidatedProduct {
    pub product: Product,
    pub functionalities: Vec<String>,
}

impl ProductRegistration {
    pub fn validate(&self) -> Result<ValidatedProduct, OntologyError> {
        let mut fields = Vec::new();
        let code = checked(&self.code, MAX_CODE_LEN, "code", &mut fields);
        let name = checked(&self.name, MAX_NAME_LEN, "name", &mut fields);
        let functionalities = checked_code_list(&self.functionalities, "functionalities", &mut fields);

        if !fields.is_empty() {
            return Err(OntologyError::Validation {
                entity: EntityKind::Product,
                fields,
            });
        }

        Ok(ValidatedProduct {
            product: Product {
                code,
                name,
                created_at: Utc::now(),
                updated_at: None,
            },
            functionalities,
        })
    }
}

/// Request to register a functionality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionalityRegistration {
    pub code: String,
    pub name: String,
}

impl FunctionalityRegistration {
    pub fn validate(&self) -> Result<Functionality, OntologyError> {
        let mut fields = Vec::new();
        let code = checked(&self.code, MAX_CODE_LEN, "code", &mut fields);
        let name = checked(&self.name, MAX_NAME_LEN, "name", &mut fields);

        if !fields.is_empty() {
            return Err(OntologyError::Validation {
                entity: EntityKind::Functionality,
                fields,
            });
        }

        Ok(Functionality {
            code,
            name,
            created_at: Utc::now(),
        })
    }
}

/// Request to register a component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentRegistration {
    pub code: String,
    pub name: String,
}

impl ComponentRegistration {
    pub fn validate(&self) -> Result<Component, OntologyError> {
        let mut fields = Vec::new();
        let code = checked(&self.code, MAX_CODE_LEN, "code", &mut fields);
        let name = checked(&self.name, MAX_NAME_LEN, "name", &mut fields);

        if !fields.is_empty() {
            return Err(OntologyError::Validation {
                entity: EntityKind::Component,
                fields,
            });
        }

        Ok(Component {
            code,
            name,
            created_at: Utc::now(),
        })
    }
}

/// Request to register an incident against a functionality.
///
/// `sla_level` arrives as its wire string; values outside the closed set
/// fail validation exactly like a missing field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentRegistration {
    pub code: String,
    pub description: String,
    pub sla_level: String,
    pub functionality_code: String,
}

impl IncidentRegistration {
    pub fn validate(&self) -> Result<Incident, OntologyError> {
        let mut fields = Vec::new();
        let code = checked(&self.code, MAX_CODE_LEN, "code", &mut fields);
        let description = checked(&self.description, MAX_DESCRIPTION_LEN, "description", &mut fields);
        let functionality_code =
            checked(&self.functionality_code, MAX_CODE_LEN, "functionality_code", &mut fields);

        let sla_level = match SlaLevel::parse(self.sla_level.trim()) {
            Some(level) => level,
            None => {
                fields.push("sla_level");
                SlaLevel::Low
            }
        };

        if !fields.is_empty() {
            return Err(OntologyError::Validation {
                entity: EntityKind::Incident,
                fields,
            });
        }

        Ok(Incident {
            code,
            description,
            sla_level,
            functionality_code,
            created_at: Utc::now(),
        })
    }
}

/// Request to record a resolution for an incident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionRegistration {
    pub incident_code: String,
    pub procedure: String,
    /// RFC 3339 timestamp of when the incident was resolved.
    pub resolution_date: String,
}

impl ResolutionRegistration {
    pub fn validate(&self) -> Result<Resolution, OntologyError> {
        let mut fields = Vec::new();
        let incident_code = checked(&self.incident_code, MAX_CODE_LEN, "incident_code", &mut fields);

        let procedure = self.procedure.trim().to_string();
        if procedure.is_empty() {
            fields.push("procedure");
        }

        let resolution_date = match parse_rfc3339(self.resolution_date.trim()) {
            Some(dt) => dt,
            None => {
                fields.push("resolution_date");
                Utc::now()
            }
        };

        if !fields.is_empty() {
            return Err(OntologyError::Validation {
                entity: EntityKind::Resolution,
                fields,
            });
        }

        Ok(Resolution {
            incident_code,
            procedure,
            resolution_date,
            created_at: Utc::now(),
        })
    }
}

/// Partial update to a product's mutable attributes. The code is the
/// product's identity and cannot be patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
}

impl ProductPatch {
    /// An empty patch (nothing to update) is a validation error.
    pub fn validate(&self) -> Result<ProductPatch, OntologyError> {
        let name = self.name.as_deref().map(str::trim).filter(|s| !s.is_empty());

        match name {
            Some(name) if name.chars().count() <= MAX_NAME_LEN => Ok(ProductPatch {
                name: Some(name.to_string()),
            }),
            _ => Err(OntologyError::Validation {
                entity: EntityKind::Product,
                fields: vec!["name"],
            }),
        }
    }
}

/// Request to assign functionalities to a product or component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRequest {
    pub owner: OwnerKind,
    pub owner_code: String,
    pub functionality_codes: Vec<String>,
}

/// Normalized assignment request.
#[derive(Debug, Clone)]
pub struct ValidatedAssignment {
    pub owner: OwnerKind,
    pub owner_code: String,
    pub functionality_codes: Vec<String>,
}

impl AssignmentRequest {
    pub fn validate(&self) -> Result<ValidatedAssignment, OntologyError> {
        let mut fields = Vec::new();
        let owner_code = checked(&self.owner_code, MAX_CODE_LEN, "owner_code", &mut fields);
        let functionality_codes =
            checked_code_list(&self.functionality_codes, "functionality_codes", &mut fields);

        if functionality_codes.is_empty() && !fields.contains(&"functionality_codes") {
            fields.push("functionality_codes");
        }

        if !fields.is_empty() {
            return Err(OntologyError::Validation {
                entity: self.owner.entity(),
                fields,
            });
        }

        Ok(ValidatedAssignment {
            owner: self.owner,
            owner_code,
            functionality_codes,
        })
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Trim and bound-check a required string field, recording the field name
/// on failure. Lengths are counted in characters, not bytes.
fn checked(
    raw: &str,
    max_len: usize,
    field: &'static str,
    fields: &mut Vec<&'static str>,
) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().count() > max_len {
        fields.push(field);
    }
    trimmed.to_string()
}

/// Normalize a code list: trim, reject empty or oversized entries,
/// deduplicate preserving first-seen order.
fn checked_code_list(
    raw: &[String],
    field: &'static str,
    fields: &mut Vec<&'static str>,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for code in raw {
        let trimmed = code.trim();
        if trimmed.is_empty() || trimmed.chars().count() > MAX_CODE_LEN {
            if !fields.contains(&field) {
                fields.push(field);
            }
            continue;
        }
        if !out.iter().any(|c| c == trimmed) {
            out.push(trimmed.to_string());
        }
    }
    out
}

fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
