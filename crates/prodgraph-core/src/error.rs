use thiserror::Error;

use crate::types::EntityKind;

/// Error taxonomy surfaced to callers of the ontology service.
///
/// Validation and authorization failures are raised before any store call.
/// Store-level failures are translated into this taxonomy at the store
/// boundary; raw backend detail is logged there and never carried here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OntologyError {
    /// Missing, malformed, or expired token. Deliberately carries no
    /// detail so callers cannot probe which check failed.
    #[error("authentication failed")]
    Auth,

    /// One or more required fields missing or invalid. The message is the
    /// same literal for every entity family; `fields` names the offenders.
    #[error("incomplete data")]
    Validation {
        entity: EntityKind,
        fields: Vec<&'static str>,
    },

    /// A referenced entity does not exist.
    #[error("{entity} '{code}' not found")]
    NotFound { entity: EntityKind, code: String },

    /// Uniqueness constraint violated on node creation.
    #[error("{entity} with code '{code}' already exists")]
    DuplicateCode { entity: EntityKind, code: String },

    /// Backing store timeout or connection failure. Retrying is the
    /// caller's decision; the service never retries internally.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Unexpected failure; detail is in the logs, not the message.
    #[error("internal error: {0}")]
    Internal(String),
}

impl OntologyError {
    pub fn not_found(entity: EntityKind, code: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            code: code.into(),
        }
    }

    pub fn duplicate(entity: EntityKind, code: impl Into<String>) -> Self {
        Self::DuplicateCode {
            entity,
            code: code.into(),
        }
    }
}
