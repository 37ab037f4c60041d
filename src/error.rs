//! Application error types.
//!
//! Each stage of the import pipeline has its own error kind; all of them are
//! fatal to the current batch and surface through [`AppError`].

use std::path::PathBuf;

use thiserror::Error;

/// Section of the ontology document a definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Entities,
    Relations,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::Entities => f.write_str("entities"),
            Section::Relations => f.write_str("relations"),
        }
    }
}

/// Malformed document or a definition missing a required field.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read ontology file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed ontology document: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Invalid definition {section}[{index}] (id: {}): {source}", .id.as_deref().unwrap_or("?"))]
    Definition {
        section: Section,
        index: usize,
        id: Option<String>,
        #[source]
        source: serde_json::Error,
    },
}

/// Signature slot of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureField {
    Domain,
    Range,
}

impl std::fmt::Display for SignatureField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignatureField::Domain => f.write_str("domain_entity_type"),
            SignatureField::Range => f.write_str("range_entity_type"),
        }
    }
}

/// An ontology that violates the closed type system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Entity types mismatch. Expected {expected:?}, got {received:?}")]
    EntityTypesMismatch {
        expected: Vec<String>,
        received: Vec<String>,
    },

    #[error("Struct types mismatch. Expected {expected:?}, got {received:?}")]
    StructTypesMismatch {
        expected: Vec<String>,
        received: Vec<String>,
    },

    #[error("Entity {id} has invalid struct_type '{value}'")]
    InvalidStructType { id: String, value: String },

    #[error("Entity {id} with struct_type {struct_type} must have an entity_type")]
    MissingEntityType { id: String, struct_type: String },

    #[error("Entity {id} has entity_type '{value}' which is not in entity_types")]
    InvalidEntityType { id: String, value: String },

    #[error("Entity {id} with struct_type {struct_type} cannot have {field}")]
    ForbiddenSignatureField {
        id: String,
        struct_type: String,
        field: SignatureField,
    },

    #[error("Relation-entity {id} must have entity_type absent, got '{value}'")]
    RelationWithEntityType { id: String, value: String },

    #[error("Relation-entity {id} must have {field}")]
    MissingSignatureField { id: String, field: SignatureField },

    #[error("Relation {id} has {field} '{value}' which is not in entity_types")]
    InvalidSignatureField {
        id: String,
        field: SignatureField,
        value: String,
    },

    #[error("Relation {id} must have struct_type 'relation', got '{value}'")]
    RelationStructType { id: String, value: String },
}

impl ValidationError {
    /// Id of the offending definition; `None` for vocabulary mismatches.
    pub fn definition_id(&self) -> Option<&str> {
        match self {
            ValidationError::EntityTypesMismatch { .. }
            | ValidationError::StructTypesMismatch { .. } => None,
            ValidationError::InvalidStructType { id, .. }
            | ValidationError::MissingEntityType { id, .. }
            | ValidationError::InvalidEntityType { id, .. }
            | ValidationError::ForbiddenSignatureField { id, .. }
            | ValidationError::RelationWithEntityType { id, .. }
            | ValidationError::MissingSignatureField { id, .. }
            | ValidationError::InvalidSignatureField { id, .. }
            | ValidationError::RelationStructType { id, .. } => Some(id),
        }
    }

    /// Short machine-readable name of the violated rule.
    pub fn rule(&self) -> &'static str {
        match self {
            ValidationError::EntityTypesMismatch { .. } => "entity_types_vocabulary",
            ValidationError::StructTypesMismatch { .. } => "struct_types_vocabulary",
            ValidationError::InvalidStructType { .. } => "known_struct_type",
            ValidationError::MissingEntityType { .. } => "entity_type_required",
            ValidationError::InvalidEntityType { .. } => "known_entity_type",
            ValidationError::ForbiddenSignatureField { .. } => "signature_forbidden",
            ValidationError::RelationWithEntityType { .. } => "relation_entity_type_absent",
            ValidationError::MissingSignatureField { .. } => "signature_required",
            ValidationError::InvalidSignatureField { .. } => "known_signature_type",
            ValidationError::RelationStructType { .. } => "relation_struct_type",
        }
    }
}

/// Failures surfaced by a graph store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unique constraint {constraint} violated: {detail}")]
    UniqueViolation { constraint: String, detail: String },

    #[error("Check constraint {constraint} violated: {detail}")]
    CheckViolation { constraint: String, detail: String },

    #[error("Foreign key violated: {0}")]
    ForeignKeyViolation(String),

    #[error("Row not found: {0}")]
    NotFound(String),

    #[error("Store connection error: {0}")]
    Connection(String),

    #[error("Store error: {0}")]
    Backend(String),
}

/// Application-level errors for knowledge-os.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Entity not found: {0}")]
    EntityNotFound(i64),

    #[error("Invalid predicate: entity {predicate_id} has struct_type {struct_type}, expected relation")]
    InvalidPredicate {
        predicate_id: i64,
        struct_type: String,
    },

    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),
}

impl AppError {
    /// Stable code for reporting.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Parse(_) => "PARSE_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Store(StoreError::UniqueViolation { .. })
            | AppError::Store(StoreError::CheckViolation { .. })
            | AppError::Store(StoreError::ForeignKeyViolation(_)) => "CONSTRAINT_VIOLATION",
            AppError::Store(_) => "STORE_ERROR",
            AppError::Config(_) | AppError::MissingConfig(_) => "CONFIG_ERROR",
            AppError::EntityNotFound(_) => "ENTITY_NOT_FOUND",
            AppError::InvalidPredicate { .. } => "INVALID_PREDICATE",
        }
    }
}
