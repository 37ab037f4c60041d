//! Relationship model: directed subject/predicate/object triples.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Metadata;

/// Name of the store-level triple uniqueness constraint.
pub const TRIPLE_CONSTRAINT: &str = "uq_triple_subject_pred_obj";

/// A stored triple. The predicate references a RELATION entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: i64,
    pub subject_id: i64,
    pub predicate_id: i64,
    pub object_id: i64,
    pub weight: Option<f64>,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

impl Relationship {
    pub fn triple(&self) -> Triple {
        Triple {
            subject_id: self.subject_id,
            predicate_id: self.predicate_id,
            object_id: self.object_id,
        }
    }

    /// Whether this triple touches the entity in any slot.
    pub fn references(&self, entity_id: i64) -> bool {
        self.subject_id == entity_id || self.predicate_id == entity_id || self.object_id == entity_id
    }
}

/// The unique identity of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject_id: i64,
    pub predicate_id: i64,
    pub object_id: i64,
}

impl Triple {
    pub fn new(subject_id: i64, predicate_id: i64, object_id: i64) -> Self {
        Self {
            subject_id,
            predicate_id,
            object_id,
        }
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.subject_id, self.predicate_id, self.object_id)
    }
}

/// Insert payload for a triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRelationship {
    pub triple: Triple,
    pub weight: Option<f64>,
    pub metadata: Metadata,
}

impl NewRelationship {
    pub fn new(triple: Triple) -> Self {
        Self {
            triple,
            weight: None,
            metadata: Metadata::new(),
        }
    }
}
