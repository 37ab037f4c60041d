//! Entity model representing nodes in the knowledge graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::{LogicalEntityType, StructType};

/// Opaque per-row metadata.
pub type Metadata = Map<String, JsonValue>;

/// Name of the store-level constraint guarding the relation signature fields.
pub const SIGNATURE_CONSTRAINT: &str = "ck_entity_relation_signature_fields";

/// Name of the store-level natural key constraint.
pub const NATURAL_KEY_CONSTRAINT: &str = "uq_entity_name_struct_type_entity_type";

/// Mutually exclusive signature rule shared by every stored row.
///
/// RELATION rows carry a domain and range and no entity_type; every other
/// struct_type carries neither domain nor range.
pub fn signature_is_valid(
    struct_type: StructType,
    entity_type: Option<LogicalEntityType>,
    domain: Option<LogicalEntityType>,
    range: Option<LogicalEntityType>,
) -> bool {
    if struct_type.is_relation() {
        entity_type.is_none() && domain.is_some() && range.is_some()
    } else {
        domain.is_none() && range.is_none()
    }
}

/// Identity used for upserts, independent of the generated id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NaturalKey {
    pub name: String,
    pub struct_type: StructType,
    pub entity_type: Option<LogicalEntityType>,
}

impl NaturalKey {
    pub fn new(
        name: impl Into<String>,
        struct_type: StructType,
        entity_type: Option<LogicalEntityType>,
    ) -> Self {
        Self {
            name: name.into(),
            struct_type,
            entity_type,
        }
    }

    /// Key of a relation node: `(name, RELATION, ∅)`.
    pub fn relation(name: impl Into<String>) -> Self {
        Self::new(name, StructType::Relation, None)
    }
}

impl std::fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.entity_type {
            Some(t) => write!(f, "({}, {}, {})", self.name, self.struct_type, t),
            None => write!(f, "({}, {}, null)", self.name, self.struct_type),
        }
    }
}

/// A stored entity: a node of the knowledge graph.
///
/// Entities and relations share this one record type, discriminated by
/// `struct_type`, so lookups and upserts are uniform across both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Generated identifier.
    pub id: i64,
    /// Name, unique within its (struct_type, entity_type) slot.
    pub name: String,
    /// Parent in the entity hierarchy.
    pub parent_id: Option<i64>,
    pub struct_type: StructType,
    /// Logical category; absent for RELATION rows.
    pub entity_type: Option<LogicalEntityType>,
    /// Domain of a relation signature.
    pub domain_entity_type: Option<LogicalEntityType>,
    /// Range of a relation signature.
    pub range_entity_type: Option<LogicalEntityType>,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(self.name.clone(), self.struct_type, self.entity_type)
    }

    pub fn has_valid_signature(&self) -> bool {
        signature_is_valid(
            self.struct_type,
            self.entity_type,
            self.domain_entity_type,
            self.range_entity_type,
        )
    }

    /// Builds a stored row from an insert payload.
    pub fn from_new(id: i64, new: NewEntity, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            parent_id: new.parent_id,
            struct_type: new.struct_type,
            entity_type: new.entity_type,
            domain_entity_type: new.domain_entity_type,
            range_entity_type: new.range_entity_type,
            metadata: new.metadata,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Insert payload for an entity row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntity {
    pub name: String,
    pub parent_id: Option<i64>,
    pub struct_type: StructType,
    pub entity_type: Option<LogicalEntityType>,
    pub domain_entity_type: Option<LogicalEntityType>,
    pub range_entity_type: Option<LogicalEntityType>,
    pub metadata: Metadata,
}

impl NewEntity {
    /// A CANONICAL, CLASS or INSTANCE node of the given category.
    pub fn node(name: impl Into<String>, struct_type: StructType, entity_type: LogicalEntityType) -> Self {
        Self {
            name: name.into(),
            parent_id: None,
            struct_type,
            entity_type: Some(entity_type),
            domain_entity_type: None,
            range_entity_type: None,
            metadata: Metadata::new(),
        }
    }

    /// A RELATION node with the given signature.
    pub fn relation(
        name: impl Into<String>,
        domain: LogicalEntityType,
        range: LogicalEntityType,
    ) -> Self {
        Self {
            name: name.into(),
            parent_id: None,
            struct_type: StructType::Relation,
            entity_type: None,
            domain_entity_type: Some(domain),
            range_entity_type: Some(range),
            metadata: Metadata::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(self.name.clone(), self.struct_type, self.entity_type)
    }

    pub fn has_valid_signature(&self) -> bool {
        signature_is_valid(
            self.struct_type,
            self.entity_type,
            self.domain_entity_type,
            self.range_entity_type,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogicalEntityType::*;

    #[test]
    fn test_instance_without_signature_is_valid() {
        let e = NewEntity::node("Socrates", StructType::Instance, Person);
        assert!(e.has_valid_signature());
    }

    #[test]
    fn test_relation_with_signature_is_valid() {
        let r = NewEntity::relation("bornIn", Person, Place);
        assert!(r.has_valid_signature());
        assert_eq!(r.natural_key(), NaturalKey::relation("bornIn"));
    }

    #[test]
    fn test_relation_with_entity_type_is_invalid() {
        assert!(!signature_is_valid(
            StructType::Relation,
            Some(Person),
            Some(Place),
            Some(Place)
        ));
    }

    #[test]
    fn test_relation_missing_range_is_invalid() {
        assert!(!signature_is_valid(StructType::Relation, None, Some(Person), None));
    }

    #[test]
    fn test_class_with_domain_is_invalid() {
        assert!(!signature_is_valid(StructType::Class, Some(Event), Some(Person), None));
    }

    #[test]
    fn test_natural_key_display() {
        assert_eq!(
            NaturalKey::new("Athens", StructType::Instance, Some(Place)).to_string(),
            "(Athens, instance, place)"
        );
        assert_eq!(NaturalKey::relation("bornIn").to_string(), "(bornIn, relation, null)");
    }
}
