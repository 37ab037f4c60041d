//! Ontology definitions as loaded from an external document.

use serde::{Deserialize, Deserializer};

use super::{LogicalEntityType, Metadata, NaturalKey, NewEntity, StructType};

/// Ontology id used when the document does not declare one.
pub const DEFAULT_ONTOLOGY_ID: &str = "knowledge_os_core";

/// Version used when the document does not declare one.
pub const DEFAULT_ONTOLOGY_VERSION: &str = "0.0.0";

/// An ontology as read from its source, before validation.
///
/// Type fields are still open strings here; the validator translates them
/// into the closed vocabularies.
#[derive(Debug, Clone, PartialEq)]
pub struct Ontology {
    pub ontology_id: String,
    pub version: String,
    /// Declared logical category vocabulary.
    pub entity_types: Vec<String>,
    /// Declared structural vocabulary.
    pub struct_types: Vec<String>,
    pub entities: Vec<EntityDef>,
    pub relations: Vec<RelationDef>,
}

/// An entity definition from the `entities` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntityDef {
    pub id: String,
    pub name: String,
    pub struct_type: String,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub domain_entity_type: Option<String>,
    #[serde(default)]
    pub range_entity_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub metadata: Metadata,
}

/// A relation definition from the `relations` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RelationDef {
    pub id: String,
    pub name: String,
    pub struct_type: String,
    pub domain_entity_type: String,
    pub range_entity_type: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub metadata: Metadata,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Metadata, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Metadata>::deserialize(deserializer)?.unwrap_or_default())
}

/// A typed definition that passed validation, ready to be seeded.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySpec {
    /// Definition id from the source document.
    pub def_id: String,
    pub name: String,
    pub struct_type: StructType,
    pub entity_type: Option<LogicalEntityType>,
    pub domain_entity_type: Option<LogicalEntityType>,
    pub range_entity_type: Option<LogicalEntityType>,
    pub metadata: Metadata,
}

impl EntitySpec {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(self.name.clone(), self.struct_type, self.entity_type)
    }

    pub fn to_new_entity(&self) -> NewEntity {
        NewEntity {
            name: self.name.clone(),
            parent_id: None,
            struct_type: self.struct_type,
            entity_type: self.entity_type,
            domain_entity_type: self.domain_entity_type,
            range_entity_type: self.range_entity_type,
            metadata: self.metadata.clone(),
        }
    }
}

/// An ontology whose definitions satisfy every import invariant.
///
/// Only the validator constructs this, so the seeding engine can never be
/// handed unchecked definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOntology {
    ontology_id: String,
    version: String,
    entities: Vec<EntitySpec>,
    relations: Vec<EntitySpec>,
}

impl ValidatedOntology {
    pub(crate) fn new(
        ontology_id: String,
        version: String,
        entities: Vec<EntitySpec>,
        relations: Vec<EntitySpec>,
    ) -> Self {
        Self {
            ontology_id,
            version,
            entities,
            relations,
        }
    }

    pub fn ontology_id(&self) -> &str {
        &self.ontology_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Specs from the `entities` section, in document order.
    pub fn entities(&self) -> &[EntitySpec] {
        &self.entities
    }

    /// Specs from the `relations` section, all of struct_type RELATION.
    pub fn relations(&self) -> &[EntitySpec] {
        &self.relations
    }

    /// Entities followed by relations, the order they are seeded in.
    pub fn specs(&self) -> impl Iterator<Item = &EntitySpec> {
        self.entities.iter().chain(self.relations.iter())
    }
}
