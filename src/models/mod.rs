//! Domain models for the knowledge graph.

mod entity;
mod ontology;
mod relationship;
mod vocabulary;

pub use entity::{
    signature_is_valid, Entity, Metadata, NaturalKey, NewEntity, NATURAL_KEY_CONSTRAINT,
    SIGNATURE_CONSTRAINT,
};
pub use ontology::{
    EntityDef, EntitySpec, Ontology, RelationDef, ValidatedOntology, DEFAULT_ONTOLOGY_ID,
    DEFAULT_ONTOLOGY_VERSION,
};
pub use relationship::{NewRelationship, Relationship, Triple, TRIPLE_CONSTRAINT};
pub use vocabulary::{LogicalEntityType, StructType};
