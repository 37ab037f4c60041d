//! Closed type vocabularies every graph node must conform to.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Structural kind of a node in the knowledge graph.
///
/// Relations are themselves nodes: a RELATION entity is what a triple's
/// predicate slot points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructType {
    Canonical,
    Class,
    Relation,
    Instance,
}

impl StructType {
    /// Returns a static slice of all structural kinds.
    pub fn all() -> &'static [StructType] {
        &[
            StructType::Canonical,
            StructType::Class,
            StructType::Relation,
            StructType::Instance,
        ]
    }

    /// Wire and storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            StructType::Canonical => "canonical",
            StructType::Class => "class",
            StructType::Relation => "relation",
            StructType::Instance => "instance",
        }
    }

    pub fn is_relation(&self) -> bool {
        matches!(self, StructType::Relation)
    }
}

impl std::fmt::Display for StructType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StructType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StructType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Invalid struct_type '{}'. Valid values: canonical, class, relation, instance",
                    s
                )
            })
    }
}

/// Logical (semantic) category of a non-relation entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalEntityType {
    Person,
    Organization,
    Place,
    Time,
    Value,
    Document,
    Event,
    Role,
    Unknown,
}

impl LogicalEntityType {
    /// Returns a static slice of all nine logical categories.
    pub fn all() -> &'static [LogicalEntityType] {
        &[
            LogicalEntityType::Person,
            LogicalEntityType::Organization,
            LogicalEntityType::Place,
            LogicalEntityType::Time,
            LogicalEntityType::Value,
            LogicalEntityType::Document,
            LogicalEntityType::Event,
            LogicalEntityType::Role,
            LogicalEntityType::Unknown,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalEntityType::Person => "person",
            LogicalEntityType::Organization => "organization",
            LogicalEntityType::Place => "place",
            LogicalEntityType::Time => "time",
            LogicalEntityType::Value => "value",
            LogicalEntityType::Document => "document",
            LogicalEntityType::Event => "event",
            LogicalEntityType::Role => "role",
            LogicalEntityType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for LogicalEntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicalEntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogicalEntityType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Invalid entity_type '{}'", s))
    }
}
