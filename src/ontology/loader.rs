//! Ontology loader: raw JSON document to in-memory definitions.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{ParseError, Section};
use crate::models::{Ontology, DEFAULT_ONTOLOGY_ID, DEFAULT_ONTOLOGY_VERSION};

/// Top-level document shape. Definitions are kept raw so a bad one can be
/// reported with its position and id.
#[derive(Debug, Deserialize)]
struct RawDocument {
    ontology_id: Option<String>,
    version: Option<String>,
    #[serde(default)]
    entity_types: Vec<String>,
    #[serde(default)]
    struct_types: Vec<String>,
    #[serde(default)]
    entities: Vec<JsonValue>,
    #[serde(default)]
    relations: Vec<JsonValue>,
}

/// Reads and parses an ontology file.
pub fn load_ontology_from_file(path: impl AsRef<Path>) -> Result<Ontology, ParseError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "Read ontology document");
    load_ontology_from_str(&text)
}

/// Parses an ontology from JSON text.
pub fn load_ontology_from_str(text: &str) -> Result<Ontology, ParseError> {
    let value: JsonValue = serde_json::from_str(text).map_err(ParseError::Malformed)?;
    load_ontology_from_value(value)
}

/// Builds an ontology from an already parsed JSON document.
///
/// Missing `ontology_id` and `version` fall back to their defaults; missing
/// lists are empty. Any definition lacking a required field fails the whole
/// document.
pub fn load_ontology_from_value(value: JsonValue) -> Result<Ontology, ParseError> {
    let raw: RawDocument = serde_json::from_value(value).map_err(ParseError::Malformed)?;

    let entities = parse_section(Section::Entities, raw.entities)?;
    let relations = parse_section(Section::Relations, raw.relations)?;

    Ok(Ontology {
        ontology_id: raw
            .ontology_id
            .unwrap_or_else(|| DEFAULT_ONTOLOGY_ID.to_string()),
        version: raw
            .version
            .unwrap_or_else(|| DEFAULT_ONTOLOGY_VERSION.to_string()),
        entity_types: raw.entity_types,
        struct_types: raw.struct_types,
        entities,
        relations,
    })
}

fn parse_section<T: DeserializeOwned>(
    section: Section,
    items: Vec<JsonValue>,
) -> Result<Vec<T>, ParseError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let id = item.get("id").and_then(JsonValue::as_str).map(str::to_string);
            serde_json::from_value(item).map_err(|source| ParseError::Definition {
                section,
                index,
                id,
                source,
            })
        })
        .collect()
}
