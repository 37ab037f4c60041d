//! Ontology validator.
//!
//! Checks a loaded [`Ontology`] against the closed type system and turns its
//! open string fields into typed [`EntitySpec`]s. Pure: no store access.
//!
//! Checks run in a fixed order and stop at the first violation:
//!
//! 1. declared `entity_types` equal the logical vocabulary
//! 2. declared `struct_types` equal the structural vocabulary
//! 3. every entity definition, in document order
//! 4. every relation definition, in document order

use std::collections::BTreeSet;

use crate::error::{SignatureField, ValidationError};
use crate::models::{
    EntityDef, EntitySpec, LogicalEntityType, Ontology, RelationDef, StructType,
    ValidatedOntology,
};

/// Validates an ontology and returns its typed form.
pub fn validate(ontology: &Ontology) -> Result<ValidatedOntology, ValidationError> {
    check_vocabulary(
        &ontology.entity_types,
        LogicalEntityType::all().iter().map(|t| t.as_str()),
        |expected, received| ValidationError::EntityTypesMismatch { expected, received },
    )?;
    check_vocabulary(
        &ontology.struct_types,
        StructType::all().iter().map(|t| t.as_str()),
        |expected, received| ValidationError::StructTypesMismatch { expected, received },
    )?;

    let entities = ontology
        .entities
        .iter()
        .map(validate_entity)
        .collect::<Result<Vec<_>, _>>()?;
    let relations = ontology
        .relations
        .iter()
        .map(validate_relation)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValidatedOntology::new(
        ontology.ontology_id.clone(),
        ontology.version.clone(),
        entities,
        relations,
    ))
}

/// Validates an ontology, discarding the typed form.
pub fn validate_ontology(ontology: &Ontology) -> Result<(), ValidationError> {
    validate(ontology).map(|_| ())
}

fn check_vocabulary<'a>(
    declared: &[String],
    known: impl Iterator<Item = &'a str>,
    mismatch: impl FnOnce(Vec<String>, Vec<String>) -> ValidationError,
) -> Result<(), ValidationError> {
    let expected: BTreeSet<&str> = known.collect();
    let received: BTreeSet<&str> = declared.iter().map(String::as_str).collect();

    if expected == received {
        return Ok(());
    }
    Err(mismatch(
        expected.into_iter().map(str::to_string).collect(),
        received.into_iter().map(str::to_string).collect(),
    ))
}

fn validate_entity(def: &EntityDef) -> Result<EntitySpec, ValidationError> {
    let struct_type: StructType =
        def.struct_type
            .parse()
            .map_err(|_| ValidationError::InvalidStructType {
                id: def.id.clone(),
                value: def.struct_type.clone(),
            })?;

    let (entity_type, domain, range) = if struct_type.is_relation() {
        if let Some(value) = &def.entity_type {
            return Err(ValidationError::RelationWithEntityType {
                id: def.id.clone(),
                value: value.clone(),
            });
        }
        let domain = required_signature(&def.id, SignatureField::Domain, &def.domain_entity_type)?;
        let range = required_signature(&def.id, SignatureField::Range, &def.range_entity_type)?;
        (None, Some(domain), Some(range))
    } else {
        let value = def
            .entity_type
            .as_deref()
            .ok_or_else(|| ValidationError::MissingEntityType {
                id: def.id.clone(),
                struct_type: struct_type.to_string(),
            })?;
        let entity_type: LogicalEntityType =
            value.parse().map_err(|_| ValidationError::InvalidEntityType {
                id: def.id.clone(),
                value: value.to_string(),
            })?;

        for (field, present) in [
            (SignatureField::Domain, &def.domain_entity_type),
            (SignatureField::Range, &def.range_entity_type),
        ] {
            if present.is_some() {
                return Err(ValidationError::ForbiddenSignatureField {
                    id: def.id.clone(),
                    struct_type: struct_type.to_string(),
                    field,
                });
            }
        }
        (Some(entity_type), None, None)
    };

    Ok(EntitySpec {
        def_id: def.id.clone(),
        name: def.name.clone(),
        struct_type,
        entity_type,
        domain_entity_type: domain,
        range_entity_type: range,
        metadata: def.metadata.clone(),
    })
}

fn validate_relation(def: &RelationDef) -> Result<EntitySpec, ValidationError> {
    if def.struct_type != StructType::Relation.as_str() {
        return Err(ValidationError::RelationStructType {
            id: def.id.clone(),
            value: def.struct_type.clone(),
        });
    }

    let domain = signature_type(&def.id, SignatureField::Domain, &def.domain_entity_type)?;
    let range = signature_type(&def.id, SignatureField::Range, &def.range_entity_type)?;

    Ok(EntitySpec {
        def_id: def.id.clone(),
        name: def.name.clone(),
        struct_type: StructType::Relation,
        entity_type: None,
        domain_entity_type: Some(domain),
        range_entity_type: Some(range),
        metadata: def.metadata.clone(),
    })
}

fn required_signature(
    id: &str,
    field: SignatureField,
    value: &Option<String>,
) -> Result<LogicalEntityType, ValidationError> {
    let value = value
        .as_deref()
        .ok_or_else(|| ValidationError::MissingSignatureField {
            id: id.to_string(),
            field,
        })?;
    signature_type(id, field, value)
}

fn signature_type(
    id: &str,
    field: SignatureField,
    value: &str,
) -> Result<LogicalEntityType, ValidationError> {
    value
        .parse()
        .map_err(|_| ValidationError::InvalidSignatureField {
            id: id.to_string(),
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metadata;

    fn vocab_entity_types() -> Vec<String> {
        LogicalEntityType::all()
            .iter()
            .map(|t| t.as_str().to_string())
            .collect()
    }

    fn vocab_struct_types() -> Vec<String> {
        StructType::all()
            .iter()
            .map(|t| t.as_str().to_string())
            .collect()
    }

    fn ontology(entities: Vec<EntityDef>, relations: Vec<RelationDef>) -> Ontology {
        Ontology {
            ontology_id: "test".to_string(),
            version: "1.0.0".to_string(),
            entity_types: vocab_entity_types(),
            struct_types: vocab_struct_types(),
            entities,
            relations,
        }
    }

    fn entity(id: &str, name: &str, struct_type: &str, entity_type: Option<&str>) -> EntityDef {
        EntityDef {
            id: id.to_string(),
            name: name.to_string(),
            struct_type: struct_type.to_string(),
            entity_type: entity_type.map(str::to_string),
            domain_entity_type: None,
            range_entity_type: None,
            metadata: Metadata::new(),
        }
    }

    fn relation(id: &str, name: &str, domain: &str, range: &str) -> RelationDef {
        RelationDef {
            id: id.to_string(),
            name: name.to_string(),
            struct_type: "relation".to_string(),
            domain_entity_type: domain.to_string(),
            range_entity_type: range.to_string(),
            metadata: Metadata::new(),
        }
    }

    #[test]
    fn test_scenario_a_valid() {
        let onto = ontology(
            vec![entity("e1", "Socrates", "instance", Some("person"))],
            vec![relation("r1", "bornIn", "person", "place")],
        );

        let validated = validate(&onto).unwrap();
        assert_eq!(validated.ontology_id(), "test");
        assert_eq!(validated.specs().count(), 2);

        let socrates = &validated.entities()[0];
        assert_eq!(socrates.struct_type, StructType::Instance);
        assert_eq!(socrates.entity_type, Some(LogicalEntityType::Person));

        let born_in = &validated.relations()[0];
        assert_eq!(born_in.struct_type, StructType::Relation);
        assert_eq!(born_in.entity_type, None);
        assert_eq!(born_in.domain_entity_type, Some(LogicalEntityType::Person));
        assert_eq!(born_in.range_entity_type, Some(LogicalEntityType::Place));
    }

    #[test]
    fn test_scenario_b_relation_entity_with_entity_type() {
        let mut def = entity("e9", "bornIn", "relation", Some("person"));
        def.domain_entity_type = Some("place".to_string());
        def.range_entity_type = Some("place".to_string());

        let err = validate(&ontology(vec![def], vec![])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::RelationWithEntityType {
                id: "e9".to_string(),
                value: "person".to_string(),
            }
        );
        assert!(err.to_string().contains("must have entity_type absent"));
    }

    #[test]
    fn test_scenario_c_missing_event_rejected_before_definitions() {
        let mut onto = ontology(
            // Would fail rule 3 if it were inspected.
            vec![entity("bad", "X", "nope", None)],
            vec![],
        );
        onto.entity_types.retain(|t| t != "event");

        let err = validate(&onto).unwrap_err();
        match &err {
            ValidationError::EntityTypesMismatch { expected, received } => {
                assert_eq!(expected.len(), 9);
                assert!(expected.contains(&"event".to_string()));
                assert_eq!(received.len(), 8);
                assert!(!received.contains(&"event".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.definition_id(), None);
    }

    #[test]
    fn test_superset_vocabulary_rejected() {
        let mut onto = ontology(vec![], vec![]);
        onto.entity_types.push("animal".to_string());
        assert!(matches!(
            validate(&onto),
            Err(ValidationError::EntityTypesMismatch { .. })
        ));
    }

    #[test]
    fn test_duplicates_and_order_in_vocabulary_accepted() {
        let mut onto = ontology(vec![], vec![]);
        onto.entity_types.reverse();
        onto.entity_types.push("person".to_string());
        onto.struct_types.reverse();
        assert!(validate(&onto).is_ok());
    }

    #[test]
    fn test_struct_types_mismatch() {
        let mut onto = ontology(vec![], vec![]);
        onto.struct_types.retain(|t| t != "canonical");
        let err = validate(&onto).unwrap_err();
        assert_eq!(err.rule(), "struct_types_vocabulary");
    }

    #[test]
    fn test_unknown_struct_type() {
        let err = validate(&ontology(vec![entity("e1", "X", "Instance", Some("person"))], vec![]))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidStructType {
                id: "e1".to_string(),
                value: "Instance".to_string(),
            }
        );
    }

    #[test]
    fn test_class_requires_entity_type() {
        let err = validate(&ontology(vec![entity("e1", "City", "class", None)], vec![]))
            .unwrap_err();
        assert_eq!(err.rule(), "entity_type_required");
        assert_eq!(err.definition_id(), Some("e1"));
    }

    #[test]
    fn test_unknown_entity_type() {
        let err = validate(&ontology(
            vec![entity("e1", "Fido", "instance", Some("animal"))],
            vec![],
        ))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidEntityType {
                id: "e1".to_string(),
                value: "animal".to_string(),
            }
        );
    }

    #[test]
    fn test_canonical_with_range_forbidden() {
        let mut def = entity("e1", "Earth", "canonical", Some("place"));
        def.range_entity_type = Some("place".to_string());

        let err = validate(&ontology(vec![def], vec![])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ForbiddenSignatureField {
                id: "e1".to_string(),
                struct_type: "canonical".to_string(),
                field: SignatureField::Range,
            }
        );
    }

    #[test]
    fn test_relation_entity_missing_domain() {
        let mut def = entity("e1", "knows", "relation", None);
        def.range_entity_type = Some("person".to_string());

        let err = validate(&ontology(vec![def], vec![])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingSignatureField {
                id: "e1".to_string(),
                field: SignatureField::Domain,
            }
        );
    }

    #[test]
    fn test_relation_entity_is_typed_as_relation() {
        let mut def = entity("e1", "knows", "relation", None);
        def.domain_entity_type = Some("person".to_string());
        def.range_entity_type = Some("person".to_string());

        let validated = validate(&ontology(vec![def], vec![])).unwrap();
        let spec = &validated.entities()[0];
        assert_eq!(spec.struct_type, StructType::Relation);
        assert_eq!(spec.entity_type, None);
    }

    #[test]
    fn test_relation_section_requires_relation_struct_type() {
        let mut def = relation("r1", "bornIn", "person", "place");
        def.struct_type = "class".to_string();

        let err = validate(&ontology(vec![], vec![def])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::RelationStructType {
                id: "r1".to_string(),
                value: "class".to_string(),
            }
        );
    }

    #[test]
    fn test_relation_with_unknown_range() {
        let err = validate(&ontology(vec![], vec![relation("r1", "bornIn", "person", "planet")]))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidSignatureField {
                id: "r1".to_string(),
                field: SignatureField::Range,
                value: "planet".to_string(),
            }
        );
    }

    #[test]
    fn test_first_violation_wins() {
        let err = validate(&ontology(
            vec![
                entity("e1", "A", "instance", None),
                entity("e2", "B", "bogus", None),
            ],
            vec![relation("r1", "x", "nope", "nope")],
        ))
        .unwrap_err();
        assert_eq!(err.definition_id(), Some("e1"));
    }

    #[test]
    fn test_validate_ontology_unit_result() {
        assert!(validate_ontology(&ontology(vec![], vec![])).is_ok());
    }
}
