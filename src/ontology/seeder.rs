//! Seeding engine: merges a validated ontology into the graph store.

use std::path::Path;

use serde::Serialize;
use tracing::Instrument;

use crate::error::{AppError, StoreError};
use crate::models::{Entity, EntitySpec, ValidatedOntology};
use crate::ontology::{load_ontology_from_file, validate};
use crate::store::{EntityStore, StoreClient, Transaction};

/// Outcome of one import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub ontology_id: String,
    pub version: String,
    /// Rows created by this import.
    pub inserted: usize,
    /// Existing rows whose mutable projection changed.
    pub updated: usize,
    /// Existing rows left untouched.
    pub unchanged: usize,
}

impl SeedReport {
    /// Number of definitions processed.
    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.unchanged
    }
}

/// What happened to a single definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Upsert {
    Inserted,
    Updated,
    Unchanged,
}

/// Merges the ontology into the store in one transaction.
///
/// Entities are upserted first, then relations, each by natural key. The
/// transaction is committed once at the end; on any error it is rolled back
/// and nothing is applied.
pub async fn seed_ontology<C>(
    client: &C,
    ontology: &ValidatedOntology,
) -> Result<SeedReport, StoreError>
where
    C: StoreClient,
{
    let span = tracing::info_span!(
        "seed_ontology",
        ontology_id = %ontology.ontology_id(),
        version = %ontology.version()
    );

    async move {
        let mut report = SeedReport {
            ontology_id: ontology.ontology_id().to_string(),
            version: ontology.version().to_string(),
            ..Default::default()
        };

        let txn = client.begin().await?;
        match upsert_all(&txn, ontology, &mut report).await {
            Ok(()) => txn.commit().await?,
            Err(e) => {
                tracing::error!("Ontology import failed, rolling back: {}", e);
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::warn!(error = %rollback_err, "Rollback failed");
                }
                return Err(e);
            }
        }

        tracing::info!(
            inserted = report.inserted,
            updated = report.updated,
            unchanged = report.unchanged,
            "Ontology seeded"
        );
        Ok(report)
    }
    .instrument(span)
    .await
}

/// Loads, validates and seeds the ontology at `path`.
pub async fn seed_from_path<C>(client: &C, path: impl AsRef<Path>) -> Result<SeedReport, AppError>
where
    C: StoreClient,
{
    let ontology = load_ontology_from_file(path)?;
    let validated = validate(&ontology)?;
    Ok(seed_ontology(client, &validated).await?)
}

async fn upsert_all<T>(
    txn: &T,
    ontology: &ValidatedOntology,
    report: &mut SeedReport,
) -> Result<(), StoreError>
where
    T: EntityStore,
{
    for spec in ontology.specs() {
        match upsert(txn, spec).await? {
            Upsert::Inserted => report.inserted += 1,
            Upsert::Updated => report.updated += 1,
            Upsert::Unchanged => report.unchanged += 1,
        }
    }
    Ok(())
}

async fn upsert<T>(txn: &T, spec: &EntitySpec) -> Result<Upsert, StoreError>
where
    T: EntityStore,
{
    let key = spec.natural_key();

    let Some(existing) = txn.find_by_natural_key(&key).await? else {
        let row = txn.insert(spec.to_new_entity()).await?;
        tracing::debug!(def_id = %spec.def_id, id = row.id, key = %key, "Inserted");
        return Ok(Upsert::Inserted);
    };

    if !projection_differs(&existing, spec) {
        tracing::debug!(def_id = %spec.def_id, id = existing.id, key = %key, "Unchanged");
        return Ok(Upsert::Unchanged);
    }

    let changed = Entity {
        domain_entity_type: spec.domain_entity_type,
        range_entity_type: spec.range_entity_type,
        metadata: spec.metadata.clone(),
        ..existing
    };
    let row = txn.update(&changed).await?;
    tracing::debug!(def_id = %spec.def_id, id = row.id, key = %key, "Updated");
    Ok(Upsert::Updated)
}

/// Whether the stored mutable projection differs from the definition.
fn projection_differs(existing: &Entity, spec: &EntitySpec) -> bool {
    existing.domain_entity_type != spec.domain_entity_type
        || existing.range_entity_type != spec.range_entity_type
        || existing.metadata != spec.metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LogicalEntityType, NewEntity, StructType};
    use serde_json::json;

    fn spec(name: &str, meta: serde_json::Value) -> EntitySpec {
        EntitySpec {
            def_id: "e1".to_string(),
            name: name.to_string(),
            struct_type: StructType::Instance,
            entity_type: Some(LogicalEntityType::Person),
            domain_entity_type: None,
            range_entity_type: None,
            metadata: meta.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_projection_compares_metadata() {
        let row = Entity::from_new(
            1,
            NewEntity::node("Socrates", StructType::Instance, LogicalEntityType::Person)
                .with_metadata(json!({"era": "classical"}).as_object().cloned().unwrap()),
            chrono::Utc::now(),
        );

        assert!(!projection_differs(&row, &spec("Socrates", json!({"era": "classical"}))));
        assert!(projection_differs(&row, &spec("Socrates", json!({"era": "archaic"}))));
    }

    #[test]
    fn test_report_total() {
        let report = SeedReport {
            inserted: 2,
            updated: 1,
            unchanged: 4,
            ..Default::default()
        };
        assert_eq!(report.total(), 7);
    }

    #[test]
    fn test_report_serializes_counts() {
        let report = SeedReport {
            ontology_id: "knowledge_os_core".to_string(),
            version: "1.0.0".to_string(),
            inserted: 11,
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "ontology_id": "knowledge_os_core",
                "version": "1.0.0",
                "inserted": 11,
                "updated": 0,
                "unchanged": 0,
            })
        );
    }
}
