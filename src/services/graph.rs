//! Graph service: triple creation and subtree removal.

use crate::error::AppError;
use crate::models::{Metadata, NewRelationship, Relationship, StructType, Triple};
use crate::store::{EntityStore, RelationshipStore, StoreClient, Transaction};

/// Links `subject` to `object` through the relation entity `predicate`.
///
/// All three entities must exist and the predicate must have struct_type
/// RELATION. Linking an existing triple returns the stored row unchanged.
pub async fn link<T>(
    txn: &T,
    triple: Triple,
    weight: Option<f64>,
    metadata: Metadata,
) -> Result<Relationship, AppError>
where
    T: EntityStore + RelationshipStore,
{
    let predicate = txn
        .find_by_id(triple.predicate_id)
        .await?
        .ok_or(AppError::EntityNotFound(triple.predicate_id))?;
    if predicate.struct_type != StructType::Relation {
        return Err(AppError::InvalidPredicate {
            predicate_id: predicate.id,
            struct_type: predicate.struct_type.to_string(),
        });
    }

    for id in [triple.subject_id, triple.object_id] {
        if txn.find_by_id(id).await?.is_none() {
            return Err(AppError::EntityNotFound(id));
        }
    }

    if let Some(existing) = txn.find_triple(triple).await? {
        tracing::debug!(%triple, id = existing.id, "Triple already linked");
        return Ok(existing);
    }

    let row = txn
        .insert_triple(NewRelationship {
            triple,
            weight,
            metadata,
        })
        .await?;
    tracing::debug!(%triple, id = row.id, predicate = %predicate.name, "Linked");
    Ok(row)
}

/// Removes an entity together with its whole subtree and every triple that
/// references a removed entity. Returns the number of entities removed.
pub async fn remove_entity<T>(txn: &T, id: i64) -> Result<usize, AppError>
where
    T: EntityStore,
{
    if txn.find_by_id(id).await?.is_none() {
        return Err(AppError::EntityNotFound(id));
    }
    let removed = txn.delete_subtree(id).await?;
    tracing::debug!(id, removed, "Removed entity subtree");
    Ok(removed)
}

/// Runs graph operations against a store, one transaction per call.
#[derive(Clone)]
pub struct GraphService<C> {
    client: C,
}

impl<C: StoreClient> GraphService<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// [`link`] in its own transaction.
    pub async fn link(
        &self,
        triple: Triple,
        weight: Option<f64>,
        metadata: Metadata,
    ) -> Result<Relationship, AppError> {
        let txn = self.client.begin().await?;
        match link(&txn, triple, weight, metadata).await {
            Ok(row) => {
                txn.commit().await?;
                Ok(row)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::warn!(error = %rollback_err, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    /// [`remove_entity`] in its own transaction.
    pub async fn remove_entity(&self, id: i64) -> Result<usize, AppError> {
        let txn = self.client.begin().await?;
        match remove_entity(&txn, id).await {
            Ok(removed) => {
                txn.commit().await?;
                Ok(removed)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::warn!(error = %rollback_err, "Rollback failed");
                }
                Err(e)
            }
        }
    }
}
