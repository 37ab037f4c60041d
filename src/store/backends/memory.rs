//! In-memory graph store backend.
//!
//! Entities live in an indexed table keyed by id; parent links point back
//! into the same table. Every transaction works on a private copy of the
//! committed tables and records the operations it staged. Commit replays
//! those operations against the latest committed state under a lock,
//! re-checking every constraint, and swaps the result in only if all of
//! them pass. A conflicting concurrent commit therefore fails the whole
//! batch at commit time, like a database constraint would.
//!
//! # Example
//!
//! ```ignore
//! use knowledge_os::store::backends::memory::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let report = seed_from_path(&store, "ontology/knowledge_os_core.json").await?;
//! assert_eq!(store.entities()?.len(), report.inserted);
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StoreError;
use crate::models::{
    Entity, NaturalKey, NewEntity, NewRelationship, Relationship, Triple, NATURAL_KEY_CONSTRAINT,
    SIGNATURE_CONSTRAINT, TRIPLE_CONSTRAINT,
};
use crate::store::traits::{EntityStore, RelationshipStore, StoreClient, Transaction};

/// Committed tables plus their unique indexes.
#[derive(Debug, Clone, Default)]
struct Tables {
    entities: BTreeMap<i64, Entity>,
    relationships: BTreeMap<i64, Relationship>,
    natural_keys: HashMap<NaturalKey, i64>,
    triples: HashMap<Triple, i64>,
}

/// A mutation recorded by a transaction, replayed on commit.
#[derive(Debug, Clone)]
enum StagedOp {
    InsertEntity(Entity),
    UpdateEntity(Entity),
    DeleteSubtree(i64),
    InsertRelationship(Relationship),
}

impl Tables {
    fn apply(&mut self, op: &StagedOp) -> Result<usize, StoreError> {
        match op {
            StagedOp::InsertEntity(entity) => self.insert_entity(entity.clone()).map(|_| 1),
            StagedOp::UpdateEntity(entity) => self.update_entity(entity).map(|_| 1),
            StagedOp::DeleteSubtree(id) => Ok(self.delete_subtree(*id)),
            StagedOp::InsertRelationship(rel) => self.insert_relationship(rel.clone()).map(|_| 1),
        }
    }

    fn insert_entity(&mut self, entity: Entity) -> Result<(), StoreError> {
        if !entity.has_valid_signature() {
            return Err(signature_violation(&entity));
        }
        let key = entity.natural_key();
        if self.natural_keys.contains_key(&key) {
            return Err(StoreError::UniqueViolation {
                constraint: NATURAL_KEY_CONSTRAINT.to_string(),
                detail: format!("entity {} already exists", key),
            });
        }
        if let Some(parent_id) = entity.parent_id {
            if !self.entities.contains_key(&parent_id) {
                return Err(StoreError::ForeignKeyViolation(format!(
                    "parent entity {} does not exist",
                    parent_id
                )));
            }
        }
        self.natural_keys.insert(key, entity.id);
        self.entities.insert(entity.id, entity);
        Ok(())
    }

    fn update_entity(&mut self, changes: &Entity) -> Result<Entity, StoreError> {
        let existing = self
            .entities
            .get(&changes.id)
            .ok_or_else(|| StoreError::NotFound(format!("entity {}", changes.id)))?;

        let updated = Entity {
            parent_id: changes.parent_id,
            domain_entity_type: changes.domain_entity_type,
            range_entity_type: changes.range_entity_type,
            metadata: changes.metadata.clone(),
            updated_at: changes.updated_at,
            ..existing.clone()
        };

        if !updated.has_valid_signature() {
            return Err(signature_violation(&updated));
        }
        if let Some(parent_id) = updated.parent_id {
            self.check_parent(updated.id, parent_id)?;
        }

        self.entities.insert(updated.id, updated.clone());
        Ok(updated)
    }

    /// The parent must exist and must not sit inside the child's own subtree.
    fn check_parent(&self, child_id: i64, parent_id: i64) -> Result<(), StoreError> {
        let mut cursor = Some(parent_id);
        while let Some(id) = cursor {
            if id == child_id {
                return Err(StoreError::CheckViolation {
                    constraint: "ck_entity_parent_acyclic".to_string(),
                    detail: format!("entity {} cannot be its own ancestor", child_id),
                });
            }
            let ancestor = self.entities.get(&id).ok_or_else(|| {
                StoreError::ForeignKeyViolation(format!("parent entity {} does not exist", id))
            })?;
            cursor = ancestor.parent_id;
        }
        Ok(())
    }

    /// Collects the subtree with an explicit work stack so hierarchy depth
    /// never translates into call-stack depth.
    fn collect_subtree(&self, root: i64) -> HashSet<i64> {
        let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
        for entity in self.entities.values() {
            if let Some(parent_id) = entity.parent_id {
                children.entry(parent_id).or_default().push(entity.id);
            }
        }

        let mut removed = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !self.entities.contains_key(&id) || !removed.insert(id) {
                continue;
            }
            if let Some(kids) = children.get(&id) {
                stack.extend(kids.iter().copied());
            }
        }
        removed
    }

    fn delete_subtree(&mut self, root: i64) -> usize {
        let removed = self.collect_subtree(root);
        for id in &removed {
            if let Some(entity) = self.entities.remove(id) {
                self.natural_keys.remove(&entity.natural_key());
            }
        }

        let dangling: Vec<i64> = self
            .relationships
            .values()
            .filter(|rel| {
                removed.contains(&rel.subject_id)
                    || removed.contains(&rel.predicate_id)
                    || removed.contains(&rel.object_id)
            })
            .map(|rel| rel.id)
            .collect();
        for id in dangling {
            if let Some(rel) = self.relationships.remove(&id) {
                self.triples.remove(&rel.triple());
            }
        }

        removed.len()
    }

    fn insert_relationship(&mut self, rel: Relationship) -> Result<(), StoreError> {
        let triple = rel.triple();
        if self.triples.contains_key(&triple) {
            return Err(StoreError::UniqueViolation {
                constraint: TRIPLE_CONSTRAINT.to_string(),
                detail: format!("triple {} already exists", triple),
            });
        }
        for id in [triple.subject_id, triple.predicate_id, triple.object_id] {
            if !self.entities.contains_key(&id) {
                return Err(StoreError::ForeignKeyViolation(format!(
                    "entity {} referenced by triple {} does not exist",
                    id, triple
                )));
            }
        }
        self.triples.insert(triple, rel.id);
        self.relationships.insert(rel.id, rel);
        Ok(())
    }
}

fn signature_violation(entity: &Entity) -> StoreError {
    StoreError::CheckViolation {
        constraint: SIGNATURE_CONSTRAINT.to_string(),
        detail: format!(
            "entity {} has struct_type {} with entity_type {:?}, domain {:?}, range {:?}",
            entity.natural_key(),
            entity.struct_type,
            entity.entity_type,
            entity.domain_entity_type,
            entity.range_entity_type
        ),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
}

#[derive(Debug, Default)]
struct Shared {
    committed: Mutex<Tables>,
    next_entity_id: AtomicI64,
    next_relationship_id: AtomicI64,
}

impl Shared {
    fn next_entity_id(&self) -> i64 {
        self.next_entity_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn next_relationship_id(&self) -> i64 {
        self.next_relationship_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// In-memory graph store.
///
/// This type is cheap to clone - clones share the same committed state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed entities ordered by id.
    pub fn entities(&self) -> Result<Vec<Entity>, StoreError> {
        Ok(lock(&self.shared.committed)?.entities.values().cloned().collect())
    }

    /// Committed relationships ordered by id.
    pub fn relationships(&self) -> Result<Vec<Relationship>, StoreError> {
        Ok(lock(&self.shared.committed)?
            .relationships
            .values()
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    type Tx<'a> = MemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx<'_>, StoreError> {
        let snapshot = lock(&self.shared.committed)?.clone();
        Ok(MemoryTransaction {
            shared: self.shared.clone(),
            staging: Mutex::new(Staging {
                tables: snapshot,
                ops: Vec::new(),
            }),
            finished: false,
        })
    }
}

#[derive(Debug)]
struct Staging {
    tables: Tables,
    ops: Vec<StagedOp>,
}

impl Staging {
    /// Applies an op to the private copy and records it for commit.
    fn stage(&mut self, op: StagedOp) -> Result<usize, StoreError> {
        let affected = self.tables.apply(&op)?;
        self.ops.push(op);
        Ok(affected)
    }
}

/// A transaction over a [`MemoryStore`].
///
/// Dropping it without commit discards every staged change.
pub struct MemoryTransaction {
    shared: Arc<Shared>,
    staging: Mutex<Staging>,
    finished: bool,
}

#[async_trait]
impl EntityStore for MemoryTransaction {
    async fn find_by_natural_key(&self, key: &NaturalKey) -> Result<Option<Entity>, StoreError> {
        let staging = lock(&self.staging)?;
        Ok(staging
            .tables
            .natural_keys
            .get(key)
            .and_then(|id| staging.tables.entities.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Entity>, StoreError> {
        Ok(lock(&self.staging)?.tables.entities.get(&id).cloned())
    }

    async fn insert(&self, entity: NewEntity) -> Result<Entity, StoreError> {
        let row = Entity::from_new(self.shared.next_entity_id(), entity, Utc::now());
        lock(&self.staging)?.stage(StagedOp::InsertEntity(row.clone()))?;
        Ok(row)
    }

    async fn update(&self, entity: &Entity) -> Result<Entity, StoreError> {
        let mut changes = entity.clone();
        changes.updated_at = Utc::now();

        let mut staging = lock(&self.staging)?;
        staging.stage(StagedOp::UpdateEntity(changes.clone()))?;
        staging
            .tables
            .entities
            .get(&changes.id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("entity {}", changes.id)))
    }

    async fn delete_subtree(&self, id: i64) -> Result<usize, StoreError> {
        let mut staging = lock(&self.staging)?;
        if !staging.tables.entities.contains_key(&id) {
            return Err(StoreError::NotFound(format!("entity {}", id)));
        }
        staging.stage(StagedOp::DeleteSubtree(id))
    }
}

#[async_trait]
impl RelationshipStore for MemoryTransaction {
    async fn find_triple(&self, triple: Triple) -> Result<Option<Relationship>, StoreError> {
        let staging = lock(&self.staging)?;
        Ok(staging
            .tables
            .triples
            .get(&triple)
            .and_then(|id| staging.tables.relationships.get(id))
            .cloned())
    }

    async fn insert_triple(
        &self,
        relationship: NewRelationship,
    ) -> Result<Relationship, StoreError> {
        let row = Relationship {
            id: self.shared.next_relationship_id(),
            subject_id: relationship.triple.subject_id,
            predicate_id: relationship.triple.predicate_id,
            object_id: relationship.triple.object_id,
            weight: relationship.weight,
            metadata: relationship.metadata,
            created_at: Utc::now(),
        };
        lock(&self.staging)?.stage(StagedOp::InsertRelationship(row.clone()))?;
        Ok(row)
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn commit(mut self) -> Result<(), StoreError> {
        self.finished = true;
        let ops = std::mem::take(&mut lock(&self.staging)?.ops);

        let mut committed = lock(&self.shared.committed)?;
        let mut next = committed.clone();
        for op in &ops {
            next.apply(op)?;
        }
        *committed = next;

        tracing::debug!(operations = ops.len(), "Memory transaction committed");
        Ok(())
    }

    async fn rollback(mut self) -> Result<(), StoreError> {
        self.finished = true;
        Ok(())
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!("MemoryTransaction dropped without commit - staged changes discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LogicalEntityType::*, StructType};

    #[tokio::test]
    async fn test_uncommitted_writes_are_invisible() {
        let store = MemoryStore::new();
        let txn = store.begin().await.unwrap();
        txn.insert(NewEntity::node("Athens", StructType::Instance, Place))
            .await
            .unwrap();

        assert!(store.entities().unwrap().is_empty());
        let other = store.begin().await.unwrap();
        let key = NaturalKey::new("Athens", StructType::Instance, Some(Place));
        assert!(other.find_by_natural_key(&key).await.unwrap().is_none());
        assert!(txn.find_by_natural_key(&key).await.unwrap().is_some());

        txn.commit().await.unwrap();
        assert_eq!(store.entities().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rollback_discards_changes() {
        let store = MemoryStore::new();
        let txn = store.begin().await.unwrap();
        txn.insert(NewEntity::relation("bornIn", Person, Place))
            .await
            .unwrap();
        txn.rollback().await.unwrap();

        assert!(store.entities().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_signature_check_rejects_invalid_row() {
        let store = MemoryStore::new();
        let txn = store.begin().await.unwrap();
        let mut bad = NewEntity::relation("bornIn", Person, Place);
        bad.entity_type = Some(Person);

        let err = txn.insert(bad).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::CheckViolation { ref constraint, .. } if constraint == SIGNATURE_CONSTRAINT
        ));
    }

    #[tokio::test]
    async fn test_update_cannot_break_signature() {
        let store = MemoryStore::new();
        let txn = store.begin().await.unwrap();
        let mut row = txn
            .insert(NewEntity::node("Plato", StructType::Instance, Person))
            .await
            .unwrap();
        row.domain_entity_type = Some(Place);

        assert!(matches!(
            txn.update(&row).await,
            Err(StoreError::CheckViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_identity_fields() {
        let store = MemoryStore::new();
        let txn = store.begin().await.unwrap();
        let row = txn
            .insert(NewEntity::relation("bornIn", Person, Place))
            .await
            .unwrap();

        let mut changes = row.clone();
        changes.name = "renamed".to_string();
        changes.range_entity_type = Some(Time);
        let updated = txn.update(&changes).await.unwrap();

        assert_eq!(updated.name, "bornIn");
        assert_eq!(updated.range_entity_type, Some(Time));
        assert_eq!(updated.id, row.id);
    }

    #[tokio::test]
    async fn test_duplicate_natural_key_rejected_in_transaction() {
        let store = MemoryStore::new();
        let txn = store.begin().await.unwrap();
        txn.insert(NewEntity::relation("bornIn", Person, Place))
            .await
            .unwrap();

        let err = txn
            .insert(NewEntity::relation("bornIn", Person, Event))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_conflict_fails_at_commit() {
        let store = MemoryStore::new();
        let first = store.begin().await.unwrap();
        let second = store.begin().await.unwrap();

        first
            .insert(NewEntity::node("Athens", StructType::Instance, Place))
            .await
            .unwrap();
        second
            .insert(NewEntity::node("Sparta", StructType::Instance, Place))
            .await
            .unwrap();
        second
            .insert(NewEntity::node("Athens", StructType::Instance, Place))
            .await
            .unwrap();

        first.commit().await.unwrap();
        let err = second.commit().await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));

        // Nothing from the failed batch is applied, not even the non-conflicting row.
        let names: Vec<_> = store.entities().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Athens".to_string()]);
    }

    #[tokio::test]
    async fn test_parent_must_exist() {
        let store = MemoryStore::new();
        let txn = store.begin().await.unwrap();
        let err = txn
            .insert(NewEntity::node("orphan", StructType::Class, Person).with_parent(999))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation(_)));
    }

    #[tokio::test]
    async fn test_parent_cycle_rejected() {
        let store = MemoryStore::new();
        let txn = store.begin().await.unwrap();
        let root = txn
            .insert(NewEntity::node("root", StructType::Canonical, Person))
            .await
            .unwrap();
        let child = txn
            .insert(NewEntity::node("child", StructType::Class, Person).with_parent(root.id))
            .await
            .unwrap();

        let mut looped = root.clone();
        looped.parent_id = Some(child.id);
        assert!(matches!(
            txn.update(&looped).await,
            Err(StoreError::CheckViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_subtree_removes_descendants_and_triples() {
        let store = MemoryStore::new();
        let txn = store.begin().await.unwrap();
        let root = txn
            .insert(NewEntity::node("root", StructType::Canonical, Place))
            .await
            .unwrap();
        let child = txn
            .insert(NewEntity::node("child", StructType::Class, Place).with_parent(root.id))
            .await
            .unwrap();
        let grandchild = txn
            .insert(NewEntity::node("grandchild", StructType::Instance, Place).with_parent(child.id))
            .await
            .unwrap();
        let keep = txn
            .insert(NewEntity::node("keep", StructType::Instance, Person))
            .await
            .unwrap();
        let pred = txn
            .insert(NewEntity::relation("livesIn", Person, Place))
            .await
            .unwrap();
        txn.insert_triple(NewRelationship::new(Triple::new(keep.id, pred.id, grandchild.id)))
            .await
            .unwrap();

        assert_eq!(txn.delete_subtree(root.id).await.unwrap(), 3);
        txn.commit().await.unwrap();

        let names: Vec<_> = store.entities().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["keep".to_string(), "livesIn".to_string()]);
        assert!(store.relationships().unwrap().is_empty());
    }
}
