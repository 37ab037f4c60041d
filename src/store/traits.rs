//! Core traits for graph store abstraction.
//!
//! This module defines the trait hierarchy that backends must implement:
//!
//! - [`EntityStore`] - Natural-key lookup, insert, update and subtree removal of entities
//! - [`RelationshipStore`] - Triple lookup and insert
//! - [`SqlExecutor`] - Optional, for backends that run SQL migrations
//! - [`Transaction`] - Transaction lifecycle management
//! - [`StoreClient`] - Connection management and transaction creation

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Entity, NaturalKey, NewEntity, NewRelationship, Relationship, Triple};

/// Reads and writes entity rows.
///
/// Writes issued through a transaction are visible to later reads on the
/// same transaction and to nobody else until commit.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Looks up an entity by `(name, struct_type, entity_type)`.
    ///
    /// An absent `entity_type` matches only rows whose entity_type is absent.
    async fn find_by_natural_key(&self, key: &NaturalKey) -> Result<Option<Entity>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Entity>, StoreError>;

    /// Inserts a new row and returns it with its generated id and timestamps.
    async fn insert(&self, entity: NewEntity) -> Result<Entity, StoreError>;

    /// Writes the mutable projection of an existing row.
    ///
    /// Identity fields (name, struct_type, entity_type) are never changed by
    /// an update; `parent_id`, the signature fields and metadata are.
    async fn update(&self, entity: &Entity) -> Result<Entity, StoreError>;

    /// Removes an entity, its whole subtree, and every triple referencing
    /// any removed row. Returns the number of entities removed.
    async fn delete_subtree(&self, id: i64) -> Result<usize, StoreError>;
}

/// Reads and writes relationship triples.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    async fn find_triple(&self, triple: Triple) -> Result<Option<Relationship>, StoreError>;

    /// Inserts a triple. A duplicate (subject, predicate, object) is a
    /// [`StoreError::UniqueViolation`].
    async fn insert_triple(&self, relationship: NewRelationship)
        -> Result<Relationship, StoreError>;
}

/// Executes SQL statements against the store.
///
/// This trait is optional - only SQL backends implement it. Migrations run
/// through it.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Executes one or more SQL statements without returning results.
    async fn execute_sql(&self, sql: &str) -> Result<(), StoreError>;

    /// Runs a query returning a single integer column; `None` when no row matches.
    async fn query_i64(&self, sql: &str) -> Result<Option<i64>, StoreError>;
}

/// Transaction lifecycle management.
#[async_trait]
pub trait Transaction: Send + Sync {
    /// Commits the transaction, making all changes visible at once.
    ///
    /// Constraint violations that only show up against concurrently
    /// committed data are reported here, and nothing is applied.
    async fn commit(self) -> Result<(), StoreError>;

    /// Rolls back the transaction, discarding all changes.
    async fn rollback(self) -> Result<(), StoreError>;
}

/// A graph store client that can begin transactions.
///
/// # Example
///
/// ```ignore
/// let txn = client.begin().await?;
/// let row = txn.insert(NewEntity::relation("bornIn", Person, Place)).await?;
/// txn.commit().await?;
/// ```
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// The transaction type returned by this client.
    type Tx<'a>: Transaction + EntityStore + RelationshipStore
    where
        Self: 'a;

    /// Begins a new transaction.
    async fn begin(&self) -> Result<Self::Tx<'_>, StoreError>;
}
