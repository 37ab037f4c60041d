//! Graph store abstraction layer.
//!
//! The import pipeline talks to persistence only through the traits in
//! this module, so the same code runs against the in-memory backend (tests,
//! dry runs) and PostgreSQL.
//!
//! # Architecture
//!
//! - [`StoreClient`] - Hands out transactions
//! - [`Transaction`] - Commit/rollback; all writes go through one
//! - [`EntityStore`] / [`RelationshipStore`] - Row access inside a transaction
//! - [`SqlExecutor`] - Raw SQL for migrations (SQL backends only)
//!
//! # Usage
//!
//! ```ignore
//! use knowledge_os::store::{EntityStore, StoreClient, Transaction};
//!
//! let txn = client.begin().await?;
//! if txn.find_by_natural_key(&key).await?.is_none() {
//!     txn.insert(new_entity).await?;
//! }
//! txn.commit().await?;
//! ```

mod traits;

pub mod backends;

pub use traits::{EntityStore, RelationshipStore, SqlExecutor, StoreClient, Transaction};
