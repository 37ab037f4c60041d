//! Backend implementations of the graph store.
//!
//! Each backend implements the core traits from [`crate::store::traits`]:
//!
//! - [`StoreClient`](crate::store::StoreClient) - Required
//! - [`Transaction`](crate::store::Transaction) - Required
//! - [`EntityStore`](crate::store::EntityStore) and
//!   [`RelationshipStore`](crate::store::RelationshipStore) - Required, on the transaction
//! - [`SqlExecutor`](crate::store::SqlExecutor) - Optional, for migrations
//!
//! # Available Backends
//!
//! | Backend | Module | Persistence |
//! |---------|--------|-------------|
//! | In-memory | [`memory`] | Process lifetime |
//! | PostgreSQL | [`postgres`] | Durable |

pub mod memory;
pub mod postgres;
