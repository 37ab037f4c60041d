//! Schema migrations for the PostgreSQL store with version tracking.
//!
//! Migrations are:
//! - **Idempotent**: `IF NOT EXISTS` everywhere, safe to retry
//! - **Forward-only**: No rollback support - create compensating migrations if needed
//! - **Version-tracked**: Schema version stored in the `schema_version` table,
//!   bumped in the same transaction as the migration itself

mod m001_entity_schema;
mod m002_relationship_schema;
mod runner;
mod traits;

pub use m001_entity_schema::M001EntitySchema;
pub use m002_relationship_schema::M002RelationshipSchema;
pub use runner::{get_schema_version, run_migrations};
pub use traits::{Migration, Register};

/// Result of running migrations.
#[derive(Debug, Clone)]
pub struct MigrationResult {
    /// Schema version before migrations ran.
    pub previous_version: u32,
    /// Schema version after migrations ran.
    pub current_version: u32,
    /// IDs of the migrations that were applied.
    pub applied_migrations: Vec<String>,
}

/// All migrations in version order.
pub fn create_register() -> Register {
    Register::new()
        .register(M001EntitySchema)
        .register(M002RelationshipSchema)
}
