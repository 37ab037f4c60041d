//! Migration runner with version tracking.

use crate::error::{AppError, StoreError};
use crate::migrations::{create_register, MigrationResult};
use crate::store::{SqlExecutor, StoreClient, Transaction};

/// Runs all pending schema migrations.
pub async fn run_migrations<C>(client: &C) -> Result<MigrationResult, AppError>
where
    C: StoreClient,
    for<'a> C::Tx<'a>: SqlExecutor,
{
    ensure_schema_version_table(client).await?;

    let previous_version = get_schema_version(client).await?;
    let register = create_register();
    let (current_version, applied) = register.run_pending(client, previous_version).await?;

    if applied.is_empty() {
        tracing::info!("Schema up to date (v{})", current_version);
    }

    Ok(MigrationResult {
        previous_version,
        current_version,
        applied_migrations: applied,
    })
}

const CREATE_SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY DEFAULT 1 CHECK (id = 1),
    version INTEGER NOT NULL DEFAULT 0,
    applied_migrations TEXT[] NOT NULL DEFAULT '{}',
    last_applied_at TIMESTAMPTZ DEFAULT NOW()
);
INSERT INTO schema_version (id, version) VALUES (1, 0) ON CONFLICT (id) DO NOTHING;
"#;

async fn ensure_schema_version_table<C>(client: &C) -> Result<(), AppError>
where
    C: StoreClient,
    for<'a> C::Tx<'a>: SqlExecutor,
{
    let txn = client.begin().await?;
    txn.execute_sql(CREATE_SCHEMA_VERSION_TABLE).await?;
    txn.commit().await?;
    Ok(())
}

/// Current schema version; 0 on a fresh database.
pub async fn get_schema_version<C>(client: &C) -> Result<u32, AppError>
where
    C: StoreClient,
    for<'a> C::Tx<'a>: SqlExecutor,
{
    let txn = client.begin().await?;
    let version = txn
        .query_i64("SELECT version::BIGINT FROM schema_version WHERE id = 1")
        .await?;
    txn.commit().await?;

    Ok(schema_version_from_row(version)?)
}

/// Converts the stored version column, rejecting values outside `u32`.
fn schema_version_from_row(version: Option<i64>) -> Result<u32, StoreError> {
    let version = version.unwrap_or(0);
    u32::try_from(version)
        .map_err(|_| StoreError::Backend(format!("Invalid schema version {}", version)))
}
