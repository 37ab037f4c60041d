//! Migration trait and registry.

use futures::future::BoxFuture;

use crate::error::AppError;
use crate::store::{SqlExecutor, StoreClient, Transaction as _};

/// A versioned schema change.
///
/// Uses BoxFuture to avoid `'static` requirements from `#[async_trait]`.
pub trait Migration: Send + Sync {
    fn id(&self) -> &'static str;
    fn version(&self) -> u32;
    fn description(&self) -> &'static str;
    fn up<'a>(&'a self, ctx: &'a (dyn SqlExecutor + Sync)) -> BoxFuture<'a, Result<(), AppError>>;
}

/// Ordered set of migrations.
pub struct Register {
    migrations: Vec<Box<dyn Migration>>,
}

impl Register {
    pub fn new() -> Self {
        Self {
            migrations: Vec::new(),
        }
    }

    pub fn register(mut self, migration: impl Migration + 'static) -> Self {
        self.migrations.push(Box::new(migration));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Migration> {
        self.migrations.iter().map(|m| m.as_ref())
    }

    /// Highest version known to this register.
    pub fn latest_version(&self) -> u32 {
        self.iter().map(|m| m.version()).max().unwrap_or(0)
    }

    /// Runs every migration above `current_version`.
    ///
    /// Each migration runs in its own transaction together with its
    /// `schema_version` bump, so a failed migration leaves the recorded
    /// version where it was. Returns (new_version, applied_migration_ids).
    pub async fn run_pending<C>(
        &self,
        client: &C,
        current_version: u32,
    ) -> Result<(u32, Vec<String>), AppError>
    where
        C: StoreClient,
        for<'a> C::Tx<'a>: SqlExecutor,
    {
        let mut applied = vec![];
        let mut new_version = current_version;

        for migration in &self.migrations {
            if migration.version() <= current_version {
                continue;
            }

            tracing::info!(
                "Applying migration {} (v{}): {}",
                migration.id(),
                migration.version(),
                migration.description()
            );

            let txn = client.begin().await?;
            let result = match migration.up(&txn).await {
                Ok(()) => record_version(&txn, migration.version(), migration.id()).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => txn.commit().await?,
                Err(e) => {
                    tracing::error!("Migration {} failed: {}", migration.id(), e);
                    txn.rollback().await?;
                    return Err(e);
                }
            }

            new_version = migration.version();
            applied.push(migration.id().to_string());
        }

        Ok((new_version, applied))
    }
}

impl Default for Register {
    fn default() -> Self {
        Self::new()
    }
}

async fn record_version(
    ctx: &(dyn SqlExecutor + Sync),
    version: u32,
    migration_id: &str,
) -> Result<(), AppError> {
    let sql = format!(
        "UPDATE schema_version
         SET version = {},
             applied_migrations = array_append(applied_migrations, '{}'),
             last_applied_at = NOW()
         WHERE id = 1",
        version, migration_id
    );
    ctx.execute_sql(&sql).await?;
    Ok(())
}
