//! Migrate command handler.

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::config::Config;
use crate::migrations::run_migrations;
use crate::store::backends::postgres::PostgresClient;

use super::{connect, App};

impl App {
    /// Apply pending schema migrations.
    pub async fn run_migrate(&self) -> Result<()> {
        let config = Config::load()?;
        let client = connect(&config).await?;
        migrate(&client).await
    }
}

pub(super) async fn migrate(client: &PostgresClient) -> Result<()> {
    tracing::info!("Running migrations...");
    let result = run_migrations(client)
        .await
        .map_err(|e| eyre!("Migration failed: {}", e))?;

    if result.applied_migrations.is_empty() {
        tracing::info!(
            "Database already at v{}, no migrations needed",
            result.current_version
        );
    } else {
        tracing::info!(
            "Migrations complete: v{} -> v{}, applied: {:?}",
            result.previous_version,
            result.current_version,
            result.applied_migrations
        );
    }
    Ok(())
}
