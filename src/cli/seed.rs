//! Seed command handler.

use std::path::Path;

use color_eyre::Result;

use crate::config::Config;
use crate::error::AppError;
use crate::ontology::seed_from_path;

use super::migrate::migrate;
use super::{connect, App};

impl App {
    /// Migrate the store, then import an ontology document into it.
    ///
    /// With `json`, the import report is also printed to stdout.
    pub async fn run_seed(&self, path: Option<&Path>, json: bool) -> Result<()> {
        let config = Config::load()?;
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => config
                .ontology
                .path
                .clone()
                .ok_or(AppError::MissingConfig("ontology.path"))?,
        };

        let client = connect(&config).await?;
        migrate(&client).await?;

        tracing::info!("Seeding ontology from {}", path.display());
        let report = seed_from_path(&client, &path).await?;
        tracing::info!(
            "Seeded {} v{}: {} inserted, {} updated, {} unchanged",
            report.ontology_id,
            report.version,
            report.inserted,
            report.updated,
            report.unchanged
        );
        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Ok(())
    }
}
