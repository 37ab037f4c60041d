//! CLI module for knowledge-os.
//!
//! Subcommands:
//! - `validate`: Load and validate an ontology document, no store needed
//! - `migrate`: Apply pending PostgreSQL schema migrations
//! - `seed`: Migrate, then import an ontology document

mod migrate;
mod seed;
mod validate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::eyre;

use crate::config::{Config, PostgresConfig};
use crate::error::AppError;
use crate::store::backends::postgres::PostgresClient;

/// knowledge-os - Typed knowledge graph
#[derive(Parser)]
#[command(name = "knowledge-os")]
#[command(about = "Typed knowledge graph - ontology import into PostgreSQL")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load and validate an ontology document
    Validate {
        /// Path to the ontology JSON document
        path: PathBuf,
    },

    /// Apply pending schema migrations
    Migrate,

    /// Apply migrations, then seed an ontology into the store
    Seed {
        /// Path to the ontology JSON document (defaults to `ontology.path` from config)
        path: Option<PathBuf>,

        /// Print the import report as JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Validate { ref path } => self.run_validate(path),
            Command::Migrate => self.run_migrate().await,
            Command::Seed { ref path, json } => self.run_seed(path.as_deref(), json).await,
        }
    }
}

fn postgres_config(config: &Config) -> Result<&PostgresConfig, AppError> {
    config
        .postgres
        .as_ref()
        .ok_or(AppError::MissingConfig("postgres.uri"))
}

async fn connect(config: &Config) -> color_eyre::Result<PostgresClient> {
    let postgres = postgres_config(config)?;
    tracing::info!("Connecting to PostgreSQL at {}", postgres.uri);
    let client = PostgresClient::connect(&postgres.uri, postgres.pool_size)
        .await
        .map_err(|e| eyre!("Failed to connect: {}", e))?;
    tracing::info!("Connected to PostgreSQL");
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_without_path() {
        let app = App::try_parse_from(["knowledge-os", "seed"]).unwrap();
        assert!(matches!(
            app.command,
            Command::Seed {
                path: None,
                json: false
            }
        ));
        assert!(!app.verbose);
    }

    #[test]
    fn test_parse_seed_json_report() {
        let app = App::try_parse_from(["knowledge-os", "seed", "core.json", "--json"]).unwrap();
        match app.command {
            Command::Seed { path, json } => {
                assert_eq!(path, Some(PathBuf::from("core.json")));
                assert!(json);
            }
            _ => panic!("expected seed"),
        }
    }

    #[test]
    fn test_parse_validate_with_global_verbose() {
        let app =
            App::try_parse_from(["knowledge-os", "validate", "core.json", "--verbose"]).unwrap();
        assert!(app.verbose);
        match app.command {
            Command::Validate { path } => assert_eq!(path, PathBuf::from("core.json")),
            _ => panic!("expected validate"),
        }
    }

    #[test]
    fn test_validate_requires_path() {
        assert!(App::try_parse_from(["knowledge-os", "validate"]).is_err());
    }

    #[test]
    fn test_missing_postgres_config() {
        let err = postgres_config(&Config::default()).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
