//! Validate command handler.

use std::path::Path;

use color_eyre::Result;

use crate::ontology::{load_ontology_from_file, validate};

use super::App;

impl App {
    /// Load and validate an ontology without touching the store.
    pub fn run_validate(&self, path: &Path) -> Result<()> {
        let ontology = load_ontology_from_file(path)?;
        let validated = validate(&ontology)?;

        tracing::info!(
            "Ontology {} v{} is valid: {} entities, {} relations",
            validated.ontology_id(),
            validated.version(),
            validated.entities().len(),
            validated.relations().len()
        );
        Ok(())
    }
}
