//! Ontology import pipeline: load, validate, seed.
//!
//! ```ignore
//! let report = knowledge_os::ontology::seed_from_path(&client, "ontology/knowledge_os_core.json").await?;
//! ```

mod loader;
mod seeder;
mod validator;

pub use loader::{load_ontology_from_file, load_ontology_from_str, load_ontology_from_value};
pub use seeder::{seed_from_path, seed_ontology, SeedReport};
pub use validator::{validate, validate_ontology};
