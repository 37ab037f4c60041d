//! knowledge-os - Typed knowledge graph
//!
//! Entities and subject/predicate/object triples under a closed type system,
//! populated by importing an external ontology definition.

pub mod cli;
pub mod config;
pub mod error;
pub mod migrations;
pub mod models;
pub mod ontology;
pub mod services;
pub mod store;
