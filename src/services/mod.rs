//! Business logic services for the knowledge graph.
//!
//! Services sit on top of the store traits and enforce the rules the store
//! itself cannot express, such as a triple's predicate being a relation.

pub mod graph;

pub use graph::GraphService;
