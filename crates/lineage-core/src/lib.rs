//! Core types for the repository object graph.
//!
//! Provides the node model ([`node::Node`]), the adjacency graph ([`graph::Graph`])
//! built from relationship and content-model exports, and root-to-leaf ancestry
//! enumeration that tolerates missing parents and cycles.

pub mod ancestry;
pub mod config;
pub mod error;
pub mod graph;
pub mod load;
pub mod node;
