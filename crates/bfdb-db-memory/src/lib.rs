//! In-memory node graph backend for the bfDb GraphQL layer.
//!
//! This crate provides [`InMemoryGraph`], an implementation of both
//! collaborator traits from `bfdb-storage`. It backs the demo server and the
//! integration tests; it is not a persistence engine.
//!
//! # Example
//!
//! ```ignore
//! use bfdb_db_memory::InMemoryGraph;
//! use bfdb_storage::{Direction, NodeGraph, NodeRecord};
//!
//! let graph = InMemoryGraph::new();
//! let ada = graph.insert(NodeRecord::new("BfPerson", "p1").with_prop("name", "Ada"));
//! let acct = graph.insert(NodeRecord::new("BfAccount", "a1"));
//! graph.connect(&ada, &acct).await;
//!
//! let found = graph.find_one(&ada, "BfAccount", Direction::Out).await?;
//! ```

mod cursor;
pub mod graph;

pub use bfdb_storage::{NodeGraph, NodeStore, StorageError};
pub use graph::InMemoryGraph;

/// Creates a new shareable in-memory graph.
pub fn create_graph() -> std::sync::Arc<InMemoryGraph> {
    std::sync::Arc::new(InMemoryGraph::new())
}
