//! # bfdb-storage
//!
//! Collaborator contracts for the bfDb GraphQL layer.
//!
//! The schema compiler in `bfdb-graphql` never touches persistence itself.
//! Fields it synthesizes delegate to two collaborators defined here:
//!
//! - [`NodeGraph`] - graph traversal: given a source node, a target type and a
//!   [`Direction`], returns a single related node or a paginated
//!   [`Connection`] of related nodes
//! - [`NodeStore`] - the standard CRUD operations behind the generated
//!   `update{Type}` / `delete{Type}` mutation fields
//!
//! This crate contains no implementations; see `bfdb-db-memory` for an
//! in-memory backend.
//!
//! ## Example
//!
//! ```ignore
//! use bfdb_storage::{Direction, NodeGraph, NodeRecord, StorageError};
//!
//! async fn account_of(
//!     graph: &dyn NodeGraph,
//!     person: &NodeRecord,
//! ) -> Result<Option<NodeRecord>, StorageError> {
//!     graph.find_one(person, "BfAccount", Direction::Out).await
//! }
//! ```

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ErrorCategory, StorageError};
pub use traits::{DynNodeGraph, DynNodeStore, NodeGraph, NodeStore};
pub use types::{Connection, ConnectionArgs, Direction, Edge, NodeRecord, PageInfo};
