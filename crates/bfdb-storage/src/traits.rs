//! Collaborator traits implemented by storage backends.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageError;
use crate::types::{Connection, ConnectionArgs, Direction, NodeRecord};

/// Graph traversal collaborator.
///
/// Generated relation fields call into this trait; the GraphQL layer never
/// walks edges itself. Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait NodeGraph: Send + Sync {
    /// Returns the single node of `target_type` connected to `source` in the
    /// given direction.
    ///
    /// Returns `None` when no such node exists. When several exist, the
    /// backend picks the first one in its own edge order.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing nodes.
    async fn find_one(
        &self,
        source: &NodeRecord,
        target_type: &str,
        direction: Direction,
    ) -> Result<Option<NodeRecord>, StorageError>;

    /// Returns a page of nodes of `target_type` connected to `source` in the
    /// given direction.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidCursor` for cursors the backend did not
    /// issue, and an error for infrastructure issues.
    async fn find_many(
        &self,
        source: &NodeRecord,
        target_type: &str,
        direction: Direction,
        args: &ConnectionArgs,
    ) -> Result<Connection, StorageError>;
}

/// Standard CRUD collaborator behind the generated update/delete mutations.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Loads a node by type and ID.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing nodes.
    async fn load(&self, type_name: &str, id: &str) -> Result<Option<NodeRecord>, StorageError>;

    /// Merges `params` (a JSON object) into the node's properties and returns
    /// the updated node.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the node does not exist.
    /// Returns `StorageError::InvalidParams` if `params` is not an object.
    async fn update(
        &self,
        type_name: &str,
        id: &str,
        params: &Value,
    ) -> Result<NodeRecord, StorageError>;

    /// Deletes a node. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error for infrastructure issues.
    async fn delete(&self, type_name: &str, id: &str) -> Result<bool, StorageError>;
}

/// Shareable traversal collaborator.
pub type DynNodeGraph = Arc<dyn NodeGraph>;

/// Shareable CRUD collaborator.
pub type DynNodeStore = Arc<dyn NodeStore>;
