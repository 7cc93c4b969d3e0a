//! GraphQL execution context.
//!
//! The context carries the collaborators generated resolvers call into. It is
//! built per request from a [`GraphQLContextTemplate`](crate::handler::GraphQLContextTemplate)
//! and attached to the async-graphql request as data.
//!
//! # Example
//!
//! ```ignore
//! use bfdb_graphql::GraphQLContextBuilder;
//!
//! let context = GraphQLContextBuilder::new()
//!     .with_graph(graph.clone())
//!     .with_store(store.clone())
//!     .with_request_id("req-123")
//!     .build()?;
//! ```

use bfdb_storage::{DynNodeGraph, DynNodeStore};

/// GraphQL execution context.
///
/// Cheap to clone: the collaborators are shared behind `Arc`.
#[derive(Clone)]
pub struct GraphQLContext {
    /// Graph traversal collaborator used by relation fields.
    pub graph: DynNodeGraph,

    /// CRUD collaborator used by the standard mutations.
    pub store: DynNodeStore,

    /// Request ID for tracing and correlation.
    pub request_id: String,
}

impl GraphQLContext {
    /// Creates a new builder for GraphQLContext.
    #[must_use]
    pub fn builder() -> GraphQLContextBuilder {
        GraphQLContextBuilder::default()
    }
}

impl std::fmt::Debug for GraphQLContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQLContext")
            .field("request_id", &self.request_id)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing GraphQLContext.
#[derive(Default)]
pub struct GraphQLContextBuilder {
    graph: Option<DynNodeGraph>,
    store: Option<DynNodeStore>,
    request_id: Option<String>,
}

impl GraphQLContextBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the graph traversal collaborator.
    #[must_use]
    pub fn with_graph(mut self, graph: DynNodeGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Sets the CRUD collaborator.
    #[must_use]
    pub fn with_store(mut self, store: DynNodeStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the request ID.
    #[must_use]
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Builds the GraphQLContext.
    ///
    /// A missing request ID defaults to `"unknown"`.
    ///
    /// # Errors
    ///
    /// Returns an error if a collaborator is missing.
    pub fn build(self) -> Result<GraphQLContext, ContextBuilderError> {
        let graph = self
            .graph
            .ok_or(ContextBuilderError::MissingField("graph"))?;
        let store = self
            .store
            .ok_or(ContextBuilderError::MissingField("store"))?;

        Ok(GraphQLContext {
            graph,
            store,
            request_id: self.request_id.unwrap_or_else(|| "unknown".to_string()),
        })
    }
}

/// Errors that can occur when building a GraphQLContext.
#[derive(Debug, thiserror::Error)]
pub enum ContextBuilderError {
    /// A required field was not provided.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
