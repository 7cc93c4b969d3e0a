//! # bfdb-graphql
//!
//! Declarative GraphQL schema builder for bfDb node types.
//!
//! Each node type declares its GraphQL surface (fields, relations and
//! mutations) once with [`define_gql_node`]. The compiler turns every
//! declared spec into schema definitions, and the aggregator merges them
//! into a single, deduplicated list that [`BfSchemaBuilder`] registers with
//! async-graphql's dynamic schema.
//!
//! ## Overview
//!
//! ```ignore
//! struct BfPerson;
//!
//! impl GqlNode for BfPerson {
//!     const TYPE_NAME: &'static str = "BfPerson";
//!
//!     fn gql_spec() -> Result<Option<GqlNodeSpec>, DeclarationError> {
//!         define_gql_node(|field, relation, mutation| {
//!             field.id("id");
//!             field.string("name");
//!             relation.one("account", "BfAccount");
//!             mutation.update();
//!         })
//!         .map(Some)
//!     }
//! }
//!
//! let mut registry = NodeRegistry::new();
//! registry.register::<BfPerson>()?.register::<BfAccount>()?;
//!
//! let lazy = LazySchema::new(BfSchemaBuilder::new(registry, SchemaBuilderConfig::default()));
//! ```
//!
//! ## Endpoints
//!
//! - `POST /graphql` - GraphQL request in the JSON body
//! - `GET /graphql` - GraphQL request in the URL query string
//!
//! ## Modules
//!
//! - [`builder`] - Node spec DSL
//! - [`compiler`] - Single-type compiler and multi-spec aggregator
//! - [`registry`] - Registration table of node types
//! - [`schema`] - Schema building and lazy loading
//! - [`resolvers`] - Field resolvers behind the compiled definitions
//! - [`context`] - GraphQL execution context
//! - [`handler`] - Axum HTTP handlers
//! - [`config`] - Configuration options
//! - [`error`] - Error types

pub mod builder;
pub mod compiler;
pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod registry;
pub mod resolvers;
pub mod schema;

// Re-export main types
pub use builder::{
    ArgSpec, EnumRef, GqlNodeSpec, PayloadField, PayloadSpec, ResolverFn, ResolverInput,
    TargetRef, define_gql_interface, define_gql_node,
};
pub use compiler::{CompiledDefinitions, TypeDefinition, compile_node, compile_specs, render_sdl};
pub use config::GraphQLConfig;
pub use context::{GraphQLContext, GraphQLContextBuilder};
pub use error::{CompileError, DeclarationError, GraphQLError};
pub use handler::{GraphQLContextTemplate, GraphQLState, graphql_handler, graphql_handler_get};
pub use registry::{GqlNode, NodeRegistry};
pub use schema::{BfSchemaBuilder, LazySchema, SchemaBuilderConfig};

/// Result type for GraphQL operations.
pub type Result<T> = std::result::Result<T, GraphQLError>;
