//! GraphQL schema building and lazy loading.
//!
//! ## Components
//!
//! - [`BfSchemaBuilder`] - Compiles the registry and builds the dynamic schema
//! - [`LazySchema`] - Thread-safe lazy schema holder with invalidation
//!
//! ## Architecture
//!
//! 1. Server starts immediately without compiling any spec
//! 2. First GraphQL request triggers the compile and schema build
//! 3. Concurrent requests either wait or receive 503
//! 4. Schema is cached after successful build
//! 5. `invalidate()` drops the cache so the next request rebuilds

mod builder;
mod lazy;

pub use builder::{BfSchemaBuilder, SchemaBuilderConfig};
pub use lazy::{LazySchema, SchemaState};
