//! Spec compilation.
//!
//! [`compile_node`] turns one node spec into schema definitions;
//! [`compile_specs`] runs it over a whole registration table and merges the
//! results. Both are pure and synchronous: the same input always yields the
//! same definitions in the same order.

mod aggregate;
mod definition;
mod node;

pub use aggregate::compile_specs;
pub use definition::{
    CompiledDefinitions, EnumDefinition, FieldDefinition, GqlType, InputArg, MUTATION_ROOT,
    ObjectDefinition, PAGE_INFO, QUERY_ROOT, Resolution, ScalarDefinition, TypeDefinition,
    ValueShape, is_root_type, render_sdl,
};
pub use node::{
    compile_node, connection_type_name, edge_type_name, enum_type_name, payload_type_name,
};
