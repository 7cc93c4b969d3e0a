//! Declarative node spec DSL.
//!
//! A node type describes its GraphQL surface once, inside a single closure:
//!
//! ```ignore
//! let spec = define_gql_node(|field, relation, mutation| {
//!     field.id("id");
//!     field.string("name");
//!     field.nullable().string("bio");
//!     relation.one("account", "BfAccount");
//!     relation.many_in("followers", "BfPerson");
//!     mutation.update().delete();
//! })?;
//! ```
//!
//! The closure receives three builders; when it returns, their contents are
//! frozen into an immutable [`GqlNodeSpec`]. Declaration mistakes surface as a
//! [`DeclarationError`] from the define call itself.

mod field;
mod mutation;
mod relation;
mod resolver;

pub use field::{
    ArgMap, ArgSpec, DATE_SCALAR, EnumRef, FieldBuilder, FieldHandle, FieldKind, FieldSpec,
    JSON_SCALAR, NullableFieldBuilder, ScalarKind,
};
pub use mutation::{
    CustomMutation, MutationBuilder, MutationSpec, PayloadField, PayloadKind, PayloadSpec,
    StandardMutations,
};
pub use relation::{RelationBuilder, RelationSpec, TargetRef};
pub use resolver::{ResolverFn, ResolverInput, ResolverResult};

use indexmap::IndexMap;

use crate::error::DeclarationError;

/// The GraphQL surface of one node type.
#[derive(Debug, Clone, Default)]
pub struct GqlNodeSpec {
    /// Fields in declaration order.
    pub field: IndexMap<String, FieldSpec>,
    /// Relations in declaration order.
    pub relation: IndexMap<String, RelationSpec>,
    /// Mutation root contributions.
    pub mutation: MutationSpec,
    /// Interfaces the compiled object implements.
    pub implements: Vec<String>,
    /// Compile to an interface instead of an object.
    pub is_interface: bool,
}

impl GqlNodeSpec {
    /// Declares that the compiled object implements `interface`.
    #[must_use]
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        let interface = interface.into();
        if !self.implements.contains(&interface) {
            self.implements.push(interface);
        }
        self
    }
}

/// Builds the spec of an object node type.
///
/// # Errors
///
/// Returns the first [`DeclarationError`] found: duplicate field, relation
/// or custom mutation names, a relation reusing a field name, or a custom
/// mutation named `update`/`delete`.
pub fn define_gql_node<F>(define: F) -> Result<GqlNodeSpec, DeclarationError>
where
    F: FnOnce(&mut FieldBuilder, &mut RelationBuilder, &mut MutationBuilder),
{
    let mut field = FieldBuilder::default();
    let mut relation = RelationBuilder::default();
    let mut mutation = MutationBuilder::default();

    define(&mut field, &mut relation, &mut mutation);

    let field = field.finish()?;
    let relation = relation.finish()?;
    let mutation = mutation.finish()?;

    if let Some(name) = relation.keys().find(|name| field.contains_key(*name)) {
        return Err(DeclarationError::RelationShadowsField { name: name.clone() });
    }

    Ok(GqlNodeSpec {
        field,
        relation,
        mutation,
        implements: Vec::new(),
        is_interface: false,
    })
}

/// Builds the spec of an interface type. Same rules as [`define_gql_node`].
///
/// # Errors
///
/// See [`define_gql_node`].
pub fn define_gql_interface<F>(define: F) -> Result<GqlNodeSpec, DeclarationError>
where
    F: FnOnce(&mut FieldBuilder, &mut RelationBuilder, &mut MutationBuilder),
{
    let mut spec = define_gql_node(define)?;
    spec.is_interface = true;
    Ok(spec)
}
