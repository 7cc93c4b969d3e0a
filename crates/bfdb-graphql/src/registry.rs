//! Explicit registration table of node types.
//!
//! Application wiring lists every node type once, in the order their
//! definitions should be emitted:
//!
//! ```ignore
//! let mut registry = NodeRegistry::new();
//! registry
//!     .register::<BfPerson>()?
//!     .register::<BfAccount>()?
//!     .register_spec("Hidden", None);
//!
//! let definitions = registry.load_model_types()?;
//! ```

use tracing::debug;

use crate::builder::GqlNodeSpec;
use crate::compiler::{CompiledDefinitions, compile_specs};
use crate::error::{CompileError, DeclarationError};

/// A node type exposing a GraphQL spec.
pub trait GqlNode {
    /// GraphQL type name of the node.
    const TYPE_NAME: &'static str;

    /// Declares the node's spec. `Ok(None)` opts the type out of the schema.
    ///
    /// # Errors
    ///
    /// Returns the declaration error of an invalid spec.
    fn gql_spec() -> Result<Option<GqlNodeSpec>, DeclarationError>;
}

/// Ordered `type name -> spec` table.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    entries: Vec<(String, Option<GqlNodeSpec>)>,
}

impl NodeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` under its type name.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::Declaration` if `T` declares an invalid spec.
    pub fn register<T: GqlNode>(&mut self) -> Result<&mut Self, CompileError> {
        let spec = T::gql_spec().map_err(|source| CompileError::Declaration {
            type_name: T::TYPE_NAME.to_string(),
            source,
        })?;
        Ok(self.register_spec(T::TYPE_NAME, spec))
    }

    /// Registers a spec under an explicit name. `None` registers the name
    /// without exposing it.
    pub fn register_spec(&mut self, type_name: impl Into<String>, spec: Option<GqlNodeSpec>) -> &mut Self {
        let type_name = type_name.into();
        debug!(type_name = %type_name, exposed = spec.is_some(), "Registered node type");
        self.entries.push((type_name, spec));
        self
    }

    /// The registered entries, in registration order.
    #[must_use]
    pub fn entries(&self) -> &[(String, Option<GqlNodeSpec>)] {
        &self.entries
    }

    /// Registered type names, in registration order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compiles every registered spec into one definition list.
    ///
    /// # Errors
    ///
    /// See [`compile_specs`].
    pub fn load_model_types(&self) -> Result<CompiledDefinitions, CompileError> {
        compile_specs(&self.entries)
    }
}
