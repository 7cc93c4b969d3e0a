//! Mutation declarations and custom mutation payloads.

use indexmap::IndexMap;

use super::field::{ArgMap, ArgSpec, ScalarKind};
use super::relation::TargetRef;
use super::resolver::ResolverFn;
use crate::error::DeclarationError;

/// Names reserved by the standard mutations.
const STANDARD_MUTATIONS: [&str; 2] = ["update", "delete"];

/// Which standard mutations are enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandardMutations {
    pub update: bool,
    pub delete: bool,
}

/// Value kind of a payload key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadKind {
    Scalar(ScalarKind),
    Object(TargetRef),
}

/// One key of a custom mutation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadField {
    pub kind: PayloadKind,
    pub list: bool,
    pub non_null: bool,
}

impl PayloadField {
    /// A nullable scalar key.
    #[must_use]
    pub fn scalar(scalar: ScalarKind) -> Self {
        Self {
            kind: PayloadKind::Scalar(scalar),
            list: false,
            non_null: false,
        }
    }

    #[must_use]
    pub fn string() -> Self {
        Self::scalar(ScalarKind::String)
    }

    #[must_use]
    pub fn boolean() -> Self {
        Self::scalar(ScalarKind::Boolean)
    }

    #[must_use]
    pub fn int() -> Self {
        Self::scalar(ScalarKind::Int)
    }

    #[must_use]
    pub fn id() -> Self {
        Self::scalar(ScalarKind::Id)
    }

    /// A nullable key holding a node of `target`.
    #[must_use]
    pub fn object(target: impl Into<TargetRef>) -> Self {
        Self {
            kind: PayloadKind::Object(target.into()),
            list: false,
            non_null: false,
        }
    }

    /// Wraps the key in a list.
    #[must_use]
    pub fn list(mut self) -> Self {
        self.list = true;
        self
    }

    /// Marks the key as non-null.
    #[must_use]
    pub fn non_null(mut self) -> Self {
        self.non_null = true;
        self
    }
}

/// Shape of a structured custom mutation result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadSpec {
    fields: IndexMap<String, PayloadField>,
}

impl PayloadSpec {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key. Re-adding a key replaces it in place.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, field: PayloadField) -> Self {
        self.fields.insert(key.into(), field);
        self
    }

    /// Iterates keys in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PayloadField)> {
        self.fields.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One declared custom mutation.
#[derive(Debug, Clone)]
pub struct CustomMutation {
    pub name: String,
    pub args: ArgMap,
    pub returns: Option<PayloadSpec>,
    pub resolver: ResolverFn,
}

/// The mutations one node type exposes.
#[derive(Debug, Clone, Default)]
pub struct MutationSpec {
    pub standard: StandardMutations,
    pub customs: Vec<CustomMutation>,
}

impl MutationSpec {
    /// Returns true if nothing is exposed on the mutation root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.standard.update && !self.standard.delete && self.customs.is_empty()
    }
}

/// Accumulates mutation declarations for one spec. Calls chain:
/// `mutation.update().delete().custom(...)`.
#[derive(Debug, Default)]
pub struct MutationBuilder {
    spec: MutationSpec,
    error: Option<DeclarationError>,
}

impl MutationBuilder {
    /// Enables `update{Type}`.
    pub fn update(&mut self) -> &mut Self {
        self.spec.standard.update = true;
        self
    }

    /// Enables `delete{Type}`.
    pub fn delete(&mut self) -> &mut Self {
        self.spec.standard.delete = true;
        self
    }

    /// Declares a custom mutation returning a JSON value.
    pub fn custom<S: Into<String>>(
        &mut self,
        name: impl Into<String>,
        args: impl IntoIterator<Item = (S, ArgSpec)>,
        resolver: ResolverFn,
    ) -> &mut Self {
        self.add(name.into(), collect_args(args), None, resolver)
    }

    /// Declares a custom mutation returning a structured payload.
    pub fn custom_with_payload<S: Into<String>>(
        &mut self,
        name: impl Into<String>,
        args: impl IntoIterator<Item = (S, ArgSpec)>,
        payload: PayloadSpec,
        resolver: ResolverFn,
    ) -> &mut Self {
        self.add(name.into(), collect_args(args), Some(payload), resolver)
    }

    fn add(
        &mut self,
        name: String,
        args: ArgMap,
        returns: Option<PayloadSpec>,
        resolver: ResolverFn,
    ) -> &mut Self {
        let error = if STANDARD_MUTATIONS.contains(&name.as_str()) {
            Some(DeclarationError::ReservedMutationName { name: name.clone() })
        } else if self.spec.customs.iter().any(|m| m.name == name) {
            Some(DeclarationError::DuplicateMutation { name: name.clone() })
        } else {
            None
        };

        match error {
            Some(err) => {
                self.error.get_or_insert(err);
            }
            None => self.spec.customs.push(CustomMutation {
                name,
                args,
                returns,
                resolver,
            }),
        }
        self
    }

    pub(crate) fn finish(self) -> Result<MutationSpec, DeclarationError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.spec),
        }
    }
}

fn collect_args<S: Into<String>>(args: impl IntoIterator<Item = (S, ArgSpec)>) -> ArgMap {
    args.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
