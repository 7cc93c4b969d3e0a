//! Relation (graph edge) declarations.

use std::fmt;

use bfdb_storage::Direction;
use indexmap::IndexMap;

use crate::error::DeclarationError;
use crate::registry::GqlNode;

/// Deferred reference to another node type, by GraphQL type name.
///
/// The name is only checked when the specs are compiled, so two node types
/// may reference each other regardless of declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetRef(String);

impl TargetRef {
    /// References the type registered for `T`.
    #[must_use]
    pub fn of<T: GqlNode>() -> Self {
        Self(T::TYPE_NAME.to_string())
    }

    /// The referenced type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TargetRef {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for TargetRef {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One declared relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSpec {
    pub name: String,
    pub target: TargetRef,
    pub direction: Direction,
    pub many: bool,
}

/// Accumulates relation declarations for one spec.
///
/// `one`/`many` follow outgoing edges; the `_in` variants follow edges
/// pointing at the node ("nodes that point to me").
#[derive(Debug, Default)]
pub struct RelationBuilder {
    relations: IndexMap<String, RelationSpec>,
    error: Option<DeclarationError>,
}

impl RelationBuilder {
    /// Declares a single related node along outgoing edges.
    pub fn one(&mut self, name: impl Into<String>, target: impl Into<TargetRef>) -> &mut Self {
        self.add(name.into(), target.into(), Direction::Out, false)
    }

    /// Declares a paginated set of related nodes along outgoing edges.
    pub fn many(&mut self, name: impl Into<String>, target: impl Into<TargetRef>) -> &mut Self {
        self.add(name.into(), target.into(), Direction::Out, true)
    }

    /// Same as [`one`](Self::one).
    pub fn one_out(&mut self, name: impl Into<String>, target: impl Into<TargetRef>) -> &mut Self {
        self.one(name, target)
    }

    /// Same as [`many`](Self::many).
    pub fn many_out(
        &mut self,
        name: impl Into<String>,
        target: impl Into<TargetRef>,
    ) -> &mut Self {
        self.many(name, target)
    }

    /// Declares a single related node along incoming edges.
    pub fn one_in(&mut self, name: impl Into<String>, target: impl Into<TargetRef>) -> &mut Self {
        self.add(name.into(), target.into(), Direction::In, false)
    }

    /// Declares a paginated set of related nodes along incoming edges.
    pub fn many_in(&mut self, name: impl Into<String>, target: impl Into<TargetRef>) -> &mut Self {
        self.add(name.into(), target.into(), Direction::In, true)
    }

    fn add(&mut self, name: String, target: TargetRef, direction: Direction, many: bool) -> &mut Self {
        if self.relations.contains_key(&name) {
            if self.error.is_none() {
                self.error = Some(DeclarationError::DuplicateRelation { name });
            }
            return self;
        }
        self.relations.insert(
            name.clone(),
            RelationSpec {
                name,
                target,
                direction,
                many,
            },
        );
        self
    }

    pub(crate) fn finish(self) -> Result<IndexMap<String, RelationSpec>, DeclarationError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.relations),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_directions() {
        let mut relation = RelationBuilder::default();
        relation
            .one("account", "BfAccount")
            .many_in("followers", "BfPerson")
            .one_in("owner", "BfPerson")
            .many_out("memberships", "BfOrganization");

        let relations = relation.finish().unwrap();
        let account = &relations["account"];
        assert_eq!(account.direction, Direction::Out);
        assert!(!account.many);
        assert_eq!(account.target.type_name(), "BfAccount");

        let followers = &relations["followers"];
        assert_eq!(followers.direction, Direction::In);
        assert!(followers.many);

        assert_eq!(relations["owner"].direction, Direction::In);
        assert_eq!(relations["memberships"].direction, Direction::Out);
    }

    #[test]
    fn test_duplicate_relation_is_rejected() {
        let mut relation = RelationBuilder::default();
        relation.one("account", "BfAccount").many("account", "BfAccount");

        assert_eq!(
            relation.finish().unwrap_err(),
            DeclarationError::DuplicateRelation {
                name: "account".into()
            }
        );
    }
}
