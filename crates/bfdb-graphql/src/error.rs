//! Error types for the GraphQL layer.
//!
//! Three families live here:
//!
//! - [`DeclarationError`]: a node spec was declared incorrectly (raised by
//!   [`define_gql_node`](crate::define_gql_node)).
//! - [`CompileError`]: the set of specs cannot be turned into one schema.
//! - [`GraphQLError`]: everything that reaches the HTTP layer or a resolver.
//!
//! Declaration and compile errors are programmer mistakes and abort schema
//! building; there is no degraded mode.

use std::fmt;

use async_graphql::ErrorExtensions;
use bfdb_storage::StorageError;

/// A mistake in a node spec declaration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclarationError {
    /// The same field name was declared twice.
    #[error("field '{name}' is declared more than once")]
    DuplicateField {
        /// The field name.
        name: String,
    },

    /// The same relation name was declared twice.
    #[error("relation '{name}' is declared more than once")]
    DuplicateRelation {
        /// The relation name.
        name: String,
    },

    /// A relation reuses the name of a field.
    #[error("relation '{name}' collides with a field of the same name")]
    RelationShadowsField {
        /// The relation name.
        name: String,
    },

    /// The same custom mutation name was declared twice.
    #[error("custom mutation '{name}' is declared more than once")]
    DuplicateMutation {
        /// The mutation name.
        name: String,
    },

    /// A custom mutation uses one of the standard mutation names.
    #[error("custom mutation '{name}' collides with the standard '{name}' mutation")]
    ReservedMutationName {
        /// The mutation name.
        name: String,
    },
}

/// Failure to compile a set of node specs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// A relation, object field or payload references a type that is not
    /// part of the compiled set.
    #[error("{owner}.{field} references unknown type '{target}'")]
    UnknownTarget {
        /// The type declaring the reference.
        owner: String,
        /// The field, relation or payload key holding the reference.
        field: String,
        /// The referenced type name.
        target: String,
    },

    /// Two contributors define the same root field.
    #[error("root field {root}.{field} is contributed more than once")]
    DuplicateRootField {
        /// `Query` or `Mutation`.
        root: String,
        /// The field name.
        field: String,
    },

    /// A node type failed to declare its spec.
    #[error("invalid spec for '{type_name}': {source}")]
    Declaration {
        /// The node type.
        type_name: String,
        /// The underlying declaration error.
        #[source]
        source: DeclarationError,
    },
}

/// Errors that can occur while serving GraphQL.
#[derive(Debug)]
pub enum GraphQLError {
    /// Schema is still being built - client should retry.
    SchemaInitializing,

    /// Schema build failed.
    SchemaBuildFailed(String),

    /// The node specs could not be compiled.
    Compile(CompileError),

    /// Invalid query syntax or arguments.
    InvalidQuery(String),

    /// Node not found.
    NotFound {
        /// Node type.
        type_name: String,
        /// Node ID.
        id: String,
    },

    /// Storage collaborator error.
    Storage(String),

    /// Internal server error.
    Internal(String),
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemaInitializing => {
                write!(f, "GraphQL schema is initializing, please retry")
            }
            Self::SchemaBuildFailed(msg) => {
                write!(f, "Failed to build GraphQL schema: {msg}")
            }
            Self::Compile(err) => write!(f, "Schema compilation failed: {err}"),
            Self::InvalidQuery(msg) => {
                write!(f, "Invalid GraphQL query: {msg}")
            }
            Self::NotFound { type_name, id } => {
                write!(f, "{type_name}/{id} not found")
            }
            Self::Storage(msg) => {
                write!(f, "Storage error: {msg}")
            }
            Self::Internal(msg) => {
                write!(f, "Internal error: {msg}")
            }
        }
    }
}

impl std::error::Error for GraphQLError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Compile(err) => Some(err),
            _ => None,
        }
    }
}

impl GraphQLError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::SchemaInitializing => 503,
            Self::SchemaBuildFailed(_) | Self::Compile(_) => 500,
            Self::InvalidQuery(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Storage(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for GraphQL error extensions.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SchemaInitializing => "SCHEMA_INITIALIZING",
            Self::SchemaBuildFailed(_) => "SCHEMA_BUILD_FAILED",
            Self::Compile(_) => "COMPILE_ERROR",
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the Retry-After header value in seconds, if applicable.
    #[must_use]
    pub fn retry_after(&self) -> Option<u32> {
        match self {
            Self::SchemaInitializing => Some(5),
            _ => None,
        }
    }

    /// Converts this error into an async-graphql field error carrying the
    /// error code as an extension.
    #[must_use]
    pub fn into_field_error(self) -> async_graphql::Error {
        let code = self.error_code();
        async_graphql::Error::new(self.to_string()).extend_with(|_, ext| ext.set("code", code))
    }
}

impl From<StorageError> for GraphQLError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { type_name, id } => Self::NotFound { type_name, id },
            StorageError::InvalidParams { message } => Self::InvalidQuery(message),
            StorageError::InvalidCursor { cursor } => {
                Self::InvalidQuery(format!("invalid cursor '{cursor}'"))
            }
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<CompileError> for GraphQLError {
    fn from(err: CompileError) -> Self {
        Self::Compile(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(GraphQLError::SchemaInitializing.status_code(), 503);
        assert_eq!(GraphQLError::InvalidQuery("test".into()).status_code(), 400);
        assert_eq!(
            GraphQLError::NotFound {
                type_name: "BfPerson".into(),
                id: "p1".into()
            }
            .status_code(),
            404
        );
        assert_eq!(
            GraphQLError::from(CompileError::Declaration {
                type_name: "BfPerson".into(),
                source: DeclarationError::DuplicateField {
                    name: "name".into()
                },
            })
            .status_code(),
            500
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            GraphQLError::SchemaInitializing.error_code(),
            "SCHEMA_INITIALIZING"
        );
        let err = GraphQLError::from(CompileError::UnknownTarget {
            owner: "BfPerson".into(),
            field: "account".into(),
            target: "Nope".into(),
        });
        assert_eq!(err.error_code(), "COMPILE_ERROR");
        assert_eq!(
            err.to_string(),
            "Schema compilation failed: BfPerson.account references unknown type 'Nope'"
        );
    }

    #[test]
    fn test_retry_after() {
        assert_eq!(GraphQLError::SchemaInitializing.retry_after(), Some(5));
        assert_eq!(GraphQLError::Internal("x".into()).retry_after(), None);
    }

    #[test]
    fn test_from_storage_error() {
        let err = GraphQLError::from(StorageError::not_found("BfPerson", "p1"));
        assert!(matches!(err, GraphQLError::NotFound { .. }));

        let err = GraphQLError::from(StorageError::invalid_cursor("zzz"));
        assert_eq!(err.status_code(), 400);

        let err = GraphQLError::from(StorageError::internal("boom"));
        assert_eq!(err.error_code(), "STORAGE_ERROR");
    }

    #[test]
    fn test_declaration_error_messages() {
        let err = DeclarationError::ReservedMutationName {
            name: "update".into(),
        };
        assert_eq!(
            err.to_string(),
            "custom mutation 'update' collides with the standard 'update' mutation"
        );
    }
}
