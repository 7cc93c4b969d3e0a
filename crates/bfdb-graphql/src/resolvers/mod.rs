//! Resolvers behind the compiled definitions.
//!
//! Every compiled [`Resolution`](crate::compiler::Resolution) maps onto one
//! resolver here:
//! - `property`: default field access on nodes and payloads
//! - `relation`: single-node relations through the traversal collaborator
//! - `connection`: paginated relations and the edge/page info support types
//! - `update` / `delete`: standard mutations through the CRUD collaborator
//! - `custom`: user resolvers on fields and custom mutations
//!
//! Parent values are passed as owned `Any` values: nodes as
//! [`NodeRecord`], payloads as [`PayloadValue`], and the storage
//! connection types as-is.

mod connection;
mod custom;
mod delete;
mod property;
mod relation;
mod update;

pub use connection::ConnectionResolver;
pub use custom::{CustomFieldResolver, CustomMutationResolver};
pub use delete::DeleteResolver;
pub use property::PropertyResolver;
pub use relation::RelationResolver;
pub use update::UpdateResolver;

use async_graphql::dynamic::{FieldValue, ResolverContext};
use async_graphql::{Error, Name, Value};
use bfdb_storage::{NodeRecord, StorageError};
use serde_json::Map;

use crate::compiler::ValueShape;
use crate::context::GraphQLContext;
use crate::error::GraphQLError;

/// Parent value of payload type fields.
#[derive(Debug, Clone)]
pub struct PayloadValue(pub Map<String, serde_json::Value>);

/// Helper to extract GraphQL context from resolver context.
pub(crate) fn get_graphql_context<'a>(
    ctx: &'a ResolverContext<'_>,
) -> Result<&'a GraphQLContext, Error> {
    ctx.data::<GraphQLContext>()
        .map_err(|_| Error::new("GraphQL context not available"))
}

/// Converts a storage error into a field error with an error code.
pub(crate) fn storage_error(err: StorageError) -> Error {
    GraphQLError::from(err).into_field_error()
}

/// Returns the parent node, failing on root fields.
pub(crate) fn parent_node<'a>(ctx: &'a ResolverContext<'_>) -> Result<&'a NodeRecord, Error> {
    ctx.parent_value
        .try_downcast_ref::<NodeRecord>()
        .map_err(|_| Error::new("field can only be resolved on a node"))
}

/// Collects the field arguments as JSON.
pub(crate) fn args_to_json(
    ctx: &ResolverContext<'_>,
) -> Result<Map<String, serde_json::Value>, Error> {
    let mut args = Map::new();
    for (name, value) in ctx.args.iter() {
        let json = value
            .as_value()
            .clone()
            .into_json()
            .map_err(|e| Error::new(format!("invalid argument '{name}': {e}")))?;
        args.insert(name.to_string(), json);
    }
    Ok(args)
}

/// Wraps a node as a field value. Interface-typed fields need the concrete
/// type name attached.
pub(crate) fn node_field_value<'a>(node: NodeRecord, abstract_type: bool) -> FieldValue<'a> {
    if abstract_type {
        let type_name = node.type_name.clone();
        FieldValue::owned_any(node).with_type(type_name)
    } else {
        FieldValue::owned_any(node)
    }
}

/// Converts a resolved JSON value into a field value of the given shape.
///
/// `null` resolves to `None`; arrays become lists of the same shape.
pub(crate) fn to_field_value<'a>(
    json: serde_json::Value,
    shape: ValueShape,
    abstract_type: bool,
) -> Result<Option<FieldValue<'a>>, Error> {
    if json.is_null() {
        return Ok(None);
    }

    match shape {
        ValueShape::Leaf => Ok(Some(FieldValue::value(json_to_graphql_value(json)))),
        ValueShape::Enum => Ok(Some(FieldValue::value(json_to_enum_value(json)?))),
        ValueShape::Node => match json {
            serde_json::Value::Array(items) => {
                let nodes = items
                    .into_iter()
                    .map(|item| json_to_node(item).map(|n| node_field_value(n, abstract_type)))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Some(FieldValue::list(nodes)))
            }
            other => Ok(Some(node_field_value(json_to_node(other)?, abstract_type))),
        },
    }
}

fn json_to_node(json: serde_json::Value) -> Result<NodeRecord, Error> {
    serde_json::from_value(json).map_err(|e| Error::new(format!("expected a node record: {e}")))
}

fn json_to_enum_value(json: serde_json::Value) -> Result<Value, Error> {
    match json {
        serde_json::Value::String(s) => Ok(Value::Enum(Name::new(s))),
        serde_json::Value::Array(items) => Ok(Value::List(
            items
                .into_iter()
                .map(json_to_enum_value)
                .collect::<Result<_, _>>()?,
        )),
        other => Err(Error::new(format!("expected an enum member, got {other}"))),
    }
}

/// Convert a serde_json::Value to async_graphql::Value.
pub(crate) fn json_to_graphql_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else if let Some(f) = n.as_f64() {
                Value::Number(
                    async_graphql::Number::from_f64(f)
                        .unwrap_or_else(|| async_graphql::Number::from(0)),
                )
            } else {
                Value::Null
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::List(arr.into_iter().map(json_to_graphql_value).collect())
        }
        serde_json::Value::Object(obj) => {
            let map: async_graphql::indexmap::IndexMap<Name, Value> = obj
                .into_iter()
                .map(|(k, v)| (Name::new(k), json_to_graphql_value(v)))
                .collect();
            Value::Object(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_json_to_graphql_scalars() {
        assert!(matches!(json_to_graphql_value(json!(null)), Value::Null));
        assert!(matches!(
            json_to_graphql_value(json!(true)),
            Value::Boolean(true)
        ));
        assert!(matches!(
            json_to_graphql_value(json!("Ada")),
            Value::String(ref s) if s == "Ada"
        ));
    }

    #[test]
    fn test_json_to_graphql_nested() {
        let value = json_to_graphql_value(json!({"tags": ["a", "b"], "n": 1.5}));
        let Value::Object(map) = value else {
            panic!("expected object");
        };
        assert!(matches!(map.get("tags"), Some(Value::List(items)) if items.len() == 2));
        assert!(matches!(map.get("n"), Some(Value::Number(_))));
    }

    #[test]
    fn test_enum_conversion() {
        assert!(matches!(
            json_to_enum_value(json!("ACTIVE")),
            Ok(Value::Enum(ref name)) if name.as_str() == "ACTIVE"
        ));
        assert!(json_to_enum_value(json!(3)).is_err());
    }

    #[test]
    fn test_json_to_node() {
        let node = json_to_node(json!({"id": "p1", "typeName": "BfPerson"})).unwrap();
        assert_eq!(node.key(), "BfPerson/p1");
        assert!(json_to_node(json!({"id": "p1"})).is_err());
    }

    #[test]
    fn test_null_resolves_to_none() {
        assert!(
            to_field_value(json!(null), ValueShape::Node, false)
                .unwrap()
                .is_none()
        );
    }
}
