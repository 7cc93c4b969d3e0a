//! Connection-based pagination resolvers.
//!
//! A `many` relation resolves to a [`Connection`] from the graph
//! collaborator. The `{Target}Connection`, `{Target}Edge` and `PageInfo`
//! support types then read their fields off that value.

use async_graphql::Value;
use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use bfdb_storage::{Connection, ConnectionArgs, Direction, Edge, PageInfo};
use tracing::{debug, trace, warn};

use super::{get_graphql_context, node_field_value, parent_node, storage_error};
use crate::error::GraphQLError;

/// Resolver for paginated relations and their support types.
pub struct ConnectionResolver;

/// Reads a non-negative count argument.
fn count_arg(ctx: &ResolverContext<'_>, name: &str) -> Result<Option<u32>, async_graphql::Error> {
    let Some(value) = ctx.args.get(name) else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    let n = value.i64()?;
    u32::try_from(n).map(Some).map_err(|_| {
        GraphQLError::InvalidQuery(format!("'{name}' must be a non-negative integer, got {n}"))
            .into_field_error()
    })
}

fn cursor_arg(ctx: &ResolverContext<'_>, name: &str) -> Option<String> {
    ctx.args
        .get(name)
        .and_then(|v| v.string().ok())
        .map(ToString::to_string)
}

/// Parses `first`/`after`/`last`/`before` into connection arguments.
fn connection_args(ctx: &ResolverContext<'_>) -> Result<ConnectionArgs, async_graphql::Error> {
    Ok(ConnectionArgs {
        first: count_arg(ctx, "first")?,
        after: cursor_arg(ctx, "after"),
        last: count_arg(ctx, "last")?,
        before: cursor_arg(ctx, "before"),
    })
}

fn parent_connection<'a>(ctx: &'a ResolverContext<'_>) -> Result<&'a Connection, async_graphql::Error> {
    ctx.parent_value
        .try_downcast_ref::<Connection>()
        .map_err(|_| async_graphql::Error::new("expected a connection parent"))
}

fn parent_edge<'a>(ctx: &'a ResolverContext<'_>) -> Result<&'a Edge, async_graphql::Error> {
    ctx.parent_value
        .try_downcast_ref::<Edge>()
        .map_err(|_| async_graphql::Error::new("expected an edge parent"))
}

impl ConnectionResolver {
    /// Creates a resolver for a `many` relation.
    ///
    /// Handles fields like:
    /// ```graphql
    /// query {
    ///   me {
    ///     followers(first: 10, after: "b2Zmc2V0OjA") {
    ///       edges { cursor node { id } }
    ///       pageInfo { hasNextPage endCursor }
    ///     }
    ///   }
    /// }
    /// ```
    pub fn resolve(
        target: String,
        direction: Direction,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let target = target.clone();
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let source = parent_node(&ctx)?;
                let args = connection_args(&ctx)?;

                debug!(
                    source = %source.key(),
                    target = %target,
                    direction = %direction,
                    first = ?args.first,
                    last = ?args.last,
                    "Resolving connection"
                );

                let connection = gql_ctx
                    .graph
                    .find_many(source, &target, direction, &args)
                    .await
                    .map_err(|e| {
                        warn!(error = %e, source = %source.key(), target = %target, "Connection lookup failed");
                        storage_error(e)
                    })?;

                trace!(edges = connection.len(), "Connection resolved");
                Ok(Some(FieldValue::owned_any(connection)))
            })
        }
    }

    /// `{Target}Connection.edges`.
    pub fn edges() -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        |ctx| {
            FieldFuture::new(async move {
                let connection = parent_connection(&ctx)?;
                let edges: Vec<FieldValue<'_>> = connection
                    .edges
                    .iter()
                    .cloned()
                    .map(FieldValue::owned_any)
                    .collect();
                Ok(Some(FieldValue::list(edges)))
            })
        }
    }

    /// `{Target}Connection.pageInfo`.
    pub fn page_info() -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        |ctx| {
            FieldFuture::new(async move {
                let connection = parent_connection(&ctx)?;
                Ok(Some(FieldValue::owned_any(connection.page_info.clone())))
            })
        }
    }

    /// `{Target}Connection.count`: the backend's total, if it reports one.
    pub fn count() -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        |ctx| {
            FieldFuture::new(async move {
                let connection = parent_connection(&ctx)?;
                Ok(connection
                    .total_count
                    .map(|n| FieldValue::value(Value::Number(n.into()))))
            })
        }
    }

    /// `{Target}Edge.cursor`.
    pub fn edge_cursor() -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        |ctx| {
            FieldFuture::new(async move {
                let edge = parent_edge(&ctx)?;
                Ok(Some(FieldValue::value(Value::String(edge.cursor.clone()))))
            })
        }
    }

    /// `{Target}Edge.node`.
    pub fn edge_node(
        abstract_type: bool,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            FieldFuture::new(async move {
                let edge = parent_edge(&ctx)?;
                Ok(Some(node_field_value(edge.node.clone(), abstract_type)))
            })
        }
    }

    /// A `PageInfo` field, by name.
    pub fn page_info_field(
        field_name: String,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let field_name = field_name.clone();
            FieldFuture::new(async move {
                let info = ctx
                    .parent_value
                    .try_downcast_ref::<PageInfo>()
                    .map_err(|_| async_graphql::Error::new("expected a page info parent"))?;

                let value = match field_name.as_str() {
                    "hasNextPage" => Some(Value::Boolean(info.has_next_page)),
                    "hasPreviousPage" => Some(Value::Boolean(info.has_previous_page)),
                    "startCursor" => info.start_cursor.clone().map(Value::String),
                    "endCursor" => info.end_cursor.clone().map(Value::String),
                    other => {
                        return Err(async_graphql::Error::new(format!(
                            "unknown PageInfo field '{other}'"
                        )));
                    }
                };
                Ok(value.map(FieldValue::value))
            })
        }
    }
}
