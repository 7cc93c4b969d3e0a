//! Single-node relation resolver.

use async_graphql::dynamic::{FieldFuture, ResolverContext};
use bfdb_storage::Direction;
use tracing::{debug, warn};

use super::{get_graphql_context, node_field_value, parent_node, storage_error};

/// Resolves a `one` relation by asking the graph for the first connected
/// node of the target type.
///
/// ```graphql
/// query {
///   me { account { id } }
/// }
/// ```
pub struct RelationResolver;

impl RelationResolver {
    /// Creates a resolver for a single-node relation.
    ///
    /// # Arguments
    /// * `target` - Target node type name
    /// * `direction` - Edge direction relative to the parent node
    /// * `abstract_type` - Whether the target is an interface
    pub fn resolve(
        target: String,
        direction: Direction,
        abstract_type: bool,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let target = target.clone();
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let source = parent_node(&ctx)?;

                debug!(
                    source = %source.key(),
                    target = %target,
                    direction = %direction,
                    "Resolving relation"
                );

                let related = gql_ctx
                    .graph
                    .find_one(source, &target, direction)
                    .await
                    .map_err(|e| {
                        warn!(error = %e, source = %source.key(), target = %target, "Relation lookup failed");
                        storage_error(e)
                    })?;

                Ok(related.map(|node| node_field_value(node, abstract_type)))
            })
        }
    }
}
