//! Update mutation resolver.
//!
//! Handles `update{Type}` mutations through the CRUD collaborator.

use async_graphql::dynamic::{FieldFuture, ResolverContext};
use tracing::{debug, trace, warn};

use super::{get_graphql_context, node_field_value, storage_error};

/// Resolver for node update mutations.
///
/// Handles mutations like:
/// ```graphql
/// mutation {
///   updateBfPerson(id: "p1", params: { name: "Ada" }) {
///     id
///     name
///   }
/// }
/// ```
///
/// `params` is merged into the stored node; a missing `params` leaves the
/// node unchanged. Returns the updated node.
pub struct UpdateResolver;

impl UpdateResolver {
    /// Creates a resolver for node updates.
    ///
    /// # Arguments
    /// * `type_name` - The node type (e.g., "BfPerson")
    pub fn resolve(
        type_name: String,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let type_name = type_name.clone();

            FieldFuture::new(async move {
                debug!(type_name = %type_name, "Processing update mutation");

                let gql_ctx = get_graphql_context(&ctx)?;

                let id = ctx
                    .args
                    .get("id")
                    .and_then(|v| v.string().ok())
                    .ok_or_else(|| async_graphql::Error::new("Missing required argument 'id'"))?;

                let params = match ctx.args.get("params") {
                    Some(value) if !value.is_null() => value.as_value().clone().into_json()?,
                    _ => serde_json::Value::Object(serde_json::Map::new()),
                };

                trace!(type_name = %type_name, id = %id, "Updating node via store");

                let node = gql_ctx
                    .store
                    .update(&type_name, id, &params)
                    .await
                    .map_err(|e| {
                        warn!(error = %e, type_name = %type_name, id = %id, "Update failed");
                        storage_error(e)
                    })?;

                debug!(type_name = %type_name, id = %id, "Node updated");
                Ok(Some(node_field_value(node, false)))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_resolver_created() {
        let _resolver = UpdateResolver::resolve("BfPerson".to_string());
    }
}
