//! Delete mutation resolver.
//!
//! Handles `delete{Type}` mutations through the CRUD collaborator.

use async_graphql::Value;
use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use tracing::{debug, trace, warn};

use super::{get_graphql_context, storage_error};

/// Resolver for node delete mutations.
///
/// Handles mutations like:
/// ```graphql
/// mutation {
///   deleteBfPerson(id: "p1")
/// }
/// ```
///
/// Returns `true` if a node was removed, `false` if none existed.
pub struct DeleteResolver;

impl DeleteResolver {
    /// Creates a resolver for node deletion.
    ///
    /// # Arguments
    /// * `type_name` - The node type (e.g., "BfPerson")
    pub fn resolve(
        type_name: String,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let type_name = type_name.clone();

            FieldFuture::new(async move {
                debug!(type_name = %type_name, "Processing delete mutation");

                let gql_ctx = get_graphql_context(&ctx)?;

                let id = ctx
                    .args
                    .get("id")
                    .and_then(|v| v.string().ok())
                    .ok_or_else(|| async_graphql::Error::new("Missing required argument 'id'"))?;

                trace!(type_name = %type_name, id = %id, "Deleting node via store");

                let deleted = gql_ctx
                    .store
                    .delete(&type_name, id)
                    .await
                    .map_err(|e| {
                        warn!(error = %e, type_name = %type_name, id = %id, "Delete failed");
                        storage_error(e)
                    })?;

                debug!(type_name = %type_name, id = %id, deleted, "Delete finished");
                Ok(Some(FieldValue::value(Value::Boolean(deleted))))
            })
        }
    }
}
