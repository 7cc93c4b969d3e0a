//! Resolvers wrapping user-supplied [`ResolverFn`]s.

use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use bfdb_storage::NodeRecord;
use tracing::{debug, warn};

use super::{PayloadValue, args_to_json, get_graphql_context, json_to_graphql_value, to_field_value};
use crate::builder::{ResolverFn, ResolverInput};
use crate::compiler::ValueShape;
use crate::error::GraphQLError;

/// Builds the resolver input for the current field.
fn resolver_input(ctx: &ResolverContext<'_>) -> Result<ResolverInput, async_graphql::Error> {
    let context = get_graphql_context(ctx)?.clone();
    let source = ctx.parent_value.downcast_ref::<NodeRecord>().cloned();
    let args = args_to_json(ctx)?;
    Ok(ResolverInput {
        source,
        args,
        context,
    })
}

/// Resolver for fields declared with a custom resolver.
pub struct CustomFieldResolver;

impl CustomFieldResolver {
    /// Creates a resolver calling `resolver` with the parent node and the
    /// field arguments.
    pub fn resolve(
        field_name: String,
        resolver: ResolverFn,
        shape: ValueShape,
        abstract_type: bool,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let field_name = field_name.clone();
            let resolver = resolver.clone();
            FieldFuture::new(async move {
                let input = resolver_input(&ctx)?;
                debug!(field = %field_name, "Calling custom field resolver");

                let json = resolver.call(input).await.map_err(|e| {
                    warn!(error = %e, field = %field_name, "Custom field resolver failed");
                    e.into_field_error()
                })?;

                to_field_value(json, shape, abstract_type)
            })
        }
    }
}

/// Resolver for custom mutations.
///
/// With a payload type the resolver must return a JSON object whose keys
/// are read by the payload fields. Without one the result is returned as
/// a `JSON` value.
pub struct CustomMutationResolver;

impl CustomMutationResolver {
    /// Creates a resolver for the named custom mutation.
    pub fn resolve(
        mutation_name: String,
        resolver: ResolverFn,
        payload: bool,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let mutation_name = mutation_name.clone();
            let resolver = resolver.clone();
            FieldFuture::new(async move {
                let input = resolver_input(&ctx)?;
                debug!(mutation = %mutation_name, payload, "Processing custom mutation");

                let json = resolver.call(input).await.map_err(|e| {
                    warn!(error = %e, mutation = %mutation_name, "Custom mutation failed");
                    e.into_field_error()
                })?;

                if !payload {
                    return Ok(Some(FieldValue::value(json_to_graphql_value(json))));
                }

                match json {
                    serde_json::Value::Null => Ok(None),
                    serde_json::Value::Object(map) => {
                        Ok(Some(FieldValue::owned_any(PayloadValue(map))))
                    }
                    other => Err(GraphQLError::Internal(format!(
                        "mutation '{mutation_name}' must return an object, got {other}"
                    ))
                    .into_field_error()),
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_custom_resolvers_created() {
        let resolver = ResolverFn::new(|_| async { Ok(json!({"message": "hi"})) });
        let _field = CustomFieldResolver::resolve(
            "greeting".to_string(),
            resolver.clone(),
            ValueShape::Leaf,
            false,
        );
        let _mutation = CustomMutationResolver::resolve("greet".to_string(), resolver, true);
    }
}
