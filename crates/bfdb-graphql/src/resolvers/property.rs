//! Default field resolver.

use async_graphql::dynamic::{FieldFuture, ResolverContext};
use bfdb_storage::NodeRecord;
use tracing::trace;

use super::{PayloadValue, to_field_value};
use crate::compiler::ValueShape;

/// Reads a field straight off its parent.
///
/// On a node this is `id` or the property of the same name; on a payload it
/// is the key of the same name. Missing values resolve to `null`.
pub struct PropertyResolver;

impl PropertyResolver {
    /// Creates a resolver for the named field.
    ///
    /// # Arguments
    /// * `field_name` - The field (and property) name
    /// * `shape` - How the stored JSON maps onto the field type
    /// * `abstract_type` - Whether the field type is an interface
    pub fn resolve(
        field_name: String,
        shape: ValueShape,
        abstract_type: bool,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let field_name = field_name.clone();
            FieldFuture::new(async move {
                let value = if let Some(node) = ctx.parent_value.downcast_ref::<NodeRecord>() {
                    node.field(&field_name)
                } else if let Some(payload) = ctx.parent_value.downcast_ref::<PayloadValue>() {
                    payload.0.get(&field_name).cloned()
                } else {
                    None
                };

                trace!(field = %field_name, found = value.is_some(), "Resolving property");

                match value {
                    Some(json) => to_field_value(json, shape, abstract_type),
                    None => Ok(None),
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_resolver_created() {
        let _resolver = PropertyResolver::resolve("name".to_string(), ValueShape::Leaf, false);
    }
}
