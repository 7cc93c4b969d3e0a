//! Custom resolver functions attached to fields and custom mutations.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use bfdb_storage::NodeRecord;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::{Map, Value};

use crate::context::GraphQLContext;
use crate::error::GraphQLError;

/// What a custom resolver produces.
///
/// Leaf fields and payload-less mutations return any JSON value. Node-valued
/// fields return a serialized [`NodeRecord`] (or `null`), payload mutations
/// return a JSON object keyed by payload field.
pub type ResolverResult = Result<Value, GraphQLError>;

/// Input handed to a custom resolver.
#[derive(Debug, Clone)]
pub struct ResolverInput {
    /// The node the field is resolved on. `None` on root fields.
    pub source: Option<NodeRecord>,

    /// Field arguments as JSON, keyed by argument name.
    pub args: Map<String, Value>,

    /// The request context.
    pub context: GraphQLContext,
}

impl ResolverInput {
    /// Returns an argument as a string, if present and a string.
    #[must_use]
    pub fn arg_str(&self, name: &str) -> Option<&str> {
        self.args.get(name).and_then(Value::as_str)
    }

    /// Returns the source node or an error naming the field that needed it.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::Internal` on root fields.
    pub fn require_source(&self, field: &str) -> Result<&NodeRecord, GraphQLError> {
        self.source
            .as_ref()
            .ok_or_else(|| GraphQLError::Internal(format!("'{field}' needs a parent node")))
    }
}

type BoxedResolver = dyn Fn(ResolverInput) -> BoxFuture<'static, ResolverResult> + Send + Sync;

/// A shareable async resolver function.
#[derive(Clone)]
pub struct ResolverFn(Arc<BoxedResolver>);

impl ResolverFn {
    /// Wraps an async closure.
    ///
    /// ```ignore
    /// let greet = ResolverFn::new(|input| async move {
    ///     let to = input.arg_str("to").unwrap_or("world");
    ///     Ok(json!({ "message": format!("hello, {to}") }))
    /// });
    /// ```
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(ResolverInput) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResolverResult> + Send + 'static,
    {
        Self(Arc::new(move |input| f(input).boxed()))
    }

    /// Invokes the resolver.
    pub async fn call(&self, input: ResolverInput) -> ResolverResult {
        (self.0)(input).await
    }
}

impl fmt::Debug for ResolverFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResolverFn")
    }
}
