//! Axum HTTP handlers for the GraphQL endpoint.
//!
//! - `POST /graphql` - GraphQL request in the JSON body
//! - `GET /graphql` - GraphQL request in the URL query string
//!
//! Both go through [`LazySchema`], so the first request pays for compiling
//! the registered specs.

use std::sync::Arc;

use async_graphql::{Request, Response, Variables};
use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response as HttpResponse};
use bfdb_storage::{DynNodeGraph, DynNodeStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::context::{ContextBuilderError, GraphQLContext, GraphQLContextBuilder};
use crate::error::GraphQLError;
use crate::schema::LazySchema;

/// State shared across GraphQL handlers.
#[derive(Clone)]
pub struct GraphQLState {
    /// Lazy-loaded GraphQL schema.
    pub lazy_schema: Arc<LazySchema>,

    /// Shared collaborators cloned into each request's context.
    pub context_template: GraphQLContextTemplate,
}

/// Template for building per-request GraphQL context.
#[derive(Clone)]
pub struct GraphQLContextTemplate {
    pub graph: DynNodeGraph,
    pub store: DynNodeStore,
}

impl GraphQLContextTemplate {
    /// Creates a template from the two collaborators.
    #[must_use]
    pub fn new(graph: DynNodeGraph, store: DynNodeStore) -> Self {
        Self { graph, store }
    }

    /// Builds the context of one request.
    ///
    /// # Errors
    ///
    /// Returns an error if a collaborator is missing.
    pub fn build(&self, request_id: String) -> Result<GraphQLContext, ContextBuilderError> {
        GraphQLContextBuilder::new()
            .with_graph(self.graph.clone())
            .with_store(self.store.clone())
            .with_request_id(request_id)
            .build()
    }
}

/// GraphQL request body.
#[derive(Debug, Deserialize)]
pub struct GraphQLRequest {
    /// The GraphQL query string.
    pub query: String,

    /// Optional operation name for multi-operation documents.
    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,

    /// Optional variables for the query.
    pub variables: Option<serde_json::Value>,
}

/// Query parameters for GET requests.
#[derive(Debug, Deserialize)]
pub struct GraphQLQueryParams {
    /// The GraphQL query string.
    pub query: Option<String>,

    /// Optional operation name.
    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,

    /// Optional variables (JSON string).
    pub variables: Option<String>,
}

/// GraphQL response body.
#[derive(Debug, Serialize)]
pub struct GraphQLResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

impl From<Response> for GraphQLResponse {
    fn from(resp: Response) -> Self {
        let data = serde_json::to_value(&resp.data)
            .ok()
            .filter(|data| !data.is_null());

        let errors = resp
            .errors
            .iter()
            .map(|e| serde_json::to_value(e).unwrap_or_else(|_| serde_json::json!({ "message": e.message })))
            .collect();

        let extensions = if resp.extensions.is_empty() {
            None
        } else {
            serde_json::to_value(&resp.extensions).ok()
        };

        Self {
            data,
            errors,
            extensions,
        }
    }
}

/// Handles `POST /graphql`.
pub async fn graphql_handler(
    State(state): State<GraphQLState>,
    headers: HeaderMap,
    Json(request): Json<GraphQLRequest>,
) -> HttpResponse {
    debug!("Processing GraphQL request");
    execute_graphql(&state, &headers, request).await
}

/// Handles `GET /graphql`.
pub async fn graphql_handler_get(
    State(state): State<GraphQLState>,
    headers: HeaderMap,
    Query(params): Query<GraphQLQueryParams>,
) -> HttpResponse {
    let request = match params_to_request(params) {
        Ok(req) => req,
        Err(e) => return error_response(&GraphQLError::InvalidQuery(e.to_string())),
    };

    debug!("Processing GraphQL GET request");
    execute_graphql(&state, &headers, request).await
}

/// Checks if a GraphQL query is an introspection query.
fn is_introspection_query(query: &str) -> bool {
    query.contains("__schema") || query.contains("__type") || query.contains("IntrospectionQuery")
}

/// Executes a GraphQL request against the lazily built schema.
///
/// Introspection waits for an in-progress build; other queries get a 503
/// with `Retry-After` instead.
pub async fn execute_graphql(
    state: &GraphQLState,
    headers: &HeaderMap,
    request: GraphQLRequest,
) -> HttpResponse {
    let schema = if is_introspection_query(&request.query) {
        debug!("Introspection query detected, waiting for schema build if needed");
        state.lazy_schema.get_or_build_wait().await
    } else {
        state.lazy_schema.get_or_build().await
    };

    let schema = match schema {
        Ok(schema) => schema,
        Err(e) => {
            if !matches!(e, GraphQLError::SchemaInitializing) {
                warn!(error = %e, "Schema build failed");
            }
            return error_response(&e);
        }
    };

    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let context = match state.context_template.build(request_id.clone()) {
        Ok(ctx) => ctx,
        Err(e) => return error_response(&GraphQLError::Internal(e.to_string())),
    };

    let mut gql_request = Request::new(&request.query);

    if let Some(op_name) = request.operation_name {
        gql_request = gql_request.operation_name(op_name);
    }

    if let Some(vars) = request.variables {
        gql_request = gql_request.variables(Variables::from_json(vars));
    }

    gql_request = gql_request.data(context);

    debug!(request_id = %request_id, query = %request.query, "Executing GraphQL query");
    let response = schema.execute(gql_request).await;

    // Execution errors still answer 200, per GraphQL-over-HTTP
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(GraphQLResponse::from(response)),
    )
        .into_response()
}

/// Converts GET query params to a GraphQL request.
fn params_to_request(params: GraphQLQueryParams) -> Result<GraphQLRequest, serde_json::Error> {
    let variables = params
        .variables
        .map(|vars| serde_json::from_str(&vars))
        .transpose()?;

    Ok(GraphQLRequest {
        query: params.query.unwrap_or_default(),
        operation_name: params.operation_name,
        variables,
    })
}

/// Returns a request-level error response.
fn error_response(error: &GraphQLError) -> HttpResponse {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = serde_json::json!({
        "errors": [{
            "message": error.to_string(),
            "extensions": { "code": error.error_code() }
        }]
    });

    let mut response = (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response();

    if let Some(seconds) = error.retry_after() {
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, header::HeaderValue::from(seconds));
    }

    response
}
