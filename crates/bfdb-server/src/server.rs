//! Router assembly and the serve loop.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use bfdb_db_memory::InMemoryGraph;
use bfdb_graphql::{
    BfSchemaBuilder, GraphQLContextTemplate, GraphQLState, LazySchema, NodeRegistry,
    graphql_handler, graphql_handler_get,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::models;

/// Builds the GraphQL state over the given graph.
pub fn graphql_state(config: &AppConfig, registry: NodeRegistry, graph: Arc<InMemoryGraph>) -> GraphQLState {
    let builder = BfSchemaBuilder::new(registry, config.graphql.to_schema_builder_config());
    GraphQLState {
        lazy_schema: Arc::new(LazySchema::new(builder)),
        context_template: GraphQLContextTemplate::new(graph.clone(), graph),
    }
}

/// Builds the application router.
pub fn build_router(config: &AppConfig, state: GraphQLState) -> Router {
    let mut router = Router::new();

    if config.graphql.enabled {
        router = router.route(
            &config.graphql.path,
            post(graphql_handler).get(graphql_handler_get),
        );
    }

    router.with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(DefaultBodyLimit::max(config.server.body_limit_bytes)),
    )
}

/// Registers the models, builds the router and serves until shutdown.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let mut registry = NodeRegistry::new();
    models::register_models(&mut registry).context("invalid node spec")?;

    let graph = Arc::new(InMemoryGraph::new());
    if config.seed_demo_data {
        models::seed_demo_graph(&graph).await;
        info!(nodes = graph.node_count(), "Seeded demo graph");
    }

    let state = graphql_state(&config, registry, graph);

    // Compile eagerly so spec mistakes surface at startup
    state
        .lazy_schema
        .get_or_build_wait()
        .await
        .context("failed to build GraphQL schema")?;

    let app = build_router(&config, state);
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, path = %config.graphql.path, "bfDb GraphQL server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;

    async fn app(config: &AppConfig) -> Router {
        let mut registry = NodeRegistry::new();
        models::register_models(&mut registry).unwrap();
        let graph = Arc::new(InMemoryGraph::new());
        models::seed_demo_graph(&graph).await;
        build_router(config, graphql_state(config, registry, graph))
    }

    async fn post_query(app: Router, query: &str) -> (StatusCode, serde_json::Value) {
        let body = serde_json::json!({ "query": query }).to_string();
        let response = app
            .oneshot(
                Request::post("/graphql")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_post_graphql() {
        let app = app(&AppConfig::default()).await;

        let (status, body) = post_query(
            app,
            r#"{ person(id: "ada") { name account { handle } followers { count } } }"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["person"]["name"], "Ada Lovelace");
        assert_eq!(body["data"]["person"]["account"]["handle"], "@ada");
        assert_eq!(body["data"]["person"]["followers"]["count"], 1);
    }

    #[tokio::test]
    async fn test_incoming_relation() {
        let app = app(&AppConfig::default()).await;

        let (status, body) =
            post_query(app, r#"{ account(id: "ada-main") { owner { name } } }"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["account"]["owner"]["name"], "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_interface_typed_field() {
        let app = app(&AppConfig::default()).await;

        let (status, body) = post_query(
            app,
            r#"{ node(typeName: "BfAccount", id: "ada-main") {
                id
                ... on BfAccount { handle }
            } }"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"]["node"],
            serde_json::json!({ "id": "ada-main", "handle": "@ada" })
        );
    }

    #[tokio::test]
    async fn test_get_graphql() {
        let app = app(&AppConfig::default()).await;

        let response = app
            .oneshot(
                Request::get("/graphql?query=%7B%20_health%20%7D")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_disabled_graphql_is_not_routed() {
        let mut config = AppConfig::default();
        config.graphql.enabled = false;
        let app = app(&config).await;

        let response = app
            .oneshot(Request::get("/graphql").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
