//! Integration tests for the compiled schema.
//!
//! These tests declare a small bfDb model, build the executable schema and
//! run queries and mutations against the in-memory graph.

use std::sync::Arc;

use async_graphql::Request;
use async_graphql::dynamic::Schema;
use bfdb_db_memory::InMemoryGraph;
use bfdb_graphql::{
    ArgSpec, BfSchemaBuilder, CompileError, DeclarationError, EnumRef, GqlNode, GqlNodeSpec,
    GraphQLContext, GraphQLContextBuilder, GraphQLError, NodeRegistry, PayloadField, PayloadSpec,
    ResolverFn, SchemaBuilderConfig, TargetRef, define_gql_node,
};
use bfdb_storage::NodeRecord;
use serde_json::{Value, json};

// =============================================================================
// Model
// =============================================================================

struct BfAccount;

impl GqlNode for BfAccount {
    const TYPE_NAME: &'static str = "BfAccount";

    fn gql_spec() -> Result<Option<GqlNodeSpec>, DeclarationError> {
        define_gql_node(|field, _, _| {
            field.id("id");
            field.string("handle");
        })
        .map(Some)
    }
}

struct BfPerson;

impl GqlNode for BfPerson {
    const TYPE_NAME: &'static str = "BfPerson";

    fn gql_spec() -> Result<Option<GqlNodeSpec>, DeclarationError> {
        define_gql_node(|field, relation, mutation| {
            field.id("id");
            field.string("name");
            field
                .nullable()
                .enumeration("status", EnumRef::new(["ACTIVE", "INVITED"]));
            field
                .string("greeting")
                .arg("punctuation", ArgSpec::string())
                .resolve(greeting());
            relation.one("account", TargetRef::of::<BfAccount>());
            relation.many_in("followers", TargetRef::of::<BfPerson>());
            mutation
                .update()
                .delete()
                .custom_with_payload(
                    "greet",
                    [("to", ArgSpec::string())],
                    PayloadSpec::new()
                        .field("message", PayloadField::string().non_null())
                        .field("person", PayloadField::object("BfPerson")),
                    greet(),
                )
                .custom("ping", [("echo", ArgSpec::string())], ping());
        })
        .map(Some)
    }
}

struct Hidden;

impl GqlNode for Hidden {
    const TYPE_NAME: &'static str = "Hidden";

    fn gql_spec() -> Result<Option<GqlNodeSpec>, DeclarationError> {
        Ok(None)
    }
}

fn greeting() -> ResolverFn {
    ResolverFn::new(|input| async move {
        let source = input.require_source("greeting")?;
        let name = source
            .field("name")
            .and_then(|v| v.as_str().map(ToString::to_string))
            .unwrap_or_default();
        let punctuation = input.arg_str("punctuation").unwrap_or(".");
        Ok(json!(format!("Hello, {name}{punctuation}")))
    })
}

fn greet() -> ResolverFn {
    ResolverFn::new(|input| async move {
        let to = input.arg_str("to").unwrap_or("world").to_string();
        let person = input.context.store.load("BfPerson", "p1").await?;
        Ok(json!({
            "message": format!("hello, {to}"),
            "person": person,
        }))
    })
}

fn ping() -> ResolverFn {
    ResolverFn::new(|input| async move {
        Ok(json!({ "pong": input.arg_str("echo").unwrap_or("") }))
    })
}

fn person_by_id() -> ResolverFn {
    ResolverFn::new(|input| async move {
        let id = input.arg_str("id").unwrap_or_default().to_string();
        let person = input.context.store.load("BfPerson", &id).await?;
        serde_json::to_value(person).map_err(|e| GraphQLError::Internal(e.to_string()))
    })
}

fn query_spec() -> GqlNodeSpec {
    define_gql_node(|field, _, _| {
        field
            .nullable()
            .object("person", "BfPerson")
            .arg("id", ArgSpec::id().non_null())
            .resolve(person_by_id());
    })
    .unwrap()
}

fn registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    registry
        .register::<BfPerson>()
        .unwrap()
        .register::<BfAccount>()
        .unwrap()
        .register::<Hidden>()
        .unwrap()
        .register_spec("Query", Some(query_spec()));
    registry
}

// =============================================================================
// Fixtures
// =============================================================================

async fn seeded_graph() -> Arc<InMemoryGraph> {
    let graph = Arc::new(InMemoryGraph::new());

    let ada = graph.insert(
        NodeRecord::new("BfPerson", "p1")
            .with_prop("name", "Ada")
            .with_prop("status", "ACTIVE"),
    );
    let grace = graph.insert(NodeRecord::new("BfPerson", "p2").with_prop("name", "Grace"));
    let linus = graph.insert(NodeRecord::new("BfPerson", "p3").with_prop("name", "Linus"));
    let account = graph.insert(NodeRecord::new("BfAccount", "a1").with_prop("handle", "@ada"));

    graph.connect(&ada, &account).await;
    graph.connect(&grace, &ada).await;
    graph.connect(&linus, &ada).await;

    graph
}

async fn build_schema() -> Schema {
    BfSchemaBuilder::new(registry(), SchemaBuilderConfig::default())
        .build()
        .await
        .unwrap()
}

fn context(graph: &Arc<InMemoryGraph>) -> GraphQLContext {
    GraphQLContextBuilder::new()
        .with_graph(graph.clone())
        .with_store(graph.clone())
        .with_request_id("test")
        .build()
        .unwrap()
}

async fn execute(schema: &Schema, graph: &Arc<InMemoryGraph>, query: &str) -> Value {
    let response = schema
        .execute(Request::new(query).data(context(graph)))
        .await;
    assert!(
        response.errors.is_empty(),
        "unexpected errors: {:?}",
        response.errors
    );
    response.data.into_json().unwrap()
}

// =============================================================================
// Queries
// =============================================================================

#[tokio::test]
async fn test_query_scalar_and_enum_fields() {
    let graph = seeded_graph().await;
    let schema = build_schema().await;

    let data = execute(
        &schema,
        &graph,
        r#"{ person(id: "p1") { id name status } }"#,
    )
    .await;

    assert_eq!(
        data,
        json!({ "person": { "id": "p1", "name": "Ada", "status": "ACTIVE" } })
    );
}

#[tokio::test]
async fn test_missing_node_resolves_to_null() {
    let graph = seeded_graph().await;
    let schema = build_schema().await;

    let data = execute(&schema, &graph, r#"{ person(id: "nobody") { id } }"#).await;

    assert_eq!(data, json!({ "person": null }));
}

#[tokio::test]
async fn test_custom_field_resolver_sees_source_and_args() {
    let graph = seeded_graph().await;
    let schema = build_schema().await;

    let data = execute(
        &schema,
        &graph,
        r#"{ person(id: "p2") { greeting(punctuation: "!") } }"#,
    )
    .await;

    assert_eq!(data["person"]["greeting"], "Hello, Grace!");
}

#[tokio::test]
async fn test_one_relation_follows_outgoing_edge() {
    let graph = seeded_graph().await;
    let schema = build_schema().await;

    let data = execute(
        &schema,
        &graph,
        r#"{
            ada: person(id: "p1") { account { id handle } }
            grace: person(id: "p2") { account { id } }
        }"#,
    )
    .await;

    assert_eq!(data["ada"]["account"], json!({ "id": "a1", "handle": "@ada" }));
    assert_eq!(data["grace"]["account"], Value::Null);
}

#[tokio::test]
async fn test_many_relation_follows_incoming_edges() {
    let graph = seeded_graph().await;
    let schema = build_schema().await;

    let data = execute(
        &schema,
        &graph,
        r#"{ person(id: "p1") {
            followers { count edges { node { name } } }
        } }"#,
    )
    .await;

    let followers = &data["person"]["followers"];
    assert_eq!(followers["count"], 2);
    assert_eq!(
        followers["edges"],
        json!([{ "node": { "name": "Grace" } }, { "node": { "name": "Linus" } }])
    );
}

#[tokio::test]
async fn test_connection_pagination() {
    let graph = seeded_graph().await;
    let schema = build_schema().await;

    let first_page = execute(
        &schema,
        &graph,
        r#"{ person(id: "p1") {
            followers(first: 1) {
                edges { cursor node { name } }
                pageInfo { hasNextPage hasPreviousPage endCursor }
            }
        } }"#,
    )
    .await;

    let followers = &first_page["person"]["followers"];
    assert_eq!(followers["edges"][0]["node"]["name"], "Grace");
    assert_eq!(followers["pageInfo"]["hasNextPage"], true);
    assert_eq!(followers["pageInfo"]["hasPreviousPage"], false);

    let cursor = followers["pageInfo"]["endCursor"].as_str().unwrap();
    let query = format!(
        r#"{{ person(id: "p1") {{
            followers(first: 1, after: "{cursor}") {{
                edges {{ node {{ name }} }}
                pageInfo {{ hasNextPage hasPreviousPage }}
            }}
        }} }}"#
    );
    let second_page = execute(&schema, &graph, &query).await;

    let followers = &second_page["person"]["followers"];
    assert_eq!(followers["edges"][0]["node"]["name"], "Linus");
    assert_eq!(followers["pageInfo"]["hasNextPage"], false);
    assert_eq!(followers["pageInfo"]["hasPreviousPage"], true);
}

#[tokio::test]
async fn test_negative_page_size_is_rejected() {
    let graph = seeded_graph().await;
    let schema = build_schema().await;

    let response = schema
        .execute(
            Request::new(r#"{ person(id: "p1") { followers(first: -1) { count } } }"#)
                .data(context(&graph)),
        )
        .await;

    assert_eq!(response.errors.len(), 1);
    let code = response.errors[0]
        .extensions
        .as_ref()
        .and_then(|ext| ext.get("code"))
        .cloned();
    assert_eq!(code, Some(async_graphql::Value::from("INVALID_QUERY")));
}

#[tokio::test]
async fn test_builtin_query_fields() {
    let graph = seeded_graph().await;
    let schema = build_schema().await;

    let data = execute(&schema, &graph, "{ _health _version }").await;

    assert_eq!(data["_health"], "ok");
    assert!(data["_version"].is_string());
}

// =============================================================================
// Mutations
// =============================================================================

#[tokio::test]
async fn test_update_mutation_merges_params() {
    let graph = seeded_graph().await;
    let schema = build_schema().await;

    let data = execute(
        &schema,
        &graph,
        r#"mutation { updateBfPerson(id: "p2", params: { name: "Grace H" }) { id name } }"#,
    )
    .await;

    assert_eq!(
        data,
        json!({ "updateBfPerson": { "id": "p2", "name": "Grace H" } })
    );

    let data = execute(&schema, &graph, r#"{ person(id: "p2") { name } }"#).await;
    assert_eq!(data["person"]["name"], "Grace H");
}

#[tokio::test]
async fn test_update_without_params_keeps_node() {
    let graph = seeded_graph().await;
    let schema = build_schema().await;

    let data = execute(
        &schema,
        &graph,
        r#"mutation { updateBfPerson(id: "p1") { name } }"#,
    )
    .await;

    assert_eq!(data["updateBfPerson"]["name"], "Ada");
}

#[tokio::test]
async fn test_delete_mutation() {
    let graph = seeded_graph().await;
    let schema = build_schema().await;

    let data = execute(&schema, &graph, r#"mutation { deleteBfPerson(id: "p3") }"#).await;
    assert_eq!(data, json!({ "deleteBfPerson": true }));

    let data = execute(&schema, &graph, r#"mutation { deleteBfPerson(id: "p3") }"#).await;
    assert_eq!(data, json!({ "deleteBfPerson": false }));

    let data = execute(
        &schema,
        &graph,
        r#"{ person(id: "p1") { followers { count } } }"#,
    )
    .await;
    assert_eq!(data["person"]["followers"]["count"], 1);
}

#[tokio::test]
async fn test_custom_mutation_with_payload() {
    let graph = seeded_graph().await;
    let schema = build_schema().await;

    let data = execute(
        &schema,
        &graph,
        r#"mutation { greet(to: "Ada") { message person { name } } }"#,
    )
    .await;

    assert_eq!(
        data,
        json!({ "greet": { "message": "hello, Ada", "person": { "name": "Ada" } } })
    );
}

#[tokio::test]
async fn test_custom_mutation_without_payload_returns_json() {
    let graph = seeded_graph().await;
    let schema = build_schema().await;

    let data = execute(&schema, &graph, r#"mutation { ping(echo: "hi") }"#).await;

    assert_eq!(data, json!({ "ping": { "pong": "hi" } }));
}

// =============================================================================
// Schema shape
// =============================================================================

#[tokio::test]
async fn test_sdl_contains_merged_roots() {
    let schema = build_schema().await;
    let sdl = schema.sdl();

    for expected in [
        "type BfPerson",
        "type BfAccount",
        "type BfPersonConnection",
        "type BfPersonEdge",
        "type PageInfo",
        "type BfPersonGreetPayload",
        "enum BfPerson_status_Enum",
        "scalar JSON",
        "updateBfPerson",
        "deleteBfPerson",
        "greet",
        "ping",
        "person(id: ID!): BfPerson",
    ] {
        assert!(sdl.contains(expected), "SDL should contain {expected}");
    }
    assert!(!sdl.contains("Hidden"));
}

#[tokio::test]
async fn test_unknown_target_fails_the_build() {
    let dangling = define_gql_node(|_, relation, _| {
        relation.one("hidden", "Hidden");
    })
    .unwrap();
    let mut registry = registry();
    registry.register_spec("BfDangling", Some(dangling));

    let err = BfSchemaBuilder::new(registry, SchemaBuilderConfig::default())
        .build()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GraphQLError::Compile(CompileError::UnknownTarget { ref target, .. }) if target == "Hidden"
    ));
}

#[test]
fn test_compiled_sdl_is_stable() {
    let first = BfSchemaBuilder::new(registry(), SchemaBuilderConfig::default())
        .sdl()
        .unwrap();
    let second = BfSchemaBuilder::new(registry(), SchemaBuilderConfig::default())
        .sdl()
        .unwrap();

    assert_eq!(first, second);
}
