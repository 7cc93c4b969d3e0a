//! Node types served by the demo server.

use bfdb_db_memory::InMemoryGraph;
use bfdb_graphql::{
    ArgSpec, CompileError, DeclarationError, EnumRef, GqlNode, GqlNodeSpec, GraphQLError,
    NodeRegistry, PayloadField, PayloadSpec, ResolverFn, TargetRef, define_gql_interface,
    define_gql_node,
};
use bfdb_storage::NodeRecord;
use serde_json::json;

/// Common interface of every demo node.
pub struct BfNode;

impl GqlNode for BfNode {
    const TYPE_NAME: &'static str = "BfNode";

    fn gql_spec() -> Result<Option<GqlNodeSpec>, DeclarationError> {
        define_gql_interface(|field, _, _| {
            field.id("id");
        })
        .map(Some)
    }
}

pub struct BfAccount;

impl GqlNode for BfAccount {
    const TYPE_NAME: &'static str = "BfAccount";

    fn gql_spec() -> Result<Option<GqlNodeSpec>, DeclarationError> {
        define_gql_node(|field, relation, mutation| {
            field.id("id");
            field.string("handle");
            field.nullable().date("createdAt");
            relation.one_in("owner", TargetRef::of::<BfPerson>());
            mutation.update();
        })
        .map(|spec| Some(spec.implements(BfNode::TYPE_NAME)))
    }
}

pub struct BfPerson;

impl GqlNode for BfPerson {
    const TYPE_NAME: &'static str = "BfPerson";

    fn gql_spec() -> Result<Option<GqlNodeSpec>, DeclarationError> {
        define_gql_node(|field, relation, mutation| {
            field.id("id");
            field.string("name");
            field.nullable().string("email");
            field
                .nullable()
                .enumeration("status", EnumRef::new(["ACTIVE", "INVITED", "DISABLED"]));
            field.nullable().json("settings");
            relation.one("account", TargetRef::of::<BfAccount>());
            relation.many_out("following", TargetRef::of::<BfPerson>());
            relation.many_in("followers", TargetRef::of::<BfPerson>());
            mutation.update().delete().custom_with_payload(
                "greet",
                [("to", ArgSpec::string())],
                PayloadSpec::new()
                    .field("message", PayloadField::string().non_null())
                    .field("person", PayloadField::object(TargetRef::of::<BfPerson>())),
                greet(),
            );
        })
        .map(|spec| Some(spec.implements(BfNode::TYPE_NAME)))
    }
}

/// Server-side bookkeeping type, never exposed.
pub struct BfAuditEntry;

impl GqlNode for BfAuditEntry {
    const TYPE_NAME: &'static str = "BfAuditEntry";

    fn gql_spec() -> Result<Option<GqlNodeSpec>, DeclarationError> {
        Ok(None)
    }
}

fn greet() -> ResolverFn {
    ResolverFn::new(|input| async move {
        let to = input.arg_str("to").unwrap_or("world").to_string();
        let person = match input.source {
            Some(person) => Some(person),
            None => input.context.store.load(BfPerson::TYPE_NAME, &to).await?,
        };
        Ok(json!({
            "message": format!("hello, {to}"),
            "person": person,
        }))
    })
}

/// Loads a node of `type_name` by the `id` argument.
fn load_by_id(type_name: &'static str) -> ResolverFn {
    ResolverFn::new(move |input| async move {
        let Some(id) = input.arg_str("id").map(ToString::to_string) else {
            return Err(GraphQLError::InvalidQuery("missing 'id'".into()));
        };
        let node = input.context.store.load(type_name, &id).await?;
        serde_json::to_value(node).map_err(|e| GraphQLError::Internal(e.to_string()))
    })
}

/// Loads any node by the `typeName` and `id` arguments.
fn load_node() -> ResolverFn {
    ResolverFn::new(|input| async move {
        let (Some(type_name), Some(id)) = (input.arg_str("typeName"), input.arg_str("id")) else {
            return Err(GraphQLError::InvalidQuery("missing 'typeName' or 'id'".into()));
        };
        let node = input.context.store.load(type_name, id).await?;
        serde_json::to_value(node).map_err(|e| GraphQLError::Internal(e.to_string()))
    })
}

/// Query root entry points.
fn query_spec() -> Result<GqlNodeSpec, DeclarationError> {
    define_gql_node(|field, _, _| {
        field
            .nullable()
            .object("person", TargetRef::of::<BfPerson>())
            .arg("id", ArgSpec::id().non_null())
            .resolve(load_by_id(BfPerson::TYPE_NAME));
        field
            .nullable()
            .object("account", TargetRef::of::<BfAccount>())
            .arg("id", ArgSpec::id().non_null())
            .resolve(load_by_id(BfAccount::TYPE_NAME));
        field
            .nullable()
            .object("node", TargetRef::of::<BfNode>())
            .arg("typeName", ArgSpec::string().non_null())
            .arg("id", ArgSpec::id().non_null())
            .resolve(load_node());
    })
}

/// Registers every demo node type, in emission order.
pub fn register_models(registry: &mut NodeRegistry) -> Result<(), CompileError> {
    registry
        .register::<BfNode>()?
        .register::<BfPerson>()?
        .register::<BfAccount>()?
        .register::<BfAuditEntry>()?;

    let query = query_spec().map_err(|source| CompileError::Declaration {
        type_name: "Query".to_string(),
        source,
    })?;
    registry.register_spec("Query", Some(query));
    Ok(())
}

/// Seeds the demo graph: two people following each other, one account.
pub async fn seed_demo_graph(graph: &InMemoryGraph) {
    let ada = graph.insert(
        NodeRecord::new(BfPerson::TYPE_NAME, "ada")
            .with_prop("name", "Ada Lovelace")
            .with_prop("email", "ada@example.com")
            .with_prop("status", "ACTIVE"),
    );
    let grace = graph.insert(
        NodeRecord::new(BfPerson::TYPE_NAME, "grace")
            .with_prop("name", "Grace Hopper")
            .with_prop("status", "INVITED"),
    );
    let account = graph.insert(
        NodeRecord::new(BfAccount::TYPE_NAME, "ada-main")
            .with_prop("handle", "@ada")
            .with_prop("createdAt", "1843-07-10"),
    );

    graph.connect(&ada, &account).await;
    graph.connect(&ada, &grace).await;
    graph.connect(&grace, &ada).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_models() {
        let mut registry = NodeRegistry::new();
        register_models(&mut registry).unwrap();

        let names: Vec<_> = registry.type_names().collect();
        assert_eq!(
            names,
            vec!["BfNode", "BfPerson", "BfAccount", "BfAuditEntry", "Query"]
        );
        assert!(registry.load_model_types().is_ok());
    }

    #[tokio::test]
    async fn test_seed_demo_graph() {
        let graph = InMemoryGraph::new();
        seed_demo_graph(&graph).await;
        assert_eq!(graph.node_count(), 3);
    }
}
