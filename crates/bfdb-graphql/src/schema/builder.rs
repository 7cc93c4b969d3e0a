//! bfDb GraphQL schema builder.
//!
//! This module provides `BfSchemaBuilder`, which compiles the registered node
//! specs and registers the resulting definitions with async-graphql's dynamic
//! schema API.

use std::collections::HashSet;

use async_graphql::Value;
use async_graphql::dynamic::{
    Enum, EnumItem, Field, FieldFuture, InputValue, Interface, InterfaceField, Object, Scalar,
    Schema, SchemaBuilder, TypeRef,
};
use tracing::{debug, trace};

use crate::compiler::{
    CompiledDefinitions, FieldDefinition, GqlType, MUTATION_ROOT, ObjectDefinition, QUERY_ROOT,
    Resolution, TypeDefinition, render_sdl,
};
use crate::error::{CompileError, GraphQLError};
use crate::registry::NodeRegistry;
use crate::resolvers::{
    ConnectionResolver, CustomFieldResolver, CustomMutationResolver, DeleteResolver,
    PropertyResolver, RelationResolver, UpdateResolver,
};

/// Query fields added to every schema.
const BUILTIN_QUERY_FIELDS: [&str; 2] = ["_health", "_version"];

/// Configuration for the schema builder.
#[derive(Debug, Clone)]
pub struct SchemaBuilderConfig {
    /// Maximum query depth allowed.
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    pub max_complexity: usize,

    /// Whether to enable introspection queries.
    pub introspection_enabled: bool,
}

impl Default for SchemaBuilderConfig {
    fn default() -> Self {
        Self {
            max_depth: 15,
            max_complexity: 500,
            introspection_enabled: true,
        }
    }
}

/// Compiled definitions with the root contributions merged.
struct MergedDefinitions {
    query: ObjectDefinition,
    mutation: Option<ObjectDefinition>,
    types: CompiledDefinitions,
}

/// Builds the GraphQL schema from the registered node specs.
///
/// The schema contains:
/// - Custom scalars, enums and support types emitted by the compiler
/// - One object (or interface) per exposed node type
/// - A `Query` root merged from every contribution, plus `_health`/`_version`
/// - A `Mutation` root merged from every contribution, if there is any
///
/// # Example
///
/// ```ignore
/// let builder = BfSchemaBuilder::new(registry, SchemaBuilderConfig::default());
/// let schema = builder.build().await?;
/// ```
pub struct BfSchemaBuilder {
    /// Registered node types.
    registry: NodeRegistry,

    /// Configuration options.
    config: SchemaBuilderConfig,
}

impl BfSchemaBuilder {
    /// Creates a new schema builder.
    #[must_use]
    pub fn new(registry: NodeRegistry, config: SchemaBuilderConfig) -> Self {
        Self { registry, config }
    }

    /// Returns the registered node types.
    #[must_use]
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Compiles the registry into its definition list.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::Compile` if the specs do not compile.
    pub fn build_definitions(&self) -> Result<CompiledDefinitions, GraphQLError> {
        Ok(self.registry.load_model_types()?)
    }

    /// Renders the compiled definitions as SDL, without building a schema.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::Compile` if the specs do not compile.
    pub fn sdl(&self) -> Result<String, GraphQLError> {
        Ok(render_sdl(&self.build_definitions()?))
    }

    /// Builds the GraphQL schema.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::Compile` if the specs do not compile or two
    /// contributions define the same root field, and
    /// `GraphQLError::SchemaBuildFailed` if async-graphql rejects the schema.
    pub async fn build(&self) -> Result<Schema, GraphQLError> {
        debug!(types = self.registry.len(), "Starting GraphQL schema build");

        let merged = merge_roots(self.build_definitions()?)?;

        let interfaces: HashSet<String> = merged
            .types
            .iter()
            .filter(|def| matches!(def, TypeDefinition::Interface(_)))
            .map(|def| def.name().to_string())
            .collect();

        let mutation_root = merged.mutation.as_ref().map(|_| MUTATION_ROOT);
        let mut schema_builder = Schema::build(QUERY_ROOT, mutation_root, None);

        for definition in &merged.types {
            schema_builder = register_definition(schema_builder, definition, &interfaces);
        }

        schema_builder = schema_builder.register(build_query_type(&merged.query, &interfaces));

        if let Some(mutation) = &merged.mutation {
            debug!(fields = mutation.fields.len(), "Registering Mutation type");
            schema_builder = schema_builder.register(build_object(mutation, &interfaces));
        }

        // Configure limits
        let mut schema_builder = schema_builder.limit_depth(self.config.max_depth);
        schema_builder = schema_builder.limit_complexity(self.config.max_complexity);

        if !self.config.introspection_enabled {
            schema_builder = schema_builder.disable_introspection();
        }

        let schema = schema_builder
            .finish()
            .map_err(|e| GraphQLError::SchemaBuildFailed(e.to_string()))?;

        debug!("GraphQL schema build complete");
        Ok(schema)
    }
}

/// Folds every `Query` and `Mutation` contribution into one object each.
///
/// Fields keep contribution order. A root field defined twice is an error.
fn merge_roots(definitions: CompiledDefinitions) -> Result<MergedDefinitions, CompileError> {
    let mut query = ObjectDefinition::new(QUERY_ROOT);
    let mut mutation: Option<ObjectDefinition> = None;
    let mut query_names: HashSet<String> =
        BUILTIN_QUERY_FIELDS.iter().map(ToString::to_string).collect();
    let mut mutation_names: HashSet<String> = HashSet::new();
    let mut types = CompiledDefinitions::new();

    for definition in definitions {
        match definition {
            TypeDefinition::Object(object) if object.name == QUERY_ROOT => {
                append_root_fields(&mut query, &mut query_names, object)?;
            }
            TypeDefinition::Object(object) if object.name == MUTATION_ROOT => {
                let target = mutation.get_or_insert_with(|| ObjectDefinition::new(MUTATION_ROOT));
                append_root_fields(target, &mut mutation_names, object)?;
            }
            other => types.push(other),
        }
    }

    Ok(MergedDefinitions {
        query,
        mutation,
        types,
    })
}

fn append_root_fields(
    root: &mut ObjectDefinition,
    seen: &mut HashSet<String>,
    contribution: ObjectDefinition,
) -> Result<(), CompileError> {
    for field in contribution.fields {
        if !seen.insert(field.name.clone()) {
            return Err(CompileError::DuplicateRootField {
                root: root.name.clone(),
                field: field.name,
            });
        }
        root.fields.push(field);
    }
    Ok(())
}

/// Maps a compiled type onto an async-graphql type reference.
fn type_ref(ty: &GqlType) -> TypeRef {
    match (ty.list, ty.non_null) {
        (false, false) => TypeRef::named(&ty.name),
        (false, true) => TypeRef::named_nn(&ty.name),
        (true, false) => TypeRef::named_nn_list(&ty.name),
        (true, true) => TypeRef::named_nn_list_nn(&ty.name),
    }
}

fn register_definition(
    builder: SchemaBuilder,
    definition: &TypeDefinition,
    interfaces: &HashSet<String>,
) -> SchemaBuilder {
    trace!(definition = %definition.name(), "Registering type");
    match definition {
        TypeDefinition::Scalar(scalar) => {
            let mut ty = Scalar::new(&scalar.name);
            if let Some(description) = &scalar.description {
                ty = ty.description(description);
            }
            builder.register(ty)
        }
        TypeDefinition::Enum(enumeration) => {
            let ty = enumeration
                .values
                .iter()
                .fold(Enum::new(&enumeration.name), |ty, value| {
                    ty.item(EnumItem::new(value))
                });
            builder.register(ty)
        }
        TypeDefinition::Interface(interface) => builder.register(build_interface(interface)),
        TypeDefinition::Object(object) => builder.register(build_object(object, interfaces)),
    }
}

fn build_interface(definition: &ObjectDefinition) -> Interface {
    definition
        .fields
        .iter()
        .fold(Interface::new(&definition.name), |interface, field| {
            let field_def = field.args.iter().fold(
                InterfaceField::new(&field.name, type_ref(&field.ty)),
                |f, arg| f.argument(InputValue::new(&arg.name, type_ref(&arg.ty))),
            );
            interface.field(field_def)
        })
}

fn build_object(definition: &ObjectDefinition, interfaces: &HashSet<String>) -> Object {
    let object = definition
        .implements
        .iter()
        .fold(Object::new(&definition.name), |object, name| {
            object.implement(name)
        });

    definition
        .fields
        .iter()
        .fold(object, |object, field| object.field(build_field(field, interfaces)))
}

/// Builds the Query root: the built-in fields followed by every contribution.
fn build_query_type(definition: &ObjectDefinition, interfaces: &HashSet<String>) -> Object {
    debug!(fields = definition.fields.len(), "Building Query type");

    let mut query = Object::new(QUERY_ROOT).description("bfDb GraphQL Query root");

    // Add health check field
    query = query.field(
        Field::new("_health", TypeRef::named_nn(TypeRef::STRING), |_| {
            FieldFuture::new(async { Ok(Some(Value::String("ok".to_string()))) })
        })
        .description("Health check endpoint"),
    );

    // Add version field
    query = query.field(
        Field::new("_version", TypeRef::named_nn(TypeRef::STRING), |_| {
            FieldFuture::new(async {
                Ok(Some(Value::String(env!("CARGO_PKG_VERSION").to_string())))
            })
        })
        .description("API version"),
    );

    definition
        .fields
        .iter()
        .fold(query, |query, field| query.field(build_field(field, interfaces)))
}

/// Builds one output field with the resolver its resolution asks for.
fn build_field(definition: &FieldDefinition, interfaces: &HashSet<String>) -> Field {
    let name = definition.name.clone();
    let ty = type_ref(&definition.ty);
    let abstract_type = interfaces.contains(&definition.ty.name);

    let field = match &definition.resolution {
        Resolution::Property(shape) => Field::new(
            &definition.name,
            ty,
            PropertyResolver::resolve(name, *shape, abstract_type),
        ),
        Resolution::Custom { resolver, shape } => Field::new(
            &definition.name,
            ty,
            CustomFieldResolver::resolve(name, resolver.clone(), *shape, abstract_type),
        ),
        Resolution::Relation {
            target,
            direction,
            many: true,
        } => Field::new(
            &definition.name,
            ty,
            ConnectionResolver::resolve(target.clone(), *direction),
        ),
        Resolution::Relation {
            target,
            direction,
            many: false,
        } => Field::new(
            &definition.name,
            ty,
            RelationResolver::resolve(target.clone(), *direction, abstract_type),
        ),
        Resolution::PageInfo => Field::new(
            &definition.name,
            ty,
            ConnectionResolver::page_info_field(name),
        ),
        Resolution::EdgeCursor => Field::new(&definition.name, ty, ConnectionResolver::edge_cursor()),
        Resolution::EdgeNode => Field::new(
            &definition.name,
            ty,
            ConnectionResolver::edge_node(abstract_type),
        ),
        Resolution::ConnectionEdges => Field::new(&definition.name, ty, ConnectionResolver::edges()),
        Resolution::ConnectionPageInfo => {
            Field::new(&definition.name, ty, ConnectionResolver::page_info())
        }
        Resolution::ConnectionCount => Field::new(&definition.name, ty, ConnectionResolver::count()),
        Resolution::Update { type_name } => Field::new(
            &definition.name,
            ty,
            UpdateResolver::resolve(type_name.clone()),
        ),
        Resolution::Delete { type_name } => Field::new(
            &definition.name,
            ty,
            DeleteResolver::resolve(type_name.clone()),
        ),
        Resolution::CustomMutation { resolver, payload } => Field::new(
            &definition.name,
            ty,
            CustomMutationResolver::resolve(name, resolver.clone(), *payload),
        ),
    };

    definition.args.iter().fold(field, |field, arg| {
        field.argument(InputValue::new(&arg.name, type_ref(&arg.ty)))
    })
}
