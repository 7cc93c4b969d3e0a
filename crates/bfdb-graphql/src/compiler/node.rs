//! Single node type compilation.

use std::collections::HashSet;

use indexmap::IndexSet;
use tracing::{debug, trace};

use super::definition::{
    CompiledDefinitions, EnumDefinition, FieldDefinition, GqlType, MUTATION_ROOT,
    ObjectDefinition, PAGE_INFO, Resolution, ScalarDefinition, TypeDefinition, ValueShape,
};
use crate::builder::{
    ArgMap, CustomMutation, FieldKind, FieldSpec, GqlNodeSpec, PayloadKind, PayloadSpec,
    RelationSpec, ScalarKind, TargetRef,
};
use crate::error::CompileError;

/// Compiles one node type.
///
/// Emits, in order: the custom scalars the type uses, its enums, the main
/// object (or interface), connection support types for its many-relations,
/// payload types for its structured custom mutations and, if it has any
/// mutations, one `Mutation` root contribution.
///
/// `known_types` holds every type name relation and object targets may
/// point at.
///
/// # Errors
///
/// Returns `CompileError::UnknownTarget` if a relation, object field, payload
/// key or implemented interface names a type outside `known_types`.
pub fn compile_node(
    type_name: &str,
    spec: &GqlNodeSpec,
    known_types: &HashSet<String>,
) -> Result<CompiledDefinitions, CompileError> {
    let compiler = NodeCompiler {
        type_name,
        spec,
        known_types,
    };
    let definitions = compiler.compile()?;

    debug!(
        type_name = %type_name,
        definitions = definitions.len(),
        "Compiled node spec"
    );
    Ok(definitions)
}

struct NodeCompiler<'a> {
    type_name: &'a str,
    spec: &'a GqlNodeSpec,
    known_types: &'a HashSet<String>,
}

impl NodeCompiler<'_> {
    fn compile(&self) -> Result<CompiledDefinitions, CompileError> {
        let mut out = CompiledDefinitions::new();

        for scalar in self.custom_scalars() {
            out.push(scalar_definition(scalar));
        }
        out.extend(self.enum_definitions());
        out.push(self.main_definition()?);
        out.extend(self.connection_definitions());
        out.extend(self.payload_definitions()?);
        if let Some(mutation) = self.mutation_definition()? {
            out.push(mutation);
        }

        Ok(out)
    }

    /// Custom scalars in first-use order.
    fn custom_scalars(&self) -> IndexSet<ScalarKind> {
        fn use_args(args: &ArgMap, used: &mut IndexSet<ScalarKind>) {
            used.extend(args.values().map(|arg| arg.scalar));
        }

        let mut used = IndexSet::new();

        for field in self.spec.field.values() {
            if let Some(scalar) = field.kind.scalar() {
                used.insert(scalar);
            }
            use_args(&field.args, &mut used);
        }

        let mutation = &self.spec.mutation;
        if mutation.standard.update {
            used.insert(ScalarKind::Json);
        }
        for custom in &mutation.customs {
            use_args(&custom.args, &mut used);
            match payload_of(custom) {
                Some(payload) => {
                    for (_, key) in payload.iter() {
                        if let PayloadKind::Scalar(scalar) = key.kind {
                            used.insert(scalar);
                        }
                    }
                }
                None => {
                    used.insert(ScalarKind::Json);
                }
            }
        }

        used.retain(|scalar| scalar.is_custom());
        used
    }

    fn enum_definitions(&self) -> impl Iterator<Item = TypeDefinition> + '_ {
        self.spec.field.values().filter_map(|field| match &field.kind {
            FieldKind::Enum(members) => Some(TypeDefinition::Enum(EnumDefinition {
                name: enum_type_name(self.type_name, &field.name),
                values: members.values().to_vec(),
            })),
            _ => None,
        })
    }

    fn main_definition(&self) -> Result<TypeDefinition, CompileError> {
        let mut object = ObjectDefinition::new(self.type_name);

        for interface in &self.spec.implements {
            self.check_target(&TargetRef::from(interface.as_str()), "implements")?;
            object.implements.push(interface.clone());
        }
        for field in self.spec.field.values() {
            object.fields.push(self.field_definition(field)?);
        }
        for relation in self.spec.relation.values() {
            object.fields.push(self.relation_definition(relation)?);
        }

        Ok(if self.spec.is_interface {
            TypeDefinition::Interface(object)
        } else {
            TypeDefinition::Object(object)
        })
    }

    fn field_definition(&self, field: &FieldSpec) -> Result<FieldDefinition, CompileError> {
        let (type_name, shape) = match &field.kind {
            FieldKind::Enum(_) => (enum_type_name(self.type_name, &field.name), ValueShape::Enum),
            FieldKind::Object(target) => {
                self.check_target(target, &field.name)?;
                (target.type_name().to_string(), ValueShape::Node)
            }
            scalar_kind => {
                let scalar = scalar_kind.scalar().map_or("String", ScalarKind::graphql_name);
                (scalar.to_string(), ValueShape::Leaf)
            }
        };

        let resolution = match &field.resolver {
            Some(resolver) => Resolution::Custom {
                resolver: resolver.clone(),
                shape,
            },
            None => Resolution::Property(shape),
        };

        let mut def = FieldDefinition::new(
            &field.name,
            GqlType::named(type_name).with_non_null(!field.nullable),
            resolution,
        );
        for (name, arg) in &field.args {
            def = def.arg(
                name,
                GqlType::named(arg.scalar.graphql_name()).with_non_null(arg.non_null),
            );
        }

        trace!(type_name = %self.type_name, field = %def, "Compiled field");
        Ok(def)
    }

    fn relation_definition(&self, relation: &RelationSpec) -> Result<FieldDefinition, CompileError> {
        self.check_target(&relation.target, &relation.name)?;
        let target = relation.target.type_name();

        let resolution = Resolution::Relation {
            target: target.to_string(),
            direction: relation.direction,
            many: relation.many,
        };

        let def = if relation.many {
            FieldDefinition::new(
                &relation.name,
                GqlType::named_nn(connection_type_name(target)),
                resolution,
            )
            .arg("first", GqlType::named("Int"))
            .arg("after", GqlType::named("String"))
            .arg("last", GqlType::named("Int"))
            .arg("before", GqlType::named("String"))
        } else {
            FieldDefinition::new(&relation.name, GqlType::named(target), resolution)
        };

        trace!(
            type_name = %self.type_name,
            relation = %relation.name,
            direction = %relation.direction,
            many = relation.many,
            "Compiled relation"
        );
        Ok(def)
    }

    /// `PageInfo` plus one edge/connection pair per distinct many-target.
    fn connection_definitions(&self) -> Vec<TypeDefinition> {
        let targets: IndexSet<&str> = self
            .spec
            .relation
            .values()
            .filter(|r| r.many)
            .map(|r| r.target.type_name())
            .collect();

        if targets.is_empty() {
            return Vec::new();
        }

        let mut out = vec![page_info_definition()];
        for target in targets {
            out.push(edge_definition(target));
            out.push(connection_definition(target));
        }
        out
    }

    fn payload_definitions(&self) -> Result<Vec<TypeDefinition>, CompileError> {
        let mut out = Vec::new();
        for custom in &self.spec.mutation.customs {
            let Some(payload) = payload_of(custom) else {
                continue;
            };

            let mut object = ObjectDefinition::new(payload_type_name(self.type_name, &custom.name));
            for (key, field) in payload.iter() {
                let (type_name, shape) = match &field.kind {
                    PayloadKind::Scalar(scalar) => {
                        (scalar.graphql_name().to_string(), ValueShape::Leaf)
                    }
                    PayloadKind::Object(target) => {
                        self.check_target(target, &format!("{}.{key}", custom.name))?;
                        (target.type_name().to_string(), ValueShape::Node)
                    }
                };
                object.fields.push(FieldDefinition::new(
                    key,
                    GqlType::named(type_name)
                        .with_list(field.list)
                        .with_non_null(field.non_null),
                    Resolution::Property(shape),
                ));
            }
            out.push(TypeDefinition::Object(object));
        }
        Ok(out)
    }

    /// Returns `CompileError::DuplicateRootField` when a custom mutation is
    /// named like a generated `update{Type}`/`delete{Type}` field.
    fn mutation_definition(&self) -> Result<Option<TypeDefinition>, CompileError> {
        let mutation = &self.spec.mutation;
        if mutation.is_empty() {
            return Ok(None);
        }

        let mut root = ObjectDefinition::new(MUTATION_ROOT);

        if mutation.standard.update {
            root.fields.push(
                FieldDefinition::new(
                    format!("update{}", self.type_name),
                    GqlType::named(self.type_name),
                    Resolution::Update {
                        type_name: self.type_name.to_string(),
                    },
                )
                .arg("id", GqlType::named_nn("ID"))
                .arg("params", GqlType::named(ScalarKind::Json.graphql_name())),
            );
        }
        if mutation.standard.delete {
            root.fields.push(
                FieldDefinition::new(
                    format!("delete{}", self.type_name),
                    GqlType::named_nn("Boolean"),
                    Resolution::Delete {
                        type_name: self.type_name.to_string(),
                    },
                )
                .arg("id", GqlType::named_nn("ID")),
            );
        }
        for custom in &mutation.customs {
            let payload = payload_of(custom).is_some();
            let ty = if payload {
                GqlType::named(payload_type_name(self.type_name, &custom.name))
            } else {
                GqlType::named(ScalarKind::Json.graphql_name())
            };

            let mut def = FieldDefinition::new(
                &custom.name,
                ty,
                Resolution::CustomMutation {
                    resolver: custom.resolver.clone(),
                    payload,
                },
            );
            for (name, arg) in &custom.args {
                def = def.arg(
                    name,
                    GqlType::named(arg.scalar.graphql_name()).with_non_null(arg.non_null),
                );
            }
            if root.fields.iter().any(|f| f.name == custom.name) {
                return Err(CompileError::DuplicateRootField {
                    root: MUTATION_ROOT.to_string(),
                    field: custom.name.clone(),
                });
            }
            root.fields.push(def);
        }

        Ok(Some(TypeDefinition::Object(root)))
    }

    fn check_target(&self, target: &TargetRef, field: &str) -> Result<(), CompileError> {
        if self.known_types.contains(target.type_name()) {
            Ok(())
        } else {
            Err(CompileError::UnknownTarget {
                owner: self.type_name.to_string(),
                field: field.to_string(),
                target: target.type_name().to_string(),
            })
        }
    }
}

/// An empty payload spec compiles as if none was given.
fn payload_of(custom: &CustomMutation) -> Option<&PayloadSpec> {
    custom.returns.as_ref().filter(|payload| !payload.is_empty())
}

fn scalar_definition(scalar: ScalarKind) -> TypeDefinition {
    let description = match scalar {
        ScalarKind::Json => "Arbitrary JSON value",
        ScalarKind::Date => "Calendar date or timestamp in ISO 8601 form",
        _ => "",
    };
    TypeDefinition::Scalar(ScalarDefinition {
        name: scalar.graphql_name().to_string(),
        description: (!description.is_empty()).then(|| description.to_string()),
    })
}

fn page_info_definition() -> TypeDefinition {
    TypeDefinition::Object(
        ObjectDefinition::new(PAGE_INFO)
            .field(FieldDefinition::new(
                "hasNextPage",
                GqlType::named_nn("Boolean"),
                Resolution::PageInfo,
            ))
            .field(FieldDefinition::new(
                "hasPreviousPage",
                GqlType::named_nn("Boolean"),
                Resolution::PageInfo,
            ))
            .field(FieldDefinition::new(
                "startCursor",
                GqlType::named("String"),
                Resolution::PageInfo,
            ))
            .field(FieldDefinition::new(
                "endCursor",
                GqlType::named("String"),
                Resolution::PageInfo,
            )),
    )
}

fn edge_definition(target: &str) -> TypeDefinition {
    TypeDefinition::Object(
        ObjectDefinition::new(edge_type_name(target))
            .field(FieldDefinition::new(
                "cursor",
                GqlType::named_nn("String"),
                Resolution::EdgeCursor,
            ))
            .field(FieldDefinition::new(
                "node",
                GqlType::named(target),
                Resolution::EdgeNode,
            )),
    )
}

fn connection_definition(target: &str) -> TypeDefinition {
    TypeDefinition::Object(
        ObjectDefinition::new(connection_type_name(target))
            .field(FieldDefinition::new(
                "edges",
                GqlType::named_nn(edge_type_name(target)).with_list(true),
                Resolution::ConnectionEdges,
            ))
            .field(FieldDefinition::new(
                "pageInfo",
                GqlType::named_nn(PAGE_INFO),
                Resolution::ConnectionPageInfo,
            ))
            .field(FieldDefinition::new(
                "count",
                GqlType::named("Int"),
                Resolution::ConnectionCount,
            )),
    )
}

/// `{Type}_{field}_Enum`.
#[must_use]
pub fn enum_type_name(type_name: &str, field: &str) -> String {
    format!("{type_name}_{field}_Enum")
}

/// `{Target}Edge`.
#[must_use]
pub fn edge_type_name(target: &str) -> String {
    format!("{target}Edge")
}

/// `{Target}Connection`.
#[must_use]
pub fn connection_type_name(target: &str) -> String {
    format!("{target}Connection")
}

/// `{Type}{PascalCase(mutation)}Payload`.
#[must_use]
pub fn payload_type_name(type_name: &str, mutation: &str) -> String {
    format!("{type_name}{}Payload", pascal_case(mutation))
}

fn pascal_case(name: &str) -> String {
    name.split(['_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::builder::{
        ArgSpec, EnumRef, PayloadField, ResolverFn, define_gql_interface, define_gql_node,
    };
    use crate::compiler::render_sdl;

    fn known(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn greet() -> ResolverFn {
        ResolverFn::new(|_| async { Ok(json!({"message": "hi"})) })
    }

    fn names(defs: &CompiledDefinitions) -> Vec<&str> {
        defs.iter().map(TypeDefinition::name).collect()
    }

    #[test]
    fn test_scalar_fields_compile_in_order() {
        let spec = define_gql_node(|field, _, _| {
            field.id("id");
            field.string("name");
            field.nullable().int("age");
            field.boolean("active");
            field.float("score");
        })
        .unwrap();

        let defs = compile_node("BfPerson", &spec, &known(&["BfPerson"])).unwrap();
        assert_eq!(names(&defs), vec!["BfPerson"]);
        assert_eq!(
            defs[0].to_string(),
            "type BfPerson {\n  id: ID!\n  name: String!\n  age: Int\n  active: Boolean!\n  score: Float!\n}"
        );
    }

    #[test]
    fn test_custom_scalars_and_enums_come_first() {
        let spec = define_gql_node(|field, _, _| {
            field.enumeration("status", EnumRef::new(["ACTIVE", "INVITED"]));
            field.nullable().date("createdAt");
            field.json("meta").arg("path", ArgSpec::string());
        })
        .unwrap();

        let defs = compile_node("BfPerson", &spec, &known(&["BfPerson"])).unwrap();
        assert_eq!(
            names(&defs),
            vec!["Date", "JSON", "BfPerson_status_Enum", "BfPerson"]
        );
        let object = defs[3].as_object().unwrap();
        assert_eq!(object.get("status").unwrap().ty.to_string(), "BfPerson_status_Enum!");
        assert_eq!(object.get("meta").unwrap().to_string(), "meta(path: String): JSON!");
    }

    #[test]
    fn test_relations_compile_by_direction_and_cardinality() {
        let spec = define_gql_node(|field, relation, _| {
            field.id("id");
            relation.one("account", "BfAccount");
            relation.many_in("followers", "BfPerson");
        })
        .unwrap();

        let defs = compile_node("BfPerson", &spec, &known(&["BfPerson", "BfAccount"])).unwrap();
        assert_eq!(
            names(&defs),
            vec!["BfPerson", "PageInfo", "BfPersonEdge", "BfPersonConnection"]
        );

        let object = defs[0].as_object().unwrap();
        let account = object.get("account").unwrap();
        assert_eq!(account.ty.to_string(), "BfAccount");
        assert!(matches!(
            account.resolution,
            Resolution::Relation {
                direction: bfdb_storage::Direction::Out,
                many: false,
                ..
            }
        ));

        let followers = object.get("followers").unwrap();
        assert_eq!(
            followers.to_string(),
            "followers(first: Int, after: String, last: Int, before: String): BfPersonConnection!"
        );
        assert!(matches!(
            followers.resolution,
            Resolution::Relation {
                direction: bfdb_storage::Direction::In,
                many: true,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_relation_target_fails() {
        let spec = define_gql_node(|_, relation, _| {
            relation.one("account", "BfAccount");
        })
        .unwrap();

        let err = compile_node("BfPerson", &spec, &known(&["BfPerson"])).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownTarget {
                owner: "BfPerson".into(),
                field: "account".into(),
                target: "BfAccount".into(),
            }
        );
    }

    #[test]
    fn test_mutations_compile_to_payload_and_root_extension() {
        let spec = define_gql_node(|field, _, mutation| {
            field.string("name");
            mutation.update().delete().custom_with_payload(
                "greet",
                [("to", ArgSpec::string())],
                PayloadSpec::new().field("message", PayloadField::string().non_null()),
                greet(),
            );
        })
        .unwrap();

        let defs = compile_node("TestType", &spec, &known(&["TestType"])).unwrap();
        assert_eq!(
            names(&defs),
            vec!["JSON", "TestType", "TestTypeGreetPayload", "Mutation"]
        );

        let root = defs[3].as_object().unwrap();
        let fields: Vec<_> = root.field_names().collect();
        assert_eq!(fields, vec!["updateTestType", "deleteTestType", "greet"]);
        assert_eq!(
            root.fields[0].to_string(),
            "updateTestType(id: ID!, params: JSON): TestType"
        );
        assert_eq!(root.fields[1].to_string(), "deleteTestType(id: ID!): Boolean!");
        assert_eq!(root.fields[2].to_string(), "greet(to: String): TestTypeGreetPayload");
    }

    #[test]
    fn test_custom_without_payload_returns_json() {
        let spec = define_gql_node(|field, _, mutation| {
            field.string("name");
            mutation.custom("ping", ArgMap::new(), greet());
        })
        .unwrap();

        let defs = compile_node("TestType", &spec, &known(&["TestType"])).unwrap();
        assert_eq!(names(&defs), vec!["JSON", "TestType", "Mutation"]);
        assert_eq!(
            defs[2].as_object().unwrap().fields[0].ty.to_string(),
            "JSON"
        );
    }

    #[test]
    fn test_custom_mutation_cannot_shadow_standard_field() {
        let spec = define_gql_node(|field, _, mutation| {
            field.string("name");
            mutation
                .update()
                .delete()
                .custom("updateTestType", ArgMap::new(), greet());
        })
        .unwrap();

        let err = compile_node("TestType", &spec, &known(&["TestType"])).unwrap_err();
        assert!(matches!(
            err,
            CompileError::DuplicateRootField { ref root, ref field }
                if root == "Mutation" && field == "updateTestType"
        ));

        let spec = define_gql_node(|_, _, mutation| {
            mutation.custom("updateTestType", ArgMap::new(), greet());
        })
        .unwrap();
        assert!(compile_node("TestType", &spec, &known(&["TestType"])).is_ok());
    }

    #[test]
    fn test_payload_object_key_checks_target() {
        let spec = define_gql_node(|field, _, mutation| {
            field.string("name");
            mutation.custom_with_payload(
                "invite",
                ArgMap::new(),
                PayloadSpec::new().field("person", PayloadField::object("Ghost")),
                greet(),
            );
        })
        .unwrap();

        let err = compile_node("TestType", &spec, &known(&["TestType"])).unwrap_err();
        assert!(matches!(err, CompileError::UnknownTarget { ref target, .. } if target == "Ghost"));
    }

    #[test]
    fn test_interface_spec_and_implements() {
        let iface = define_gql_interface(|field, _, _| {
            field.id("id");
        })
        .unwrap();
        let spec = define_gql_node(|field, _, _| {
            field.id("id");
        })
        .unwrap()
        .implements("BfNode");

        let known = known(&["BfNode", "BfPerson"]);
        let iface_defs = compile_node("BfNode", &iface, &known).unwrap();
        let defs = compile_node("BfPerson", &spec, &known).unwrap();

        assert_eq!(
            render_sdl(&iface_defs),
            "interface BfNode {\n  id: ID!\n}"
        );
        assert_eq!(
            render_sdl(&defs),
            "type BfPerson implements BfNode {\n  id: ID!\n}"
        );
    }

    #[test]
    fn test_naming_helpers() {
        assert_eq!(payload_type_name("BfPerson", "greet"), "BfPersonGreetPayload");
        assert_eq!(
            payload_type_name("BfPerson", "send_invite"),
            "BfPersonSendInvitePayload"
        );
        assert_eq!(payload_type_name("BfPerson", "joinWaitlist"), "BfPersonJoinWaitlistPayload");
        assert_eq!(enum_type_name("BfPerson", "status"), "BfPerson_status_Enum");
        assert_eq!(connection_type_name("BfPerson"), "BfPersonConnection");
    }
}
