//! Multi-spec aggregation.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::definition::{CompiledDefinitions, is_root_type};
use super::node::compile_node;
use crate::builder::GqlNodeSpec;
use crate::error::CompileError;

/// Compiles every spec and merges the results into one flat list.
///
/// Entries without a spec are skipped. A non-root definition is kept only
/// the first time its name is seen; `Query` and `Mutation` definitions are
/// always kept so their fields can be merged downstream. A discarded
/// definition whose SDL differs from the kept one is reported with a
/// warning, but the first one still wins.
///
/// # Errors
///
/// Returns the first [`CompileError`] raised by a node compile.
pub fn compile_specs(
    specs: &[(String, Option<GqlNodeSpec>)],
) -> Result<CompiledDefinitions, CompileError> {
    let known_types: HashSet<String> = specs
        .iter()
        .filter(|(_, spec)| spec.is_some())
        .map(|(name, _)| name.clone())
        .collect();

    let mut seen: HashMap<String, String> = HashMap::new();
    let mut out = CompiledDefinitions::new();

    for (type_name, spec) in specs {
        let Some(spec) = spec else {
            debug!(type_name = %type_name, "Skipping type without GraphQL spec");
            continue;
        };

        for definition in compile_node(type_name, spec, &known_types)? {
            let name = definition.name().to_string();
            if is_root_type(&name) {
                out.push(definition);
                continue;
            }

            let rendered = definition.to_string();
            match seen.get(&name) {
                Some(kept) => {
                    if *kept != rendered {
                        warn!(
                            definition = %name,
                            contributor = %type_name,
                            "Discarding conflicting definition, first registration wins"
                        );
                    }
                }
                None => {
                    seen.insert(name, rendered);
                    out.push(definition);
                }
            }
        }
    }

    debug!(
        specs = specs.len(),
        definitions = out.len(),
        "Compiled spec set"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::builder::{ArgMap, ArgSpec, PayloadField, PayloadSpec, ResolverFn, define_gql_node};
    use crate::compiler::{TypeDefinition, render_sdl};

    fn name_only() -> GqlNodeSpec {
        define_gql_node(|field, _, _| {
            field.string("name");
        })
        .unwrap()
    }

    fn names(defs: &CompiledDefinitions) -> Vec<&str> {
        defs.iter().map(TypeDefinition::name).collect()
    }

    fn greet() -> ResolverFn {
        ResolverFn::new(|input| async move {
            let to = input.arg_str("to").unwrap_or("world").to_string();
            Ok(json!({ "message": format!("hello, {to}") }))
        })
    }

    #[test]
    fn test_two_plain_types() {
        let specs = vec![
            ("TestA".to_string(), Some(name_only())),
            ("TestB".to_string(), Some(name_only())),
        ];

        let defs = compile_specs(&specs).unwrap();
        assert_eq!(names(&defs), vec!["TestA", "TestB"]);
        for def in &defs {
            let object = def.as_object().unwrap();
            assert_eq!(object.fields.len(), 1);
            assert_eq!(object.fields[0].to_string(), "name: String!");
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(compile_specs(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_skip_if_undefined() {
        let specs = vec![
            ("Hidden".to_string(), None),
            ("TestA".to_string(), Some(name_only())),
        ];

        let defs = compile_specs(&specs).unwrap();
        assert_eq!(names(&defs), vec!["TestA"]);
    }

    #[test]
    fn test_undefined_spec_is_not_a_relation_target() {
        let spec = define_gql_node(|_, relation, _| {
            relation.one("hidden", "Hidden");
        })
        .unwrap();
        let specs = vec![("Hidden".to_string(), None), ("TestA".to_string(), Some(spec))];

        let err = compile_specs(&specs).unwrap_err();
        assert!(matches!(err, CompileError::UnknownTarget { .. }));
    }

    #[test]
    fn test_mutation_contributions_are_all_kept() {
        let with_update = define_gql_node(|field, _, mutation| {
            field.string("name");
            mutation.update();
        })
        .unwrap();
        let with_delete = define_gql_node(|field, _, mutation| {
            field.string("title");
            mutation.delete();
        })
        .unwrap();
        let specs = vec![
            ("TestA".to_string(), Some(with_update)),
            ("TestB".to_string(), Some(with_delete)),
        ];

        let defs = compile_specs(&specs).unwrap();
        assert_eq!(
            names(&defs),
            vec!["JSON", "TestA", "Mutation", "TestB", "Mutation"]
        );
    }

    #[test]
    fn test_query_contributions_are_all_kept() {
        let specs = vec![
            ("Query".to_string(), Some(name_only())),
            ("Query".to_string(), Some(name_only())),
        ];

        let defs = compile_specs(&specs).unwrap();
        assert_eq!(names(&defs), vec!["Query", "Query"]);
    }

    #[test]
    fn test_non_root_first_registration_wins() {
        let first = define_gql_node(|field, _, _| {
            field.string("name");
        })
        .unwrap();
        let second = define_gql_node(|field, _, _| {
            field.int("count");
        })
        .unwrap();
        let specs = vec![
            ("Dup".to_string(), Some(first)),
            ("Dup".to_string(), Some(second)),
        ];

        let defs = compile_specs(&specs).unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].to_string(), "type Dup {\n  name: String!\n}");
    }

    #[test]
    fn test_shared_support_types_are_deduplicated() {
        let person = define_gql_node(|field, relation, _| {
            field.json("meta");
            relation.many_in("followers", "BfPerson");
        })
        .unwrap();
        let org = define_gql_node(|field, relation, _| {
            field.json("settings");
            relation.many("members", "BfPerson");
        })
        .unwrap();
        let specs = vec![
            ("BfPerson".to_string(), Some(person)),
            ("BfOrganization".to_string(), Some(org)),
        ];

        let defs = compile_specs(&specs).unwrap();
        assert_eq!(
            names(&defs),
            vec![
                "JSON",
                "BfPerson",
                "PageInfo",
                "BfPersonEdge",
                "BfPersonConnection",
                "BfOrganization",
            ]
        );
    }

    #[test]
    fn test_greet_scenario() {
        let spec = define_gql_node(|field, _, mutation| {
            field.string("name");
            mutation.update().delete().custom_with_payload(
                "greet",
                [("to", ArgSpec::string())],
                PayloadSpec::new().field("message", PayloadField::string()),
                greet(),
            );
        })
        .unwrap();
        let specs = vec![("TestType".to_string(), Some(spec))];

        let defs = compile_specs(&specs).unwrap();
        let roots: Vec<_> = defs.iter().filter(|d| d.name() == "Mutation").collect();
        assert_eq!(roots.len(), 1);
        let fields: Vec<_> = roots[0].as_object().unwrap().field_names().collect();
        assert_eq!(fields, vec!["updateTestType", "deleteTestType", "greet"]);
        assert!(defs.iter().any(|d| d.name() == "TestTypeGreetPayload"));
    }

    #[test]
    fn test_compilation_is_idempotent() {
        let build = || {
            vec![
                (
                    "BfPerson".to_string(),
                    Some(
                        define_gql_node(|field, relation, mutation| {
                            field.id("id");
                            field.string("name");
                            relation.one("account", "BfAccount");
                            relation.many_in("followers", "BfPerson");
                            mutation.update().custom("ping", ArgMap::new(), greet());
                        })
                        .unwrap(),
                    ),
                ),
                ("BfAccount".to_string(), Some(name_only())),
            ]
        };

        let first = render_sdl(&compile_specs(&build()).unwrap());
        let second = render_sdl(&compile_specs(&build()).unwrap());
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }
}
