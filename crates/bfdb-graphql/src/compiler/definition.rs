//! Framework-neutral schema definitions.
//!
//! The compiler emits these; the schema builder turns them into async-graphql
//! dynamic types. Every definition renders to SDL through `Display`, which is
//! what idempotence and shape comparisons are checked against.

use std::fmt;

use bfdb_storage::Direction;

use crate::builder::ResolverFn;

/// Name of the query root type.
pub const QUERY_ROOT: &str = "Query";

/// Name of the mutation root type.
pub const MUTATION_ROOT: &str = "Mutation";

/// Relay page info type shared by every connection.
pub const PAGE_INFO: &str = "PageInfo";

/// Returns true for `Query` and `Mutation`.
#[must_use]
pub fn is_root_type(name: &str) -> bool {
    name == QUERY_ROOT || name == MUTATION_ROOT
}

/// Output of a compile run, in emission order.
pub type CompiledDefinitions = Vec<TypeDefinition>;

/// A type reference with its wrappers.
///
/// `list` wraps the named type as `[Name!]`; `non_null` applies to the
/// outermost type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GqlType {
    pub name: String,
    pub non_null: bool,
    pub list: bool,
}

impl GqlType {
    /// A nullable named type.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            non_null: false,
            list: false,
        }
    }

    /// A non-null named type.
    #[must_use]
    pub fn named_nn(name: impl Into<String>) -> Self {
        Self {
            non_null: true,
            ..Self::named(name)
        }
    }

    /// Sets the outer non-null wrapper.
    #[must_use]
    pub fn with_non_null(mut self, non_null: bool) -> Self {
        self.non_null = non_null;
        self
    }

    /// Sets the list wrapper.
    #[must_use]
    pub fn with_list(mut self, list: bool) -> Self {
        self.list = list;
        self
    }
}

impl fmt::Display for GqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.list {
            write!(f, "[{}!]", self.name)?;
        } else {
            f.write_str(&self.name)?;
        }
        if self.non_null {
            f.write_str("!")?;
        }
        Ok(())
    }
}

/// A field argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputArg {
    pub name: String,
    pub ty: GqlType,
}

/// How a resolved value maps onto the field's output type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// Scalar (or list of scalars).
    Leaf,
    /// Enum member, given as a string.
    Enum,
    /// Serialized node record(s).
    Node,
}

/// How the schema builder must resolve a field.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Read the field from the parent node (or payload key).
    Property(ValueShape),
    /// Call a custom resolver.
    Custom { resolver: ResolverFn, shape: ValueShape },
    /// Traverse the graph from the parent node.
    Relation {
        target: String,
        direction: Direction,
        many: bool,
    },
    /// A `PageInfo` field, by name.
    PageInfo,
    /// `{Target}Edge.cursor`.
    EdgeCursor,
    /// `{Target}Edge.node`.
    EdgeNode,
    /// `{Target}Connection.edges`.
    ConnectionEdges,
    /// `{Target}Connection.pageInfo`.
    ConnectionPageInfo,
    /// `{Target}Connection.count`.
    ConnectionCount,
    /// `update{Type}` through the CRUD collaborator.
    Update { type_name: String },
    /// `delete{Type}` through the CRUD collaborator.
    Delete { type_name: String },
    /// A custom mutation; `payload` is set when it returns a payload object.
    CustomMutation {
        resolver: ResolverFn,
        payload: bool,
    },
}

/// A field of an object or interface definition.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: String,
    pub ty: GqlType,
    pub args: Vec<InputArg>,
    pub resolution: Resolution,
}

impl FieldDefinition {
    /// Creates a field without arguments.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: GqlType, resolution: Resolution) -> Self {
        Self {
            name: name.into(),
            ty,
            args: Vec::new(),
            resolution,
        }
    }

    /// Adds an argument.
    #[must_use]
    pub fn arg(mut self, name: impl Into<String>, ty: GqlType) -> Self {
        self.args.push(InputArg {
            name: name.into(),
            ty,
        });
        self
    }
}

impl fmt::Display for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            let args: Vec<String> = self
                .args
                .iter()
                .map(|arg| format!("{}: {}", arg.name, arg.ty))
                .collect();
            write!(f, "({})", args.join(", "))?;
        }
        write!(f, ": {}", self.ty)
    }
}

/// An object or interface type.
#[derive(Debug, Clone)]
pub struct ObjectDefinition {
    pub name: String,
    pub implements: Vec<String>,
    pub fields: Vec<FieldDefinition>,
}

impl ObjectDefinition {
    /// Creates an empty definition.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            implements: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    fn write_body(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.implements.is_empty() {
            write!(f, " implements {}", self.implements.join(" & "))?;
        }
        f.write_str(" {\n")?;
        for field in &self.fields {
            writeln!(f, "  {field}")?;
        }
        f.write_str("}")
    }
}

/// An enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDefinition {
    pub name: String,
    pub values: Vec<String>,
}

/// A custom scalar type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarDefinition {
    pub name: String,
    pub description: Option<String>,
}

/// One compiled schema definition.
#[derive(Debug, Clone)]
pub enum TypeDefinition {
    Object(ObjectDefinition),
    Interface(ObjectDefinition),
    Enum(EnumDefinition),
    Scalar(ScalarDefinition),
}

impl TypeDefinition {
    /// The type name the definition is keyed by.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Object(def) | Self::Interface(def) => &def.name,
            Self::Enum(def) => &def.name,
            Self::Scalar(def) => &def.name,
        }
    }

    /// Returns true for `Query`/`Mutation` contributions.
    #[must_use]
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Object(_)) && is_root_type(self.name())
    }

    /// Returns the object or interface body, if any.
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectDefinition> {
        match self {
            Self::Object(def) | Self::Interface(def) => Some(def),
            Self::Enum(_) | Self::Scalar(_) => None,
        }
    }
}

impl fmt::Display for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(def) => {
                f.write_str("type ")?;
                def.write_body(f)
            }
            Self::Interface(def) => {
                f.write_str("interface ")?;
                def.write_body(f)
            }
            Self::Enum(def) => {
                writeln!(f, "enum {} {{", def.name)?;
                for value in &def.values {
                    writeln!(f, "  {value}")?;
                }
                f.write_str("}")
            }
            Self::Scalar(def) => write!(f, "scalar {}", def.name),
        }
    }
}

/// Renders a definition list as SDL text, one definition per block.
#[must_use]
pub fn render_sdl(definitions: &[TypeDefinition]) -> String {
    definitions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}
