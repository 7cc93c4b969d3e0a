//! Field declarations.

use indexmap::IndexMap;

use super::relation::TargetRef;
use super::resolver::ResolverFn;
use crate::error::DeclarationError;

/// GraphQL name of the JSON scalar.
pub const JSON_SCALAR: &str = "JSON";

/// GraphQL name of the Date scalar.
pub const DATE_SCALAR: &str = "Date";

/// Scalar types usable for fields, arguments and payload keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Id,
    String,
    Int,
    Float,
    Boolean,
    Json,
    Date,
}

impl ScalarKind {
    /// Returns the GraphQL type name for this scalar.
    #[must_use]
    pub fn graphql_name(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::String => "String",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Boolean => "Boolean",
            Self::Json => JSON_SCALAR,
            Self::Date => DATE_SCALAR,
        }
    }

    /// Returns true for scalars that are not built into GraphQL and must be
    /// declared by the schema.
    #[must_use]
    pub fn is_custom(self) -> bool {
        matches!(self, Self::Json | Self::Date)
    }
}

/// The member set of an enum-valued field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumRef {
    values: Vec<String>,
}

impl EnumRef {
    /// Creates an enum reference from its members, in declaration order.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// The enum members.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// The value kind of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Id,
    String,
    Int,
    Boolean,
    Float,
    Enum(EnumRef),
    Json,
    Date,
    /// A node of another registered type, produced by a custom resolver.
    Object(TargetRef),
}

impl FieldKind {
    /// Returns the scalar this kind compiles to, if it is a scalar kind.
    #[must_use]
    pub fn scalar(&self) -> Option<ScalarKind> {
        match self {
            Self::Id => Some(ScalarKind::Id),
            Self::String => Some(ScalarKind::String),
            Self::Int => Some(ScalarKind::Int),
            Self::Boolean => Some(ScalarKind::Boolean),
            Self::Float => Some(ScalarKind::Float),
            Self::Json => Some(ScalarKind::Json),
            Self::Date => Some(ScalarKind::Date),
            Self::Enum(_) | Self::Object(_) => None,
        }
    }
}

/// Type of a field or mutation argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSpec {
    /// The argument's scalar type.
    pub scalar: ScalarKind,
    /// Whether the argument is required.
    pub non_null: bool,
}

impl ArgSpec {
    /// A nullable argument of the given scalar type.
    #[must_use]
    pub fn new(scalar: ScalarKind) -> Self {
        Self {
            scalar,
            non_null: false,
        }
    }

    #[must_use]
    pub fn id() -> Self {
        Self::new(ScalarKind::Id)
    }

    #[must_use]
    pub fn string() -> Self {
        Self::new(ScalarKind::String)
    }

    #[must_use]
    pub fn int() -> Self {
        Self::new(ScalarKind::Int)
    }

    #[must_use]
    pub fn float() -> Self {
        Self::new(ScalarKind::Float)
    }

    #[must_use]
    pub fn boolean() -> Self {
        Self::new(ScalarKind::Boolean)
    }

    #[must_use]
    pub fn json() -> Self {
        Self::new(ScalarKind::Json)
    }

    #[must_use]
    pub fn date() -> Self {
        Self::new(ScalarKind::Date)
    }

    /// Marks the argument as required.
    #[must_use]
    pub fn non_null(mut self) -> Self {
        self.non_null = true;
        self
    }
}

/// Ordered argument declarations.
pub type ArgMap = IndexMap<String, ArgSpec>;

/// One declared field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub nullable: bool,
    pub args: ArgMap,
    pub resolver: Option<ResolverFn>,
}

/// Accumulates field declarations for one spec.
#[derive(Debug, Default)]
pub struct FieldBuilder {
    fields: IndexMap<String, FieldSpec>,
    error: Option<DeclarationError>,
}

impl FieldBuilder {
    /// Switches to nullable declarations: `field.nullable().string("bio")`.
    pub fn nullable(&mut self) -> NullableFieldBuilder<'_> {
        NullableFieldBuilder { inner: self }
    }

    /// Declares an enum-valued field.
    pub fn enumeration(&mut self, name: impl Into<String>, values: EnumRef) -> FieldHandle<'_> {
        self.add(name.into(), FieldKind::Enum(values), false)
    }

    /// Declares a field holding a node of another type.
    ///
    /// Such fields need a custom resolver returning the node.
    pub fn object(
        &mut self,
        name: impl Into<String>,
        target: impl Into<TargetRef>,
    ) -> FieldHandle<'_> {
        self.add(name.into(), FieldKind::Object(target.into()), false)
    }

    fn add(&mut self, name: String, kind: FieldKind, nullable: bool) -> FieldHandle<'_> {
        if self.fields.contains_key(&name) {
            if self.error.is_none() {
                self.error = Some(DeclarationError::DuplicateField { name });
            }
            return FieldHandle { spec: None };
        }

        let spec = self.fields.entry(name.clone()).or_insert(FieldSpec {
            name,
            kind,
            nullable,
            args: ArgMap::new(),
            resolver: None,
        });
        FieldHandle { spec: Some(spec) }
    }

    pub(crate) fn finish(self) -> Result<IndexMap<String, FieldSpec>, DeclarationError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.fields),
        }
    }
}

/// Nullable variant of [`FieldBuilder`].
pub struct NullableFieldBuilder<'a> {
    inner: &'a mut FieldBuilder,
}

impl<'a> NullableFieldBuilder<'a> {
    /// Declares a nullable enum-valued field.
    pub fn enumeration(self, name: impl Into<String>, values: EnumRef) -> FieldHandle<'a> {
        self.inner.add(name.into(), FieldKind::Enum(values), true)
    }

    /// Declares a nullable node-valued field.
    pub fn object(self, name: impl Into<String>, target: impl Into<TargetRef>) -> FieldHandle<'a> {
        self.inner
            .add(name.into(), FieldKind::Object(target.into()), true)
    }
}

macro_rules! scalar_field_methods {
    ($($method:ident => $kind:ident),* $(,)?) => {
        impl FieldBuilder {
            $(
                #[doc = concat!("Declares a non-null `", stringify!($method), "` field.")]
                pub fn $method(&mut self, name: impl Into<String>) -> FieldHandle<'_> {
                    self.add(name.into(), FieldKind::$kind, false)
                }
            )*
        }

        impl<'a> NullableFieldBuilder<'a> {
            $(
                #[doc = concat!("Declares a nullable `", stringify!($method), "` field.")]
                pub fn $method(self, name: impl Into<String>) -> FieldHandle<'a> {
                    self.inner.add(name.into(), FieldKind::$kind, true)
                }
            )*
        }
    };
}

scalar_field_methods! {
    id => Id,
    string => String,
    int => Int,
    float => Float,
    boolean => Boolean,
    json => Json,
    date => Date,
}

/// Handle to a just-declared field, for attaching arguments and a resolver.
///
/// A handle for a rejected (duplicate) declaration ignores further calls; the
/// error is reported by `define_gql_node`.
pub struct FieldHandle<'a> {
    spec: Option<&'a mut FieldSpec>,
}

impl FieldHandle<'_> {
    /// Adds an argument.
    pub fn arg(mut self, name: impl Into<String>, arg: ArgSpec) -> Self {
        if let Some(spec) = self.spec.as_mut() {
            spec.args.insert(name.into(), arg);
        }
        self
    }

    /// Attaches a custom resolver.
    pub fn resolve(mut self, resolver: ResolverFn) -> Self {
        if let Some(spec) = self.spec.as_mut() {
            spec.resolver = Some(resolver);
        }
        self
    }
}
