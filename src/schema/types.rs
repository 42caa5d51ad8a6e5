//! Named and wrapping type representations (§3.2).

use std::fmt;
use std::sync::{Arc, OnceLock};

use arcstr::ArcStr;

use crate::ast;
use crate::value::{Opaque, Value};

/// Whether a field/argument/enum-value is deprecated, with an optional
/// reason (§3.2 supplement).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DeprecationStatus {
    Current,
    Deprecated(Option<ArcStr>),
}

impl DeprecationStatus {
    pub fn is_deprecated(&self) -> bool {
        matches!(self, DeprecationStatus::Deprecated(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            DeprecationStatus::Deprecated(r) => r.as_deref(),
            DeprecationStatus::Current => None,
        }
    }
}

/// A lazily-resolved reference to a named type, used to break construction
/// cycles between types (§9 design notes: "lazy type references").
///
/// Modeled as `Either<Type, Lazy<Type>>`: either the type is already
/// available, or a thunk builds it on first access, with the result cached
/// behind a [`OnceLock`] so repeated access never re-runs the thunk.
#[derive(Clone)]
pub struct LazyType(Arc<LazyTypeInner>);

enum LazyTypeInner {
    Ready(NamedType),
    Shared(Arc<NamedType>),
    Thunk(OnceLock<NamedType>, Box<dyn Fn() -> NamedType + Send + Sync>),
}

impl LazyType {
    pub fn ready(ty: NamedType) -> Self {
        LazyType(Arc::new(LazyTypeInner::Ready(ty)))
    }

    /// Wraps an already-shared type (e.g. from [`super::Schema::get_type`])
    /// without cloning its contents, used while walking a document where a
    /// type reference is constructed fresh at every step (§4.2's type-info
    /// tracker).
    pub fn shared(ty: Arc<NamedType>) -> Self {
        LazyType(Arc::new(LazyTypeInner::Shared(ty)))
    }

    pub fn thunk(f: impl Fn() -> NamedType + Send + Sync + 'static) -> Self {
        LazyType(Arc::new(LazyTypeInner::Thunk(OnceLock::new(), Box::new(f))))
    }

    /// Forces resolution, memoizing the result behind a one-shot latch.
    pub fn resolve(&self) -> &NamedType {
        match &*self.0 {
            LazyTypeInner::Ready(t) => t,
            LazyTypeInner::Shared(t) => t,
            LazyTypeInner::Thunk(cell, f) => cell.get_or_init(f),
        }
    }
}

impl fmt::Debug for LazyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LazyType({})", self.resolve().name())
    }
}

/// A type reference as it appears in a field/argument/input-field
/// definition: a named type wrapped in zero or more [list]/[non-null]
/// modifiers.
///
/// [list]: TypeRef::List
/// [non-null]: TypeRef::NonNull
#[derive(Clone)]
pub enum TypeRef {
    Named(LazyType),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(ty: NamedType) -> Self {
        TypeRef::Named(LazyType::ready(ty))
    }

    /// A [`TypeRef`] wrapping an already-shared [`NamedType`] (e.g. from a
    /// schema type-map lookup) without cloning it.
    pub fn named_from_arc(ty: Arc<NamedType>) -> Self {
        TypeRef::Named(LazyType::shared(ty))
    }

    pub fn lazy(f: impl Fn() -> NamedType + Send + Sync + 'static) -> Self {
        TypeRef::Named(LazyType::thunk(f))
    }

    pub fn list(self) -> Self {
        TypeRef::List(Box::new(self))
    }

    pub fn non_null(self) -> Self {
        TypeRef::NonNull(Box::new(self))
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    /// The type wrapped by one level of [`TypeRef::NonNull`], or itself.
    pub fn nullable(&self) -> &TypeRef {
        match self {
            TypeRef::NonNull(inner) => inner,
            other => other,
        }
    }

    pub fn innermost(&self) -> &NamedType {
        match self {
            TypeRef::Named(lazy) => lazy.resolve(),
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.innermost(),
        }
    }

    pub fn innermost_name(&self) -> ArcStr {
        self.innermost().name().into()
    }

    /// Renders the `ast::Type` literal shape of this reference (`[Int!]!`),
    /// used for error messages and SDL printing.
    pub fn to_ast_type(&self) -> ast::Type {
        match self {
            TypeRef::Named(lazy) => ast::Type::Named(lazy.resolve().name().into()),
            TypeRef::List(inner) => ast::Type::List(Box::new(inner.to_ast_type())),
            TypeRef::NonNull(inner) => ast::Type::NonNull(Box::new(inner.to_ast_type())),
        }
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ast_type())
    }
}

/// Parses and validates a scalar literal or coerces a host value, returning
/// a [`Value`] or an error message.
pub type ParseValueFn = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;
/// Parses an AST literal directly (used by `coerceLiteral`, §4.1).
pub type ParseLiteralFn = Arc<dyn Fn(&ast::Value) -> Result<Value, String> + Send + Sync>;
/// Serializes an internal value for output (leaf completion, §4.4).
pub type SerializeFn = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

#[derive(Clone)]
pub struct ScalarType {
    pub name: ArcStr,
    pub description: Option<ArcStr>,
    pub specified_by_url: Option<ArcStr>,
    pub parse_value: ParseValueFn,
    pub parse_literal: ParseLiteralFn,
    pub serialize: SerializeFn,
}

impl fmt::Debug for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarType").field("name", &self.name).finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct EnumValue {
    pub name: ArcStr,
    pub description: Option<ArcStr>,
    pub deprecation_status: DeprecationStatus,
    /// The value returned to resolvers/output when this member is chosen.
    /// Defaults to `Value::String(name)` unless the host supplies a richer
    /// payload (§9: "enum payloads are opaque host values").
    pub value: Value,
}

#[derive(Clone)]
pub struct EnumType {
    pub name: ArcStr,
    pub description: Option<ArcStr>,
    pub values: Vec<EnumValue>,
}

impl fmt::Debug for EnumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumType").field("name", &self.name).finish_non_exhaustive()
    }
}

impl EnumType {
    pub fn value_named(&self, name: &str) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.name == name)
    }
}

/// The resolver invoked for a single field (§6.2).
///
/// Returns either an already-settled [`Value`] or a [`Value::Deferred`]
/// that the scheduler will drive to completion.
pub type FieldResolverFn = Arc<
    dyn Fn(
            &Value,
            &crate::executor::Arguments,
            &crate::executor::Context,
            &crate::executor::ResolveInfo,
        ) -> Result<Value, crate::error::FieldError>
        + Send
        + Sync,
>;

#[derive(Clone)]
pub struct Argument {
    pub name: ArcStr,
    pub description: Option<ArcStr>,
    pub arg_type: TypeRef,
    pub default_value: Option<Value>,
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("name", &self.name)
            .field("arg_type", &self.arg_type)
            .finish()
    }
}

/// An input-object field; structurally identical to [`Argument`] (§3.2).
pub type InputField = Argument;

/// A host-supplied cost override for the complexity rule (§4.2 rule 14):
/// given the already-computed complexity of this field's children and its
/// coerced arguments, returns this field's own contribution. Absent, a
/// field costs `1 + sum(children)`.
pub type ComplexityFn =
    Arc<dyn Fn(i64, &indexmap::IndexMap<ArcStr, Value>) -> i64 + Send + Sync>;

#[derive(Clone)]
pub struct Field {
    pub name: ArcStr,
    pub description: Option<ArcStr>,
    pub arguments: Vec<Argument>,
    pub field_type: TypeRef,
    pub deprecation_status: DeprecationStatus,
    pub resolver: Option<FieldResolverFn>,
    /// Overrides this field's contribution to the complexity rule's score.
    pub complexity: Option<ComplexityFn>,
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .finish_non_exhaustive()
    }
}

impl Field {
    pub fn is_builtin(&self) -> bool {
        self.name.starts_with("__")
    }

    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.name == name)
    }
}

#[derive(Clone, Debug)]
pub struct ObjectType {
    pub name: ArcStr,
    pub description: Option<ArcStr>,
    pub fields: Vec<Field>,
    pub interfaces: Vec<ArcStr>,
    /// Host hook used to decide whether a concrete value is an instance of
    /// this type when resolving an abstract type via `isTypeOf` (§4.4).
    pub is_type_of: Option<Arc<dyn Fn(&Value) -> bool + Send + Sync>>,
}

#[derive(Clone)]
pub struct InterfaceType {
    pub name: ArcStr,
    pub description: Option<ArcStr>,
    pub fields: Vec<Field>,
    pub interfaces: Vec<ArcStr>,
    /// Host hook resolving a concrete object type name for a value flowing
    /// through a field typed as this interface (§4.4). Falls back to each
    /// possible type's `isTypeOf` when absent.
    pub resolve_type: Option<ResolveTypeFn>,
}

impl fmt::Debug for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceType")
            .field("name", &self.name)
            .field("interfaces", &self.interfaces)
            .finish_non_exhaustive()
    }
}

/// Resolves the concrete object type for an abstract (interface/union)
/// value (§4.4: "the type's `resolveType`").
pub type ResolveTypeFn = Arc<dyn Fn(&Value) -> Option<ArcStr> + Send + Sync>;

#[derive(Clone)]
pub struct UnionType {
    pub name: ArcStr,
    pub description: Option<ArcStr>,
    pub members: Vec<ArcStr>,
    pub resolve_type: Option<ResolveTypeFn>,
}

impl fmt::Debug for UnionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionType")
            .field("name", &self.name)
            .field("members", &self.members)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct InputObjectType {
    pub name: ArcStr,
    pub description: Option<ArcStr>,
    pub input_fields: Vec<InputField>,
}

impl InputObjectType {
    pub fn field_named(&self, name: &str) -> Option<&InputField> {
        self.input_fields.iter().find(|f| f.name == name)
    }
}

/// Any named type in the schema's type map (§3.2).
#[derive(Clone, Debug)]
pub enum NamedType {
    Scalar(ScalarType),
    Enum(EnumType),
    Object(ObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    InputObject(InputObjectType),
}

/// Which structural category a [`NamedType`] belongs to, mirroring
/// introspection's `__TypeKind`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TypeKind {
    Scalar,
    Enum,
    Object,
    Interface,
    Union,
    InputObject,
}

impl NamedType {
    pub fn name(&self) -> &str {
        match self {
            NamedType::Scalar(t) => &t.name,
            NamedType::Enum(t) => &t.name,
            NamedType::Object(t) => &t.name,
            NamedType::Interface(t) => &t.name,
            NamedType::Union(t) => &t.name,
            NamedType::InputObject(t) => &t.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            NamedType::Scalar(t) => t.description.as_deref(),
            NamedType::Enum(t) => t.description.as_deref(),
            NamedType::Object(t) => t.description.as_deref(),
            NamedType::Interface(t) => t.description.as_deref(),
            NamedType::Union(t) => t.description.as_deref(),
            NamedType::InputObject(t) => t.description.as_deref(),
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            NamedType::Scalar(_) => TypeKind::Scalar,
            NamedType::Enum(_) => TypeKind::Enum,
            NamedType::Object(_) => TypeKind::Object,
            NamedType::Interface(_) => TypeKind::Interface,
            NamedType::Union(_) => TypeKind::Union,
            NamedType::InputObject(_) => TypeKind::InputObject,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, NamedType::Object(_) | NamedType::Interface(_) | NamedType::Union(_))
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self, NamedType::Interface(_) | NamedType::Union(_))
    }

    pub fn is_input_type(&self) -> bool {
        matches!(self, NamedType::Scalar(_) | NamedType::Enum(_) | NamedType::InputObject(_))
    }

    pub fn is_output_type(&self) -> bool {
        matches!(
            self,
            NamedType::Scalar(_)
                | NamedType::Enum(_)
                | NamedType::Object(_)
                | NamedType::Interface(_)
                | NamedType::Union(_)
        )
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, NamedType::Scalar(_) | NamedType::Enum(_))
    }

    /// Fields of an object/interface type, or `None` for every other kind.
    pub fn fields(&self) -> Option<&[Field]> {
        match self {
            NamedType::Object(o) => Some(&o.fields),
            NamedType::Interface(i) => Some(&i.fields),
            _ => None,
        }
    }

    pub fn field_named(&self, name: &str) -> Option<&Field> {
        self.fields()?.iter().find(|f| f.name == name)
    }
}

/// Not-yet-serializable host value wrapper, re-exported for scalar authors
/// constructing opaque enum payloads without reaching into [`crate::value`].
pub fn opaque<T: std::any::Any + Send + Sync>(v: T) -> Value {
    Value::Opaque(Opaque::new(v))
}
