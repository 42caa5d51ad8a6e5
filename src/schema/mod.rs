//! The type system: named/wrapping type representations, directives,
//! standard scalars, schema construction, introspection, and SDL printing
//! (§3.2, §4.5).

pub mod build;
pub mod directive;
pub mod introspection;
pub mod printer;
pub mod scalars;
pub mod types;

pub use build::{Schema, SchemaBuilder, SchemaError, TypeLoader};
pub use directive::{DirectiveLocation, DirectiveType};
pub use printer::print_schema;
pub use types::{
    Argument, DeprecationStatus, EnumType, EnumValue, Field, FieldResolverFn, InputField,
    InputObjectType, InterfaceType, LazyType, NamedType, ObjectType, ResolveTypeFn, ScalarType,
    TypeKind, TypeRef, UnionType, opaque,
};
