//! Introspection types and meta-fields (`__schema`, `__type`, `__typename`,
//! §4.5 / §6.5).
//!
//! Mirrors the reference implementation's pattern of registering the
//! meta-fields onto the query root once, during schema construction, so
//! that ordinary validation rules (e.g. "fields on correct type") see them
//! like any other field — generalized here from a macro-time registry call
//! to a plain `Vec<Field>` push.

use std::sync::Arc;

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::executor::{Arguments, Context, ResolveInfo};
use crate::value::Value;

use super::directive::DirectiveType;
use super::types::{
    opaque, Argument, DeprecationStatus, EnumValue, Field, FieldResolverFn, NamedType, ObjectType,
    TypeRef,
};

/// The always-available meta-field resolved directly by the executor,
/// without a schema type-map lookup (§4.4).
pub const TYPENAME_FIELD: &str = "__typename";

pub fn with_meta_fields(query: NamedType) -> NamedType {
    let NamedType::Object(mut obj) = query else {
        return query;
    };
    obj.fields.push(Field {
        name: "__schema".into(),
        description: Some("Access the current type schema of this server.".into()),
        arguments: vec![],
        field_type: TypeRef::lazy(|| self::types_map().remove("__Schema").unwrap()).non_null(),
        deprecation_status: DeprecationStatus::Current,
        resolver: Some(resolve_schema()),
        complexity: None,
    });
    obj.fields.push(Field {
        name: "__type".into(),
        description: Some("Request the type information of a single type.".into()),
        arguments: vec![Argument {
            name: "name".into(),
            description: None,
            arg_type: TypeRef::named(crate::schema::scalars::string()).non_null(),
            default_value: None,
        }],
        field_type: TypeRef::lazy(|| self::types_map().remove("__Type").unwrap()),
        deprecation_status: DeprecationStatus::Current,
        resolver: Some(resolve_type_by_name()),
        complexity: None,
    });
    NamedType::Object(obj)
}

fn types_map() -> IndexMap<ArcStr, NamedType> {
    types().into_iter().map(|t| (t.name().into(), t)).collect()
}

/// The `__Schema`, `__Type`, `__Field`, `__InputValue`, `__EnumValue`,
/// `__Directive`, `__TypeKind`, and `__DirectiveLocation` types every
/// schema carries (§3.2: "introspection types are always present").
pub fn types() -> Vec<NamedType> {
    vec![
        type_kind_enum(),
        directive_location_enum(),
        schema_type(),
        type_type(),
        field_type(),
        input_value_type(),
        enum_value_type(),
        directive_type(),
    ]
}

fn resolver(
    f: impl Fn(&Value, &Arguments, &Context, &ResolveInfo) -> Result<Value, crate::error::FieldError>
        + Send
        + Sync
        + 'static,
) -> FieldResolverFn {
    Arc::new(f)
}

fn resolve_schema() -> FieldResolverFn {
    resolver(|_source, _args, _ctx, _info| Ok(opaque(SchemaMarker)))
}

fn resolve_type_by_name() -> FieldResolverFn {
    resolver(|_source, args, _ctx, info| {
        let name = args.get("name").and_then(Value::as_str).unwrap_or_default();
        Ok(match info.schema.get_type(name) {
            Some(ty) => opaque(TypeRef::named((*ty).clone())),
            None => Value::Null,
        })
    })
}

/// Marker source value for the `__schema` root field's sub-selection.
struct SchemaMarker;

fn obj(name: &str, fields: Vec<Field>) -> NamedType {
    NamedType::Object(ObjectType {
        name: name.into(),
        description: None,
        fields,
        interfaces: vec![],
        is_type_of: None,
    })
}

fn field(name: &str, ty: TypeRef, resolver: FieldResolverFn) -> Field {
    Field {
        name: name.into(),
        description: None,
        arguments: vec![],
        field_type: ty,
        deprecation_status: DeprecationStatus::Current,
        resolver: Some(resolver),
        complexity: None,
    }
}

fn named(n: &'static str) -> TypeRef {
    TypeRef::lazy(move || types_map().remove(n).unwrap())
}

fn string_ty() -> TypeRef {
    TypeRef::named(crate::schema::scalars::string())
}

fn bool_ty() -> TypeRef {
    TypeRef::named(crate::schema::scalars::boolean())
}

fn schema_type() -> NamedType {
    obj(
        "__Schema",
        vec![
            field(
                "description",
                string_ty(),
                resolver(|_s, _a, _c, _i| Ok(Value::Null)),
            ),
            field(
                "types",
                named("__Type").non_null().list().non_null(),
                resolver(|_s, _a, _c, info| {
                    info.schema.force_full_resolution();
                    let list = info
                        .schema
                        .known_types()
                        .map(|t| opaque(TypeRef::named(t.clone())))
                        .collect();
                    Ok(Value::List(list))
                }),
            ),
            field(
                "queryType",
                named("__Type").non_null(),
                resolver(|_s, _a, _c, info| {
                    let ty = info.schema.get_type(info.schema.query_type_name()).unwrap();
                    Ok(opaque(TypeRef::named((*ty).clone())))
                }),
            ),
            field(
                "mutationType",
                named("__Type"),
                resolver(|_s, _a, _c, info| {
                    Ok(match info.schema.mutation_type_name() {
                        Some(n) => opaque(TypeRef::named((*info.schema.get_type(n).unwrap()).clone())),
                        None => Value::Null,
                    })
                }),
            ),
            field(
                "subscriptionType",
                named("__Type"),
                resolver(|_s, _a, _c, info| {
                    Ok(match info.schema.subscription_type_name() {
                        Some(n) => opaque(TypeRef::named((*info.schema.get_type(n).unwrap()).clone())),
                        None => Value::Null,
                    })
                }),
            ),
            field(
                "directives",
                named("__Directive").non_null().list().non_null(),
                resolver(|_s, _a, _c, info| {
                    let list =
                        info.schema.directives().map(|d| opaque(d.clone())).collect();
                    Ok(Value::List(list))
                }),
            ),
        ],
    )
}

fn type_type() -> NamedType {
    obj(
        "__Type",
        vec![
            field(
                "kind",
                named("__TypeKind").non_null(),
                resolver(|s, _a, _c, _i| {
                    let t = s.downcast::<TypeRef>();
                    Ok(Value::String(type_ref_kind(&t).into()))
                }),
            ),
            field(
                "name",
                string_ty(),
                resolver(|s, _a, _c, _i| {
                    Ok(match s.downcast::<TypeRef>() {
                        TypeRef::Named(lazy) => Value::String(lazy.resolve().name().into()),
                        _ => Value::Null,
                    })
                }),
            ),
            field(
                "description",
                string_ty(),
                resolver(|s, _a, _c, _i| {
                    Ok(match s.downcast::<TypeRef>() {
                        TypeRef::Named(lazy) => {
                            lazy.resolve().description().map(Value::string).unwrap_or(Value::Null)
                        }
                        _ => Value::Null,
                    })
                }),
            ),
            field(
                "specifiedByURL",
                string_ty(),
                resolver(|s, _a, _c, _i| {
                    Ok(match s.downcast::<TypeRef>() {
                        TypeRef::Named(lazy) => match lazy.resolve() {
                            NamedType::Scalar(sc) => {
                                sc.specified_by_url.clone().map(Value::String).unwrap_or(Value::Null)
                            }
                            _ => Value::Null,
                        },
                        _ => Value::Null,
                    })
                }),
            ),
            field(
                "fields",
                named("__Field").non_null().list(),
                resolver(|s, args, _c, _i| {
                    let include_deprecated =
                        args.get("includeDeprecated").and_then(Value::as_bool).unwrap_or(false);
                    Ok(match s.downcast::<TypeRef>() {
                        TypeRef::Named(lazy) => match lazy.resolve().fields() {
                            Some(fields) => Value::List(
                                fields
                                    .iter()
                                    .filter(|f| {
                                        !f.is_builtin()
                                            && (include_deprecated
                                                || !f.deprecation_status.is_deprecated())
                                    })
                                    .map(|f| opaque(f.clone()))
                                    .collect(),
                            ),
                            None => Value::Null,
                        },
                        _ => Value::Null,
                    })
                }),
            ),
            field(
                "interfaces",
                named("__Type").non_null().list(),
                resolver(|s, _a, _c, info| {
                    let names: Option<Vec<ArcStr>> = match s.downcast::<TypeRef>() {
                        TypeRef::Named(lazy) => match lazy.resolve() {
                            NamedType::Object(o) => Some(o.interfaces.clone()),
                            NamedType::Interface(i) => Some(i.interfaces.clone()),
                            _ => None,
                        },
                        _ => None,
                    };
                    Ok(match names {
                        Some(names) => Value::List(
                            names
                                .iter()
                                .map(|n| opaque(TypeRef::named((*info.schema.get_type(n).unwrap()).clone())))
                                .collect(),
                        ),
                        None => Value::Null,
                    })
                }),
            ),
            field(
                "possibleTypes",
                named("__Type").non_null().list(),
                resolver(|s, _a, _c, info| {
                    let target_name = match s.downcast::<TypeRef>() {
                        TypeRef::Named(lazy) => lazy.resolve().name().to_string(),
                        _ => return Ok(Value::Null),
                    };
                    info.schema.force_full_resolution();
                    let members: Vec<Value> = info
                        .schema
                        .known_types()
                        .filter_map(|t| match t {
                            NamedType::Object(o) if o.interfaces.iter().any(|i| **i == target_name) => {
                                Some(opaque(TypeRef::named(t.clone())))
                            }
                            _ => None,
                        })
                        .collect();
                    let union_members: Option<Vec<Value>> =
                        info.schema.get_type(&target_name).and_then(|t| match t.as_ref() {
                            NamedType::Union(u) => Some(
                                u.members
                                    .iter()
                                    .map(|m| opaque(TypeRef::named((*info.schema.get_type(m).unwrap()).clone())))
                                    .collect(),
                            ),
                            _ => None,
                        });
                    Ok(match union_members {
                        Some(m) => Value::List(m),
                        None if !members.is_empty() => Value::List(members),
                        None => Value::Null,
                    })
                }),
            ),
            field(
                "enumValues",
                named("__EnumValue").non_null().list(),
                resolver(|s, args, _c, _i| {
                    let include_deprecated =
                        args.get("includeDeprecated").and_then(Value::as_bool).unwrap_or(false);
                    Ok(match s.downcast::<TypeRef>() {
                        TypeRef::Named(lazy) => match lazy.resolve() {
                            NamedType::Enum(e) => Value::List(
                                e.values
                                    .iter()
                                    .filter(|v| {
                                        include_deprecated || !v.deprecation_status.is_deprecated()
                                    })
                                    .map(|v| opaque(v.clone()))
                                    .collect(),
                            ),
                            _ => Value::Null,
                        },
                        _ => Value::Null,
                    })
                }),
            ),
            field(
                "inputFields",
                named("__InputValue").non_null().list(),
                resolver(|s, _a, _c, _i| {
                    Ok(match s.downcast::<TypeRef>() {
                        TypeRef::Named(lazy) => match lazy.resolve() {
                            NamedType::InputObject(io) => Value::List(
                                io.input_fields.iter().map(|f| opaque(f.clone())).collect(),
                            ),
                            _ => Value::Null,
                        },
                        _ => Value::Null,
                    })
                }),
            ),
            field(
                "ofType",
                named("__Type"),
                resolver(|s, _a, _c, _i| {
                    Ok(match s.downcast::<TypeRef>() {
                        TypeRef::List(inner) | TypeRef::NonNull(inner) => opaque((**inner).clone()),
                        TypeRef::Named(_) => Value::Null,
                    })
                }),
            ),
        ],
    )
}

fn type_ref_kind(t: &TypeRef) -> &'static str {
    match t {
        TypeRef::List(_) => "LIST",
        TypeRef::NonNull(_) => "NON_NULL",
        TypeRef::Named(lazy) => match lazy.resolve().kind() {
            super::types::TypeKind::Scalar => "SCALAR",
            super::types::TypeKind::Object => "OBJECT",
            super::types::TypeKind::Interface => "INTERFACE",
            super::types::TypeKind::Union => "UNION",
            super::types::TypeKind::Enum => "ENUM",
            super::types::TypeKind::InputObject => "INPUT_OBJECT",
        },
    }
}

fn field_type() -> NamedType {
    obj(
        "__Field",
        vec![
            field("name", string_ty().non_null(), resolver(|s, _a, _c, _i| {
                Ok(Value::String(s.downcast::<Field>().name.clone()))
            })),
            field("description", string_ty(), resolver(|s, _a, _c, _i| {
                Ok(s.downcast::<Field>().description.clone().map(Value::String).unwrap_or(Value::Null))
            })),
            field(
                "args",
                named("__InputValue").non_null().list().non_null(),
                resolver(|s, _a, _c, _i| {
                    Ok(Value::List(
                        s.downcast::<Field>().arguments.iter().map(|a| opaque(a.clone())).collect(),
                    ))
                }),
            ),
            field("type", named("__Type").non_null(), resolver(|s, _a, _c, _i| {
                Ok(opaque(s.downcast::<Field>().field_type.clone()))
            })),
            field("isDeprecated", bool_ty().non_null(), resolver(|s, _a, _c, _i| {
                Ok(Value::Boolean(s.downcast::<Field>().deprecation_status.is_deprecated()))
            })),
            field("deprecationReason", string_ty(), resolver(|s, _a, _c, _i| {
                Ok(s.downcast::<Field>()
                    .deprecation_status
                    .reason()
                    .map(Value::string)
                    .unwrap_or(Value::Null))
            })),
        ],
    )
}

fn input_value_type() -> NamedType {
    obj(
        "__InputValue",
        vec![
            field("name", string_ty().non_null(), resolver(|s, _a, _c, _i| {
                Ok(Value::String(s.downcast::<Argument>().name.clone()))
            })),
            field("description", string_ty(), resolver(|s, _a, _c, _i| {
                Ok(s.downcast::<Argument>().description.clone().map(Value::String).unwrap_or(Value::Null))
            })),
            field("type", named("__Type").non_null(), resolver(|s, _a, _c, _i| {
                Ok(opaque(s.downcast::<Argument>().arg_type.clone()))
            })),
            field("defaultValue", string_ty(), resolver(|s, _a, _c, _i| {
                Ok(match &s.downcast::<Argument>().default_value {
                    Some(v) => Value::String(crate::schema::printer::print_value(v).into()),
                    None => Value::Null,
                })
            })),
        ],
    )
}

fn enum_value_type() -> NamedType {
    obj(
        "__EnumValue",
        vec![
            field("name", string_ty().non_null(), resolver(|s, _a, _c, _i| {
                Ok(Value::String(s.downcast::<EnumValue>().name.clone()))
            })),
            field("description", string_ty(), resolver(|s, _a, _c, _i| {
                Ok(s.downcast::<EnumValue>().description.clone().map(Value::String).unwrap_or(Value::Null))
            })),
            field("isDeprecated", bool_ty().non_null(), resolver(|s, _a, _c, _i| {
                Ok(Value::Boolean(s.downcast::<EnumValue>().deprecation_status.is_deprecated()))
            })),
            field("deprecationReason", string_ty(), resolver(|s, _a, _c, _i| {
                Ok(s.downcast::<EnumValue>()
                    .deprecation_status
                    .reason()
                    .map(Value::string)
                    .unwrap_or(Value::Null))
            })),
        ],
    )
}

fn directive_type() -> NamedType {
    obj(
        "__Directive",
        vec![
            field("name", string_ty().non_null(), resolver(|s, _a, _c, _i| {
                Ok(Value::String(s.downcast::<DirectiveType>().name.clone()))
            })),
            field("description", string_ty(), resolver(|s, _a, _c, _i| {
                Ok(s.downcast::<DirectiveType>().description.clone().map(Value::String).unwrap_or(Value::Null))
            })),
            field(
                "locations",
                named("__DirectiveLocation").non_null().list().non_null(),
                resolver(|s, _a, _c, _i| {
                    Ok(Value::List(
                        s.downcast::<DirectiveType>()
                            .locations
                            .iter()
                            .map(|l| Value::String(l.name().into()))
                            .collect(),
                    ))
                }),
            ),
            field(
                "args",
                named("__InputValue").non_null().list().non_null(),
                resolver(|s, _a, _c, _i| {
                    Ok(Value::List(
                        s.downcast::<DirectiveType>().arguments.iter().map(|a| opaque(a.clone())).collect(),
                    ))
                }),
            ),
            field("isRepeatable", bool_ty().non_null(), resolver(|s, _a, _c, _i| {
                Ok(Value::Boolean(s.downcast::<DirectiveType>().is_repeatable))
            })),
        ],
    )
}

fn type_kind_enum() -> NamedType {
    NamedType::Enum(super::types::EnumType {
        name: "__TypeKind".into(),
        description: None,
        values: [
            "SCALAR", "OBJECT", "INTERFACE", "UNION", "ENUM", "INPUT_OBJECT", "LIST", "NON_NULL",
        ]
        .into_iter()
        .map(|n| EnumValue {
            name: n.into(),
            description: None,
            deprecation_status: DeprecationStatus::Current,
            value: Value::String(n.into()),
        })
        .collect(),
    })
}

fn directive_location_enum() -> NamedType {
    use super::directive::DirectiveLocation as L;
    let all = [
        L::Query,
        L::Mutation,
        L::Subscription,
        L::Field,
        L::FragmentDefinition,
        L::FragmentSpread,
        L::InlineFragment,
        L::Schema,
        L::Scalar,
        L::Object,
        L::FieldDefinition,
        L::ArgumentDefinition,
        L::Interface,
        L::Union,
        L::Enum,
        L::EnumValue,
        L::InputObject,
        L::InputFieldDefinition,
    ];
    NamedType::Enum(super::types::EnumType {
        name: "__DirectiveLocation".into(),
        description: None,
        values: all
            .into_iter()
            .map(|l| EnumValue {
                name: l.name().into(),
                description: None,
                deprecation_status: DeprecationStatus::Current,
                value: Value::String(l.name().into()),
            })
            .collect(),
    })
}

/// Trait object helper used above: pulls a typed reference out of the
/// opaque source `Value` a resolver receives.
trait Downcast {
    fn downcast<T: std::any::Any + Clone>(&self) -> T;
}

impl Downcast for Value {
    fn downcast<T: std::any::Any + Clone>(&self) -> T {
        match self {
            Value::Opaque(o) => o.downcast_ref::<T>().expect("introspection source type mismatch").clone(),
            _ => panic!("expected opaque introspection source value"),
        }
    }
}
