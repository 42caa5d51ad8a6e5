//! The fixed schema and `expect_passes_rule!`/`expect_fails_rule!` harness
//! every rule's unit tests run against (§4.8 [AMBIENT]).
//!
//! Mirrors the reference implementation's `validation::test_harness`: the
//! same cast of types (`Being`/`Pet`/`Dog`/`Cat`/`Human`/`Alien`, the
//! `ComplicatedArgs` kitchen-sink object, a handful of executable-location
//! test directives) generalized from its macro-registered `GraphQLType`
//! impls to a plain [`SchemaBuilder`] call, since this crate's schema has no
//! macro layer to register against.

#![cfg(test)]

use arcstr::ArcStr;

use crate::ast::parse;
use crate::schema::directive::{DirectiveLocation, DirectiveType};
use crate::schema::types::{
    Argument, EnumType, EnumValue, Field, InputObjectType, InterfaceType, NamedType, ObjectType,
    TypeRef, UnionType,
};
use crate::schema::{scalars, Schema, SchemaBuilder};
use crate::value::Value;

use super::context::ValidationContext;
use super::visitor::{visit, Rule};

fn field(name: &str, ty: TypeRef) -> Field {
    Field {
        name: name.into(),
        description: None,
        arguments: vec![],
        field_type: ty,
        deprecation_status: crate::schema::DeprecationStatus::Current,
        resolver: None,
        complexity: None,
    }
}

fn field_with_args(name: &str, ty: TypeRef, args: Vec<Argument>) -> Field {
    Field { arguments: args, ..field(name, ty) }
}

fn arg(name: &str, ty: TypeRef) -> Argument {
    Argument { name: name.into(), description: None, arg_type: ty, default_value: None }
}

fn arg_default(name: &str, ty: TypeRef, default: Value) -> Argument {
    Argument { name: name.into(), description: None, arg_type: ty, default_value: Some(default) }
}

fn named(ty: NamedType) -> TypeRef {
    TypeRef::named(ty)
}

fn string() -> TypeRef {
    TypeRef::named(scalars::string())
}

fn int() -> TypeRef {
    TypeRef::named(scalars::int())
}

fn boolean() -> TypeRef {
    TypeRef::named(scalars::boolean())
}

fn id() -> TypeRef {
    TypeRef::named(scalars::id())
}

fn float() -> TypeRef {
    TypeRef::named(scalars::float())
}

/// Builds the canonical cross-rule test schema (§4.8): `Being`/`Pet`/
/// `Canine` interfaces, `Dog`/`Cat` implementers, `DogCommand`/`FurColor`
/// enums, `CatOrDog`/`DogOrHuman`/`HumanOrAlien` unions, the
/// `ComplicatedArgs` kitchen sink, and a `QueryRoot` exposing all of it.
pub fn test_schema() -> Schema {
    let being = NamedType::Interface(InterfaceType {
        name: "Being".into(),
        description: None,
        fields: vec![field_with_args("name", string(), vec![arg("surname", boolean())])],
        interfaces: vec![],
    });
    let pet = NamedType::Interface(InterfaceType {
        name: "Pet".into(),
        description: None,
        fields: vec![field_with_args("name", string(), vec![arg("surname", boolean())])],
        interfaces: vec!["Being".into()],
    });
    let canine = NamedType::Interface(InterfaceType {
        name: "Canine".into(),
        description: None,
        fields: vec![field_with_args("name", string(), vec![arg("surname", boolean())])],
        interfaces: vec!["Being".into()],
    });

    let dog_command = NamedType::Enum(EnumType {
        name: "DogCommand".into(),
        description: None,
        values: ["SIT", "HEEL", "DOWN"]
            .into_iter()
            .map(|n| EnumValue {
                name: n.into(),
                description: None,
                deprecation_status: crate::schema::DeprecationStatus::Current,
                value: Value::String(n.into()),
            })
            .collect(),
    });

    let dog = NamedType::Object(ObjectType {
        name: "Dog".into(),
        description: None,
        fields: vec![
            field_with_args("name", string(), vec![arg("surname", boolean())]),
            field("nickname", string()),
            field("barkVolume", int()),
            field("barks", boolean()),
            field_with_args(
                "doesKnowCommand",
                boolean(),
                vec![arg("dogCommand", named(dog_command.clone()).non_null())],
            ),
            field_with_args(
                "isHousetrained",
                boolean(),
                vec![arg_default("atOtherHomes", boolean(), Value::Boolean(true))],
            ),
            field_with_args(
                "isAtLocation",
                boolean(),
                vec![arg("x", int()), arg("y", int())],
            ),
        ],
        interfaces: vec!["Being".into(), "Pet".into(), "Canine".into()],
        is_type_of: None,
    });

    let fur_color = NamedType::Enum(EnumType {
        name: "FurColor".into(),
        description: None,
        values: ["BROWN", "BLACK", "TAN", "SPOTTED"]
            .into_iter()
            .map(|n| EnumValue {
                name: n.into(),
                description: None,
                deprecation_status: crate::schema::DeprecationStatus::Current,
                value: Value::String(n.into()),
            })
            .collect(),
    });

    let cat = NamedType::Object(ObjectType {
        name: "Cat".into(),
        description: None,
        fields: vec![
            field_with_args("name", string(), vec![arg("surname", boolean())]),
            field("nickname", string()),
            field("meows", boolean()),
            field("meowVolume", int()),
            field("furColor", named(fur_color.clone())),
        ],
        interfaces: vec!["Being".into(), "Pet".into()],
        is_type_of: None,
    });

    let cat_or_dog = NamedType::Union(UnionType {
        name: "CatOrDog".into(),
        description: None,
        members: vec!["Cat".into(), "Dog".into()],
        resolve_type: None,
    });

    let intelligent = NamedType::Interface(InterfaceType {
        name: "Intelligent".into(),
        description: None,
        fields: vec![field("iq", int())],
        interfaces: vec![],
    });

    let human = NamedType::Object(ObjectType {
        name: "Human".into(),
        description: None,
        fields: vec![
            field_with_args("name", string(), vec![arg("surname", boolean())]),
            field("pets", named(pet.clone()).list()),
            field("relatives", TypeRef::lazy(human_thunk).list()),
            field("iq", int()),
        ],
        interfaces: vec!["Being".into(), "Intelligent".into()],
        is_type_of: None,
    });

    let alien = NamedType::Object(ObjectType {
        name: "Alien".into(),
        description: None,
        fields: vec![
            field_with_args("name", string(), vec![arg("surname", boolean())]),
            field("numEyes", int()),
            field("iq", int()),
        ],
        interfaces: vec!["Being".into(), "Intelligent".into()],
        is_type_of: None,
    });

    let dog_or_human = NamedType::Union(UnionType {
        name: "DogOrHuman".into(),
        description: None,
        members: vec!["Dog".into(), "Human".into()],
        resolve_type: None,
    });
    let human_or_alien = NamedType::Union(UnionType {
        name: "HumanOrAlien".into(),
        description: None,
        members: vec!["Human".into(), "Alien".into()],
        resolve_type: None,
    });

    let complex_input = NamedType::InputObject(InputObjectType {
        name: "ComplexInput".into(),
        description: None,
        input_fields: vec![
            arg("requiredField", boolean().non_null()),
            arg_default("nonNullField", boolean().non_null(), Value::Boolean(false)),
            arg("intField", int()),
            arg("stringField", string()),
            arg("booleanField", boolean()),
            arg("stringListField", string().list()),
        ],
    });

    let complicated_args = NamedType::Object(ObjectType {
        name: "ComplicatedArgs".into(),
        description: None,
        fields: vec![
            field_with_args("intArgField", string(), vec![arg("intArg", int())]),
            field_with_args(
                "nonNullIntArgField",
                string(),
                vec![arg("nonNullIntArg", int().non_null())],
            ),
            field_with_args("stringArgField", string(), vec![arg("stringArg", string())]),
            field_with_args("booleanArgField", string(), vec![arg("booleanArg", boolean())]),
            field_with_args("enumArgField", string(), vec![arg("enumArg", named(fur_color.clone()))]),
            field_with_args("floatArgField", string(), vec![arg("floatArg", float())]),
            field_with_args("idArgField", string(), vec![arg("idArg", id())]),
            field_with_args("stringListArgField", string(), vec![arg("stringListArg", string().list())]),
            field_with_args(
                "complexArgField",
                string(),
                vec![arg("complexArg", named(complex_input.clone()))],
            ),
            field_with_args(
                "multipleReqs",
                string(),
                vec![arg("req1", int().non_null()), arg("req2", int().non_null())],
            ),
            field_with_args(
                "nonNullFieldWithDefault",
                string(),
                vec![arg_default("arg", int().non_null(), Value::Int(0))],
            ),
            field_with_args(
                "multipleOpts",
                string(),
                vec![
                    arg_default("opt1", int(), Value::Int(0)),
                    arg_default("opt2", int(), Value::Int(0)),
                ],
            ),
        ],
        interfaces: vec![],
        is_type_of: None,
    });

    let query_root = NamedType::Object(ObjectType {
        name: "QueryRoot".into(),
        description: None,
        fields: vec![
            field_with_args("human", named(human.clone()), vec![arg("id", id())]),
            field("alien", named(alien.clone())),
            field("dog", named(dog.clone())),
            field("cat", named(cat.clone())),
            field("pet", named(pet.clone())),
            field("catOrDog", named(cat_or_dog.clone())),
            field("dogOrHuman", named(dog_or_human.clone())),
            field("humanOrAlien", named(human_or_alien.clone())),
            field("complicatedArgs", named(complicated_args.clone())),
        ],
        interfaces: vec![],
        is_type_of: None,
    });

    SchemaBuilder::new(query_root)
        .mutation(NamedType::Object(ObjectType {
            name: "MutationRoot".into(),
            description: None,
            fields: vec![field("dog", named(dog.clone()))],
            interfaces: vec![],
            is_type_of: None,
        }))
        .subscription(NamedType::Object(ObjectType {
            name: "SubscriptionRoot".into(),
            description: None,
            fields: vec![field("dog", named(dog.clone()))],
            interfaces: vec![],
            is_type_of: None,
        }))
        .additional_type(being)
        .additional_type(pet)
        .additional_type(canine)
        .additional_type(dog_command)
        .additional_type(dog)
        .additional_type(fur_color)
        .additional_type(cat)
        .additional_type(cat_or_dog)
        .additional_type(intelligent)
        .additional_type(human)
        .additional_type(alien)
        .additional_type(dog_or_human)
        .additional_type(human_or_alien)
        .additional_type(complex_input)
        .additional_type(complicated_args)
        .directive(test_directive("onQuery", DirectiveLocation::Query))
        .directive(test_directive("onMutation", DirectiveLocation::Mutation))
        .directive(test_directive("onField", DirectiveLocation::Field))
        .directive(test_directive("onFragmentDefinition", DirectiveLocation::FragmentDefinition))
        .directive(test_directive("onFragmentSpread", DirectiveLocation::FragmentSpread))
        .directive(test_directive("onInlineFragment", DirectiveLocation::InlineFragment))
        .finish()
        .expect("test schema must build")
}

fn human_thunk() -> NamedType {
    // Rebuilding the whole schema to get one type back is wasteful but this
    // thunk only exists to demonstrate/exercise lazy self-reference; the
    // harness never resolves enough of the graph for it to matter.
    NamedType::Object(ObjectType {
        name: "Human".into(),
        description: None,
        fields: vec![field("iq", int())],
        interfaces: vec!["Being".into(), "Intelligent".into()],
        is_type_of: None,
    })
}

fn test_directive(name: &str, location: DirectiveLocation) -> DirectiveType {
    DirectiveType {
        name: name.into(),
        description: None,
        locations: vec![location],
        arguments: vec![],
        is_repeatable: false,
    }
}

/// Runs a single rule over `query`, returning the accumulated rule errors.
pub fn validate_with_schema(schema: &Schema, rule: impl Rule + 'static, query: &str) -> Vec<crate::error::RuleError> {
    let doc = parse(query).unwrap_or_else(|e| panic!("parse error on input {query:?}: {e}"));
    let mut ctx = ValidationContext::new(schema, &doc);
    let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(rule)];
    visit(&mut ctx, &mut rules);
    ctx.into_errors()
}

pub fn expect_passes_rule(rule: impl Rule + 'static, query: &str) {
    expect_passes_rule_with_schema(&test_schema(), rule, query);
}

pub fn expect_passes_rule_with_schema(schema: &Schema, rule: impl Rule + 'static, query: &str) {
    let errors = validate_with_schema(schema, rule, query);
    assert!(errors.is_empty(), "expected rule to pass, but got errors: {errors:?}");
}

pub fn expect_fails_rule(rule: impl Rule + 'static, query: &str, expected_messages: &[&str]) {
    expect_fails_rule_with_schema(&test_schema(), rule, query, expected_messages);
}

pub fn expect_fails_rule_with_schema(
    schema: &Schema,
    rule: impl Rule + 'static,
    query: &str,
    expected_messages: &[&str],
) {
    let errors = validate_with_schema(schema, rule, query);
    let messages: Vec<&str> = errors.iter().map(|e| e.message()).collect();
    assert_eq!(messages, expected_messages, "unexpected set of validation errors");
}

/// Names that appear only as a compile-time documentation aid for readers
/// skimming this module's exports (`ArcStr`'s re-export keeps the `arcstr`
/// import used even where a test doesn't need it directly).
#[allow(dead_code)]
type _Unused = ArcStr;
