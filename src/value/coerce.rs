//! Bidirectional coercion between input values and typed runtime values
//! (§4.1), shared by the validator (rule 9, "values of correct type") and
//! the executor (argument/variable coercion, §4.4).

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::ast;
use crate::error::PathSegment;
use crate::schema::{NamedType, TypeRef};
use crate::util::{did_you_mean, suggestion_list};

use super::Value;

/// One coercion failure, located at a path into the input value/literal
/// being coerced (§3.3: "a coerced input value").
#[derive(Clone, Debug, PartialEq)]
pub struct CoercionError {
    pub message: String,
    pub path: Vec<PathSegment>,
}

impl CoercionError {
    fn new(message: impl Into<String>) -> Self {
        CoercionError { message: message.into(), path: Vec::new() }
    }

    fn prefixed(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }
}

fn at(errors: Vec<CoercionError>, segment: PathSegment) -> Vec<CoercionError> {
    errors.into_iter().map(|e| e.prefixed(segment.clone())).collect()
}

/// `coerceInputValue`: maps a host (JSON-like) [`Value`] into a typed
/// runtime value against `ty` (§4.1). Never partially reports: the result
/// is either a pure value or a non-empty error list (§8 testable property).
pub fn coerce_input_value(value: &Value, ty: &TypeRef) -> Result<Value, Vec<CoercionError>> {
    match ty {
        TypeRef::NonNull(inner) => {
            if value.is_null() {
                return Err(vec![CoercionError::new(format!(
                    "Expected non-nullable type \"{ty:?}\" not to be null."
                ))]);
            }
            coerce_input_value(value, inner)
        }
        TypeRef::List(inner) => coerce_input_list(value, inner),
        TypeRef::Named(lazy) => {
            if value.is_null() {
                return Ok(Value::Null);
            }
            match lazy.resolve() {
                NamedType::Scalar(scalar) => (scalar.parse_value)(value)
                    .map_err(|e| vec![CoercionError::new(format!("Expected type \"{}\". {e}", scalar.name))]),
                NamedType::Enum(en) => coerce_input_enum(value, en),
                NamedType::InputObject(io) => coerce_input_object(value, io),
                other => Err(vec![CoercionError::new(format!(
                    "\"{}\" is not an input type",
                    other.name()
                ))]),
            }
        }
    }
}

fn coerce_input_list(value: &Value, element_type: &TypeRef) -> Result<Value, Vec<CoercionError>> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    match value {
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            let mut errors = Vec::new();
            for (i, item) in items.iter().enumerate() {
                match coerce_input_value(item, element_type) {
                    Ok(v) => out.push(v),
                    Err(e) => errors.extend(at(e, PathSegment::Index(i))),
                }
            }
            if errors.is_empty() {
                Ok(Value::List(out))
            } else {
                Err(errors)
            }
        }
        // "list-of-one" rule: a non-list input coerces as a singleton list.
        other => coerce_input_value(other, element_type).map(|v| Value::List(vec![v])),
    }
}

fn coerce_input_enum(value: &Value, en: &crate::schema::EnumType) -> Result<Value, Vec<CoercionError>> {
    let Some(name) = value.as_str() else {
        return Err(vec![CoercionError::new(format!(
            "Enum \"{}\" cannot represent non-string value: {value:?}",
            en.name
        ))]);
    };
    match en.value_named(name) {
        Some(v) => Ok(v.value.clone()),
        None => {
            let names: Vec<&str> = en.values.iter().map(|v| v.name.as_str()).collect();
            let suggestions = suggestion_list(name, names);
            Err(vec![CoercionError::new(format!(
                "Value \"{name}\" does not exist in \"{}\" enum.{}",
                en.name,
                did_you_mean(&suggestions)
            ))])
        }
    }
}

fn coerce_input_object(
    value: &Value,
    io: &crate::schema::InputObjectType,
) -> Result<Value, Vec<CoercionError>> {
    let Some(map) = value.as_object() else {
        return Err(vec![CoercionError::new(format!(
            "Expected type \"{}\" to be an object.",
            io.name
        ))]);
    };
    let mut errors = Vec::new();
    let mut out = IndexMap::new();
    for field in &io.input_fields {
        let key: ArcStr = field.name.clone();
        match map.get(&key) {
            Some(v) => match coerce_input_value(v, &field.arg_type) {
                Ok(coerced) => {
                    out.insert(key, coerced);
                }
                Err(e) => errors.extend(at(e, PathSegment::Field(field.name.to_string()))),
            },
            None => match &field.default_value {
                Some(default) => {
                    out.insert(key, default.clone());
                }
                None if field.arg_type.is_non_null() => {
                    errors.push(
                        CoercionError::new(format!(
                            "Field \"{}\" of required type \"{:?}\" was not provided.",
                            field.name, field.arg_type
                        ))
                        .prefixed(PathSegment::Field(field.name.to_string())),
                    );
                }
                None => {}
            },
        }
    }
    for key in map.keys() {
        if io.field_named(key).is_none() {
            let names: Vec<&str> = io.input_fields.iter().map(|f| f.name.as_str()).collect();
            let suggestions = suggestion_list(key, names);
            errors.push(CoercionError::new(format!(
                "Field \"{key}\" is not defined by type \"{}\".{}",
                io.name,
                did_you_mean(&suggestions)
            )));
        }
    }
    if errors.is_empty() {
        Ok(Value::Object(out))
    } else {
        Err(errors)
    }
}

/// `coerceLiteral`: coerces an AST literal `valueNode` against `ty`,
/// resolving `Value::Variable` nodes through `variables` (§4.1).
///
/// Returns `Ok(None)` for "undefined" (a variable not present in
/// `variables`, or absent with no default applicable at this position) —
/// the distilled spec's `undefined`, distinct from `Ok(Some(Value::Null))`
/// which is an explicit null (§9: "absent vs. present but undefined").
pub fn coerce_literal(
    node: &ast::Value,
    ty: &TypeRef,
    variables: &IndexMap<ArcStr, Value>,
) -> Result<Option<Value>, Vec<CoercionError>> {
    if let ast::Value::Variable(name) = node {
        return Ok(variables.get(name).cloned());
    }
    match ty {
        TypeRef::NonNull(inner) => {
            if matches!(node, ast::Value::Null) {
                return Err(vec![CoercionError::new(format!(
                    "Expected non-nullable type \"{ty:?}\" not to be null."
                ))]);
            }
            coerce_literal(node, inner, variables)
        }
        TypeRef::List(inner) => coerce_list_literal(node, inner, variables),
        TypeRef::Named(lazy) => {
            if matches!(node, ast::Value::Null) {
                return Ok(Some(Value::Null));
            }
            match lazy.resolve() {
                NamedType::Scalar(scalar) => (scalar.parse_literal)(node)
                    .map(Some)
                    .map_err(|e| vec![CoercionError::new(format!("Expected type \"{}\". {e}", scalar.name))]),
                NamedType::Enum(en) => coerce_enum_literal(node, en).map(Some),
                NamedType::InputObject(io) => coerce_input_object_literal(node, io, variables).map(Some),
                other => Err(vec![CoercionError::new(format!(
                    "\"{}\" is not an input type",
                    other.name()
                ))]),
            }
        }
    }
}

fn coerce_list_literal(
    node: &ast::Value,
    element_type: &TypeRef,
    variables: &IndexMap<ArcStr, Value>,
) -> Result<Option<Value>, Vec<CoercionError>> {
    match node {
        ast::Value::Null => Ok(Some(Value::Null)),
        ast::Value::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            let mut errors = Vec::new();
            for (i, item) in items.iter().enumerate() {
                match coerce_literal(&item.item, element_type, variables) {
                    Ok(Some(v)) => out.push(v),
                    Ok(None) => out.push(Value::Null),
                    Err(e) => errors.extend(at(e, PathSegment::Index(i))),
                }
            }
            if errors.is_empty() {
                Ok(Some(Value::List(out)))
            } else {
                Err(errors)
            }
        }
        other => coerce_literal(other, element_type, variables).map(|v| v.map(|v| Value::List(vec![v]))),
    }
}

fn coerce_enum_literal(node: &ast::Value, en: &crate::schema::EnumType) -> Result<Value, Vec<CoercionError>> {
    let name = match node {
        ast::Value::Enum(name) => name.as_str(),
        _ => {
            return Err(vec![CoercionError::new(format!(
                "Enum \"{}\" cannot represent non-enum value.",
                en.name
            ))])
        }
    };
    match en.value_named(name) {
        Some(v) => Ok(v.value.clone()),
        None => {
            let names: Vec<&str> = en.values.iter().map(|v| v.name.as_str()).collect();
            let suggestions = suggestion_list(name, names);
            Err(vec![CoercionError::new(format!(
                "Value \"{name}\" does not exist in \"{}\" enum.{}",
                en.name,
                did_you_mean(&suggestions)
            ))])
        }
    }
}

fn coerce_input_object_literal(
    node: &ast::Value,
    io: &crate::schema::InputObjectType,
    variables: &IndexMap<ArcStr, Value>,
) -> Result<Value, Vec<CoercionError>> {
    let ast::Value::Object(fields) = node else {
        return Err(vec![CoercionError::new(format!(
            "Expected type \"{}\" to be an object.",
            io.name
        ))]);
    };
    let mut errors = Vec::new();
    let mut out = IndexMap::new();
    // Field order follows the type's declared order, not the literal's.
    for field in &io.input_fields {
        match fields.get(&field.name) {
            Some(value_node) => match coerce_literal(&value_node.item, &field.arg_type, variables) {
                Ok(Some(v)) => {
                    out.insert(field.name.clone(), v);
                }
                Ok(None) => {}
                Err(e) => errors.extend(at(e, PathSegment::Field(field.name.to_string()))),
            },
            None => match &field.default_value {
                Some(default) => {
                    out.insert(field.name.clone(), default.clone());
                }
                None if field.arg_type.is_non_null() => {
                    errors.push(
                        CoercionError::new(format!(
                            "Field \"{}\" of required type \"{:?}\" was not provided.",
                            field.name, field.arg_type
                        ))
                        .prefixed(PathSegment::Field(field.name.to_string())),
                    );
                }
                None => {}
            },
        }
    }
    for key in fields.keys() {
        if io.field_named(key).is_none() {
            let names: Vec<&str> = io.input_fields.iter().map(|f| f.name.as_str()).collect();
            let suggestions = suggestion_list(key, names);
            errors.push(CoercionError::new(format!(
                "Field \"{key}\" is not defined by type \"{}\".{}",
                io.name,
                did_you_mean(&suggestions)
            )));
        }
    }
    if errors.is_empty() {
        Ok(Value::Object(out))
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::scalars;
    use crate::schema::types::{Argument, InputObjectType};

    fn int_type() -> TypeRef {
        TypeRef::named(scalars::int())
    }

    #[test]
    fn coerces_matching_scalar() {
        let result = coerce_input_value(&Value::Int(5), &int_type());
        assert_eq!(result.unwrap(), Value::Int(5));
    }

    #[test]
    fn rejects_null_for_non_null() {
        let result = coerce_input_value(&Value::Null, &int_type().non_null());
        assert!(result.is_err());
    }

    #[test]
    fn wraps_single_value_as_list() {
        let result = coerce_input_value(&Value::Int(5), &int_type().list());
        assert_eq!(result.unwrap(), Value::List(vec![Value::Int(5)]));
    }

    #[test]
    fn reports_unknown_input_object_field_with_suggestion() {
        let io = InputObjectType {
            name: "Point".into(),
            description: None,
            input_fields: vec![Argument {
                name: "xx".into(),
                description: None,
                arg_type: int_type(),
                default_value: None,
            }],
        };
        let mut map = super::Object::new();
        map.insert("x".into(), Value::Int(1));
        let errors = coerce_input_object(&Value::Object(map), &io).unwrap_err();
        assert!(errors[0].message.contains("Did you mean \"xx\"?"));
    }

    #[test]
    fn required_input_field_missing_is_an_error() {
        let io = InputObjectType {
            name: "Point".into(),
            description: None,
            input_fields: vec![Argument {
                name: "x".into(),
                description: None,
                arg_type: int_type().non_null(),
                default_value: None,
            }],
        };
        let map = super::Object::new();
        let errors = coerce_input_object(&Value::Object(map), &io).unwrap_err();
        assert!(errors[0].message.contains("was not provided"));
    }
}
