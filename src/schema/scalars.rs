//! The standard scalars every schema carries (§3.2): `Int`, `Float`,
//! `String`, `Boolean`, `ID`.

use std::sync::Arc;

use crate::ast;
use crate::value::Value;

use super::types::{NamedType, ScalarType};

fn scalar(
    name: &'static str,
    parse_value: impl Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    parse_literal: impl Fn(&ast::Value) -> Result<Value, String> + Send + Sync + 'static,
    serialize: impl Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
) -> NamedType {
    NamedType::Scalar(ScalarType {
        name: name.into(),
        description: None,
        specified_by_url: None,
        parse_value: Arc::new(parse_value),
        parse_literal: Arc::new(parse_literal),
        serialize: Arc::new(serialize),
    })
}

pub fn int() -> NamedType {
    scalar(
        "Int",
        |v| match v {
            Value::Int(i) => Ok(Value::Int(*i)),
            Value::Float(f) if f.fract() == 0.0 => Ok(Value::Int(*f as i64)),
            other => Err(format!("Int cannot represent non-integer value: {other:?}")),
        },
        |v| match v {
            ast::Value::Int(i) => Ok(Value::Int(*i)),
            other => Err(format!("Int cannot represent non-integer value: {other:?}")),
        },
        |v| match v {
            Value::Int(i) => Ok(Value::Int(*i)),
            other => Err(format!("Int cannot represent non-integer value: {other:?}")),
        },
    )
}

pub fn float() -> NamedType {
    scalar(
        "Float",
        |v| match v {
            Value::Float(f) => Ok(Value::Float(*f)),
            Value::Int(i) => Ok(Value::Float(*i as f64)),
            other => Err(format!("Float cannot represent non-numeric value: {other:?}")),
        },
        |v| match v {
            ast::Value::Float(f) => Ok(Value::Float(*f)),
            ast::Value::Int(i) => Ok(Value::Float(*i as f64)),
            other => Err(format!("Float cannot represent non-numeric value: {other:?}")),
        },
        |v| match v {
            Value::Float(f) => Ok(Value::Float(*f)),
            Value::Int(i) => Ok(Value::Float(*i as f64)),
            other => Err(format!("Float cannot represent non-numeric value: {other:?}")),
        },
    )
}

pub fn string() -> NamedType {
    scalar(
        "String",
        |v| match v {
            Value::String(s) => Ok(Value::String(s.clone())),
            other => Err(format!("String cannot represent a non-string value: {other:?}")),
        },
        |v| match v {
            ast::Value::String(s) => Ok(Value::String(s.clone())),
            other => Err(format!("String cannot represent a non-string value: {other:?}")),
        },
        |v| match v {
            Value::String(s) => Ok(Value::String(s.clone())),
            other => Err(format!("String cannot represent a non-string value: {other:?}")),
        },
    )
}

pub fn boolean() -> NamedType {
    scalar(
        "Boolean",
        |v| match v {
            Value::Boolean(b) => Ok(Value::Boolean(*b)),
            other => Err(format!("Boolean cannot represent a non-boolean value: {other:?}")),
        },
        |v| match v {
            ast::Value::Boolean(b) => Ok(Value::Boolean(*b)),
            other => Err(format!("Boolean cannot represent a non-boolean value: {other:?}")),
        },
        |v| match v {
            Value::Boolean(b) => Ok(Value::Boolean(*b)),
            other => Err(format!("Boolean cannot represent a non-boolean value: {other:?}")),
        },
    )
}

pub fn id() -> NamedType {
    scalar(
        "ID",
        |v| match v {
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::Int(i) => Ok(Value::String(i.to_string().into())),
            other => Err(format!("ID cannot represent value: {other:?}")),
        },
        |v| match v {
            ast::Value::String(s) => Ok(Value::String(s.clone())),
            ast::Value::Int(i) => Ok(Value::String(i.to_string().into())),
            other => Err(format!("ID cannot represent value: {other:?}")),
        },
        |v| match v {
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::Int(i) => Ok(Value::String(i.to_string().into())),
            other => Err(format!("ID cannot represent value: {other:?}")),
        },
    )
}
