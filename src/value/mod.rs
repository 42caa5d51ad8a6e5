//! The dynamic runtime value representation shared by the coercer and the
//! executor (§9 design notes: "dynamic values end-to-end").
//!
//! Resolvers return arbitrary host values; rather than forcing them through
//! a fixed set of Rust types the way a macro-driven binding would, every
//! value flowing through this engine — coerced input, completed output,
//! and the opaque `source`/`rootValue` objects handed to resolvers — is
//! represented by the single [`Value`] enum below. Completion drives by the
//! *declared* schema type, never by the runtime tag, exactly as specified.

pub mod coerce;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::scheduler::Deferred;

/// An ordered map from response/field name to value, preserving declaration
/// order the way a GraphQL response object must.
pub type Object = IndexMap<ArcStr, Value>;

/// A host value passed through unchanged: a resolver's `source`/`rootValue`,
/// or an enum's associated payload.
#[derive(Clone)]
pub struct Opaque(Arc<dyn Any + Send + Sync>);

impl Opaque {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Opaque(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Opaque(..)")
    }
}

/// The dynamic value type flowing through coercion and execution.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(ArcStr),
    List(Vec<Value>),
    Object(Object),
    /// An opaque host value: a resolver's source object or an enum payload.
    Opaque(Opaque),
    /// A not-yet-settled value produced by a resolver; driven to completion
    /// by the [scheduler](crate::scheduler).
    Deferred(Deferred<Value>),
}

impl Value {
    pub fn string(s: impl Into<ArcStr>) -> Self {
        Value::String(s.into())
    }

    pub fn object(map: Object) -> Self {
        Value::Object(map)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Converts a fully-settled value (no [`Value::Deferred`]) to the
    /// host-facing JSON representation used for the final execution result
    /// (§6.1). Panics if a `Deferred` remains — by the time a value reaches
    /// the result it must have been driven to completion already.
    pub fn into_json(self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::from(i),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Value::into_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.into_iter().map(|(k, v)| (k.to_string(), v.into_json())).collect(),
            ),
            Value::Opaque(_) => {
                serde_json::Value::String("<opaque>".into())
            }
            Value::Deferred(_) => panic!("cannot serialize an unsettled deferred value"),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Value::String(ArcStr::from(s)),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                let mut out = Object::new();
                for (k, v) in map {
                    out.insert(ArcStr::from(k), Value::from(v));
                }
                Value::Object(out)
            }
        }
    }
}
