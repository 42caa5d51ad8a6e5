//! The unified error model (§7): field errors raised by resolvers, schema
//! invariant violations raised at build time, validation errors accumulated
//! while checking a document, and the top-level error a request as a whole
//! can fail with.

use std::fmt;

use derive_more::{Display, Error, From};

use crate::ast::Location;
use crate::value::Value;

/// An error raised by a single field resolver (§6.2, §7 scenario 1/2).
///
/// Converts from anything implementing [`Display`](fmt::Display), so `?`
/// works against resolver bodies returning ordinary error types, the same
/// way propagating an `io::Error` or a `String` does.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    message: String,
    extensions: Option<Value>,
    /// Whether `message` may be shown to clients as-is (§3.3, §6.4). Errors
    /// raised by resolvers default to client-safe; engine-internal
    /// invariant violations are not (§7).
    is_client_safe: bool,
}

impl FieldError {
    pub fn new(message: impl fmt::Display, extensions: Option<Value>) -> Self {
        FieldError {
            message: message.to_string(),
            extensions,
            is_client_safe: true,
        }
    }

    /// An engine-internal error (§7: "internal errors surface as execution
    /// errors with `isClientSafe = false`").
    pub fn internal(message: impl fmt::Display) -> Self {
        FieldError {
            message: message.to_string(),
            extensions: None,
            is_client_safe: false,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn extensions(&self) -> Option<&Value> {
        self.extensions.as_ref()
    }

    pub fn is_client_safe(&self) -> bool {
        self.is_client_safe
    }
}

impl<T: fmt::Display> From<T> for FieldError {
    fn from(e: T) -> Self {
        FieldError::new(e, None)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FieldError {}

/// A [`FieldError`] located at a response path, accumulated during
/// execution and surfaced alongside partial data in the final result
/// (§6.2: "errors propagate to the nearest nullable ancestor").
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionError {
    location: Location,
    path: Vec<PathSegment>,
    error: FieldError,
}

/// One step of a response path (§6.2: field name or list index).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => f.write_str(name),
            PathSegment::Index(i) => write!(f, "{i}"),
        }
    }
}

impl ExecutionError {
    pub fn new(location: Location, path: Vec<PathSegment>, error: FieldError) -> Self {
        ExecutionError { location, path, error }
    }

    pub fn at_origin(error: FieldError) -> Self {
        ExecutionError {
            location: Location::default(),
            path: Vec::new(),
            error,
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    pub fn error(&self) -> &FieldError {
        &self.error
    }

    /// Renders the `{message, locations, path}` shape of a GraphQL response
    /// error entry (§6.1).
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        obj.insert("message".into(), serde_json::Value::String(self.error.message().into()));
        obj.insert(
            "locations".into(),
            serde_json::json!([{"line": self.location.start.line, "column": self.location.start.column}]),
        );
        if !self.path.is_empty() {
            obj.insert(
                "path".into(),
                serde_json::Value::Array(
                    self.path
                        .iter()
                        .map(|s| match s {
                            PathSegment::Field(n) => serde_json::Value::String(n.clone()),
                            PathSegment::Index(i) => serde_json::Value::from(*i),
                        })
                        .collect(),
                ),
            );
        }
        if let Some(extensions) = self.error.extensions() {
            obj.insert("extensions".into(), extensions.clone().into_json());
        }
        serde_json::Value::Object(obj)
    }
}

/// A validation rule violation (§5, §7 scenario 3).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuleError {
    message: String,
    locations: Vec<Location>,
}

impl RuleError {
    pub fn new(message: impl Into<String>, locations: Vec<Location>) -> Self {
        RuleError {
            message: message.into(),
            locations,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "message": self.message,
            "locations": self.locations.iter().map(|l| serde_json::json!({"line": l.start.line, "column": l.start.column})).collect::<Vec<_>>(),
        })
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RuleError {}

/// An error that prevents a request from being executed at all: it never
/// fails syntax, validation, or coercion for only part of the document
/// the way a [`FieldError`] fails only part of the response (§7).
#[derive(Clone, Debug, Display, Error, From, PartialEq)]
pub enum GraphQLError {
    #[display("syntax error: {_0}")]
    Syntax(#[error(not(source))] crate::ast::SyntaxError),
    #[display("{}", _0.iter().map(RuleError::message).collect::<Vec<_>>().join("\n"))]
    Validation(#[error(not(source))] Vec<RuleError>),
    #[display("{_0}")]
    Schema(#[error(not(source))] crate::schema::SchemaError),
    #[display("variable coercion failed: {_0}")]
    VariableCoercion(#[error(not(source))] String),
    #[display("no operation found in document")]
    NoOperationProvided,
    #[display("multiple operations found and no operation name was given")]
    MultipleOperationsProvided,
    #[display("unknown operation name `{_0}`")]
    UnknownOperationName(#[error(not(source))] String),
    #[display("subscription operations must have exactly one root field")]
    SubscriptionMultipleRootFields,
    #[display("the schema has no {_0} root type")]
    OperationKindMismatch(#[error(not(source))] String),
}
