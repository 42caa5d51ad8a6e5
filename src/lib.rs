//! A server-side GraphQL engine: schema construction, document validation,
//! and query execution (§1, §2).
//!
//! The crate does not parse the GraphQL schema language (IDL) or provide a
//! transport binding; a host builds a [`Schema`](schema::Schema) with
//! [`SchemaBuilder`](schema::SchemaBuilder), hands this crate a query
//! document (or source string, parsed via [`ast::parse`]), and calls
//! [`execute_request`] to get back a `{data, errors}` result.
//!
//! ```text
//!            source text ──ast::parse──> Document
//!                                            │
//!                          validation::validate (rules)
//!                                            │
//!                                   executor::execute
//! ```

pub mod ast;
pub mod error;
pub mod executor;
pub mod schema;
pub mod scheduler;
mod util;
pub mod validation;
pub mod value;

pub use ast::{parse, Document, SyntaxError};
pub use error::{ExecutionError, FieldError, GraphQLError, PathSegment, RuleError};
pub use executor::{execute, introspect, Arguments, Context, ExecutionParams, ExecutionResult, Path, ResolveInfo};
pub use schema::{Schema, SchemaBuilder, SchemaError};
pub use scheduler::{Deferred, Outcome, TaskQueue};
pub use validation::{default_rules, validate, Rule, ValidationContext};
pub use value::{Object, Opaque, Value};

use arcstr::ArcStr;
use indexmap::IndexMap;

use schema::FieldResolverFn;

/// Either pre-parsed document or raw source text (§2 "if source is text,
/// the external parser produces a document AST").
pub enum Source<'a> {
    Text(&'a str),
    Document(&'a Document),
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(s: &'a str) -> Self {
        Source::Text(s)
    }
}

impl<'a> From<&'a Document> for Source<'a> {
    fn from(d: &'a Document) -> Self {
        Source::Document(d)
    }
}

/// The full set of recognized host options (§6.1).
///
/// Only `schema` and `source` are required; everything else defaults to the
/// same behavior a host gets by omitting the option entirely (no root
/// value, no context, no variables, validate with [`default_rules`], fall
/// back to the engine's default field resolver).
pub struct RequestParams<'a> {
    pub schema: &'a Schema,
    pub source: Source<'a>,
    pub root_value: Value,
    pub context_value: Value,
    pub variable_values: IndexMap<ArcStr, Value>,
    pub operation_name: Option<&'a str>,
    pub field_resolver: Option<FieldResolverFn>,
    /// `None` runs [`default_rules`]; `Some(vec![])` disables validation
    /// entirely, per §6.1 ("empty list disables validation").
    pub validation_rules: Option<Vec<Box<dyn Rule>>>,
}

impl<'a> RequestParams<'a> {
    /// Builds the minimal set of required options, with every optional
    /// field defaulted the way §6.1 specifies.
    pub fn new(schema: &'a Schema, source: impl Into<Source<'a>>) -> Self {
        RequestParams {
            schema,
            source: source.into(),
            root_value: Value::Null,
            context_value: Value::Null,
            variable_values: IndexMap::new(),
            operation_name: None,
            field_resolver: None,
            validation_rules: None,
        }
    }

    pub fn root_value(mut self, v: Value) -> Self {
        self.root_value = v;
        self
    }

    pub fn context_value(mut self, v: Value) -> Self {
        self.context_value = v;
        self
    }

    pub fn variable_values(mut self, v: IndexMap<ArcStr, Value>) -> Self {
        self.variable_values = v;
        self
    }

    pub fn operation_name(mut self, name: &'a str) -> Self {
        self.operation_name = Some(name);
        self
    }

    pub fn field_resolver(mut self, resolver: FieldResolverFn) -> Self {
        self.field_resolver = Some(resolver);
        self
    }

    pub fn validation_rules(mut self, rules: Vec<Box<dyn Rule>>) -> Self {
        self.validation_rules = Some(rules);
        self
    }
}

/// Runs the full pipeline (§2 control flow): parse if needed, validate,
/// then execute — returning validation errors instead of executing when
/// any rule fails.
///
/// This is the single entry point a host needs for the common case; the
/// individual stages ([`ast::parse`], [`validate`], [`execute`]) remain
/// public for hosts that already have a parsed document or want to run
/// validation and execution as separate steps (e.g. to cache a validated
/// document across requests with different variables).
pub fn execute_request(params: RequestParams<'_>) -> Result<ExecutionResult, GraphQLError> {
    let owned_document;
    let document = match params.source {
        Source::Document(d) => d,
        Source::Text(text) => {
            owned_document = ast::parse(text)?;
            &owned_document
        }
    };

    let rules = params.validation_rules.unwrap_or_else(default_rules);
    if !rules.is_empty() {
        let errors = validate(params.schema, document, rules);
        if !errors.is_empty() {
            return Err(GraphQLError::Validation(errors));
        }
    }

    execute(ExecutionParams {
        schema: params.schema,
        document,
        root_value: params.root_value,
        context_value: params.context_value,
        variable_values: params.variable_values,
        operation_name: params.operation_name,
        field_resolver: params.field_resolver,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use indexmap::IndexMap;

    use crate::schema::types::{Field, NamedType, ObjectType, TypeRef};
    use crate::schema::{scalars, SchemaBuilder};
    use crate::value::Value;

    use super::*;

    fn hello_schema() -> Schema {
        let query = NamedType::Object(ObjectType {
            name: "Query".into(),
            description: None,
            interfaces: vec![],
            fields: vec![Field {
                name: "hello".into(),
                description: None,
                arguments: vec![],
                field_type: TypeRef::named(scalars::string()),
                deprecation_status: schema::DeprecationStatus::Current,
                resolver: Some(Arc::new(|_src, _args, _ctx, _info| Ok(Value::String("world".into())))),
                complexity: None,
            }],
            is_type_of: None,
        });
        SchemaBuilder::new(query).finish().expect("valid schema")
    }

    #[test]
    fn end_to_end_hello_world() {
        let schema = hello_schema();
        let result = execute_request(RequestParams::new(&schema, "{ hello }")).expect("executes");
        assert!(result.errors.is_empty());
        let json = result.to_json(true);
        assert_eq!(json, serde_json::json!({"data": {"hello": "world"}}));
    }

    #[test]
    fn validation_errors_short_circuit_execution() {
        let schema = hello_schema();
        let result = execute_request(RequestParams::new(&schema, "{ nope }"));
        assert!(matches!(result, Err(GraphQLError::Validation(_))));
    }

    #[test]
    fn empty_rule_list_disables_validation() {
        let schema = hello_schema();
        let params = RequestParams::new(&schema, "{ hello }").validation_rules(Vec::new());
        let result = execute_request(params).expect("executes without validating");
        assert!(result.errors.is_empty());
    }

    #[test]
    fn variable_values_flow_through() {
        let schema = hello_schema();
        let mut vars = IndexMap::new();
        vars.insert("unused".into(), Value::Int(1));
        let params = RequestParams::new(&schema, "{ hello }").variable_values(vars);
        let result = execute_request(params).expect("executes");
        assert!(result.errors.is_empty());
    }
}
