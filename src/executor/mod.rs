//! The executor: selection-set collection, field resolution, value
//! completion, and error propagation (§4.4).
//!
//! Generalized from the reference implementation's lifetime-parameterized
//! `Executor<'r, 'a, CtxT, S>` (which walks a macro-registered `GraphQLType`
//! tree) to this crate's dynamic [`Schema`]: the traversal itself — collect
//! fields, resolve, complete against the declared type, bubble a failed
//! non-null field to its nearest nullable ancestor — is the same algorithm,
//! just driven off [`NamedType`]/[`TypeRef`] values instead of trait dispatch.

pub mod look_ahead;

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::ast::{self, Document, Fragment, Operation, OperationType, Selection, Spanning};
use crate::error::{ExecutionError, FieldError, GraphQLError, PathSegment};
use crate::schema::types::ObjectType;
use crate::schema::{introspection, Field as SchemaField, FieldResolverFn, NamedType, Schema, TypeRef};
use crate::scheduler::TaskQueue;
use crate::value::coerce::{coerce_input_value, coerce_literal};
use crate::value::{Object, Value};

pub use look_ahead::{LookAheadSelection, LookAheadValue};

/// A cons-list response path (§6.2: "path is a cons-list of (prev, key)").
///
/// Cloning shares the spine rather than copying it, so pushing a segment for
/// every nested field/list element stays cheap even on deep responses.
#[derive(Clone, Default)]
pub struct Path(Option<Rc<PathNode>>);

struct PathNode {
    prev: Path,
    key: PathSegment,
}

impl Path {
    pub fn root() -> Self {
        Path(None)
    }

    pub fn push(&self, key: PathSegment) -> Path {
        Path(Some(Rc::new(PathNode { prev: self.clone(), key })))
    }

    pub fn to_vec(&self) -> Vec<PathSegment> {
        let mut out = Vec::new();
        let mut cur = self.0.clone();
        while let Some(node) = cur {
            out.push(node.key.clone());
            cur = node.prev.0.clone();
        }
        out.reverse();
        out
    }
}

/// Already-coerced resolver arguments, keyed by argument name (§6.2).
#[derive(Clone, Debug, Default)]
pub struct Arguments(IndexMap<ArcStr, Value>);

impl Arguments {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArcStr, &Value)> {
        self.0.iter()
    }
}

/// The opaque, host-supplied `contextValue` forwarded to every resolver
/// unchanged for the lifetime of one request (§6.1).
#[derive(Clone)]
pub struct Context(Value);

impl Context {
    pub fn new(value: Value) -> Self {
        Context(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }
}

/// Everything a resolver needs to know about the field it is resolving
/// (§6.2), plus the `lookAhead`/`getFieldSelection` supplement (§4.4).
pub struct ResolveInfo<'r, 'a> {
    pub field_name: ArcStr,
    pub field_def: Arc<SchemaField>,
    pub return_type: TypeRef,
    pub parent_type: TypeRef,
    pub path: Path,
    pub schema: &'a Schema,
    pub root_value: &'r Value,
    pub operation: &'r Spanning<Operation>,
    pub variables: &'r IndexMap<ArcStr, Value>,
    pub(crate) exec: &'r Execution<'a>,
    pub(crate) merged_selection: Vec<Selection>,
}

impl<'r, 'a> ResolveInfo<'r, 'a> {
    /// The fragment-expanded, `@skip`/`@include`-evaluated selection below
    /// this field, `depth` levels deep (`0` = this field's direct children,
    /// no grandchildren materialized).
    pub fn get_field_selection(&self, depth: usize) -> Vec<LookAheadSelection> {
        look_ahead::build(
            self.exec,
            &self.return_type.innermost_name(),
            &self.merged_selection,
            self.variables,
            depth,
        )
    }

    /// The look-ahead view of the current field itself, with its full
    /// sub-selection tree already materialized.
    pub fn look_ahead(&self) -> LookAheadSelection {
        let children = self.get_field_selection(usize::MAX);
        LookAheadSelection::root(self.field_name.clone(), Vec::new(), children)
    }
}

/// Per-request execution state shared by every field resolution: the schema,
/// the document's fragments, the root/context values, the field resolver
/// fallback, the accumulated errors, and the deferred scheduler's queue
/// (§4.3, §4.4).
pub struct Execution<'a> {
    pub schema: &'a Schema,
    pub(crate) fragments: IndexMap<ArcStr, &'a Spanning<Fragment>>,
    root_value: Value,
    context: Context,
    field_resolver: Option<FieldResolverFn>,
    errors: RefCell<Vec<ExecutionError>>,
    queue: TaskQueue,
}

impl<'a> Execution<'a> {
    fn record_error(&self, err: ExecutionError) {
        self.errors.borrow_mut().push(err);
    }
}

/// The `{data, errors}` shape produced by one execution (§6.1). `data` is
/// `None` only when execution never began at all (an earlier syntax,
/// validation, or coercion failure) — once execution starts, `data` is
/// always present, even if it ends up `null`.
#[derive(Clone, Debug)]
pub struct ExecutionResult {
    pub data: Option<Value>,
    pub errors: Vec<ExecutionError>,
}

impl ExecutionResult {
    /// Renders the final `{data?, errors?}` response object (§6.1, §6.4).
    /// When `mask_internal_errors` is set, any error not marked client-safe
    /// is replaced with a generic `"Internal server error"` message.
    pub fn to_json(&self, mask_internal_errors: bool) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        if let Some(data) = &self.data {
            obj.insert("data".into(), data.clone().into_json());
        }
        if !self.errors.is_empty() {
            let rendered = self
                .errors
                .iter()
                .map(|e| render_execution_error(e, mask_internal_errors))
                .collect();
            obj.insert("errors".into(), serde_json::Value::Array(rendered));
        }
        serde_json::Value::Object(obj)
    }
}

fn render_execution_error(e: &ExecutionError, mask_internal_errors: bool) -> serde_json::Value {
    if mask_internal_errors && !e.error().is_client_safe() {
        let masked = ExecutionError::new(
            e.location(),
            e.path().to_vec(),
            FieldError::new("Internal server error", None),
        );
        masked.to_json()
    } else {
        e.to_json()
    }
}

/// The host-supplied inputs to one execution (§6.1).
pub struct ExecutionParams<'a> {
    pub schema: &'a Schema,
    pub document: &'a Document,
    pub root_value: Value,
    pub context_value: Value,
    pub variable_values: IndexMap<ArcStr, Value>,
    pub operation_name: Option<&'a str>,
    pub field_resolver: Option<FieldResolverFn>,
}

/// Executes `params.document` against `params.schema` (§4.4, §6.1): selects
/// the operation, coerces its variables, then executes its top-level fields
/// (sequentially for a mutation, per §4.4; otherwise in declaration order
/// through the [deferred scheduler](crate::scheduler)).
pub fn execute<'a>(params: ExecutionParams<'a>) -> Result<ExecutionResult, GraphQLError> {
    let operations: Vec<&Spanning<Operation>> = params.document.operations().collect();
    let operation = select_operation(&operations, params.operation_name)?;

    let fragments: IndexMap<ArcStr, &Spanning<Fragment>> = params
        .document
        .fragments()
        .map(|f| (f.item.name.item.clone(), f))
        .collect();

    let root_type_name: ArcStr = match operation.item.operation_type {
        OperationType::Query => params.schema.query_type_name().into(),
        OperationType::Mutation => params
            .schema
            .mutation_type_name()
            .map(ArcStr::from)
            .ok_or_else(|| GraphQLError::OperationKindMismatch("mutation".into()))?,
        OperationType::Subscription => {
            let name = params
                .schema
                .subscription_type_name()
                .map(ArcStr::from)
                .ok_or_else(|| GraphQLError::OperationKindMismatch("subscription".into()))?;
            if operation.item.selection_set.len() != 1 {
                return Err(GraphQLError::SubscriptionMultipleRootFields);
            }
            name
        }
    };

    let coerced_vars = coerce_variables(params.schema, operation, &params.variable_values)?;

    let exec = Execution {
        schema: params.schema,
        fragments,
        root_value: params.root_value,
        context: Context::new(params.context_value),
        field_resolver: params.field_resolver,
        errors: RefCell::new(Vec::new()),
        queue: TaskQueue::new(),
    };

    let span = tracing::debug_span!(
        "graphql.execute",
        operation = operation.item.name.as_ref().map(|n| n.item.to_string()),
        operation_kind = %operation.item.operation_type,
    );
    let _enter = span.enter();

    let grouped = collect_fields(&exec, &root_type_name, &operation.item.selection_set, &coerced_vars);

    let root_value = exec.root_value.clone();
    let data = match execute_selection_set(
        &exec,
        &root_type_name,
        &root_value,
        grouped,
        &Path::root(),
        &coerced_vars,
        operation,
    ) {
        Ok(v) => v,
        Err(e) => {
            exec.record_error(e);
            Value::Null
        }
    };

    Ok(ExecutionResult { data: Some(data), errors: exec.errors.into_inner() })
}

/// Coerces an operation's variable definitions against the host-supplied
/// raw `variable_values` (§4.4, §4.1 `coerceInputValue`).
fn coerce_variables(
    schema: &Schema,
    operation: &Spanning<Operation>,
    variable_values: &IndexMap<ArcStr, Value>,
) -> Result<IndexMap<ArcStr, Value>, GraphQLError> {
    let mut coerced = IndexMap::new();
    let mut errors = Vec::new();
    for def in &operation.item.variable_definitions {
        let Some(ty) = resolve_ast_type(schema, &def.var_type.item) else {
            errors.push(format!(
                "Variable \"${}\" references unknown type \"{}\".",
                def.name.item, def.var_type.item
            ));
            continue;
        };
        match variable_values.get(&def.name.item) {
            Some(raw) => match coerce_input_value(raw, &ty) {
                Ok(v) => {
                    coerced.insert(def.name.item.clone(), v);
                }
                Err(errs) => {
                    for e in errs {
                        errors.push(format!("Variable \"${}\": {}", def.name.item, e.message));
                    }
                }
            },
            None => match &def.default_value {
                Some(default) => match coerce_literal(&default.item, &ty, &IndexMap::new()) {
                    Ok(Some(v)) => {
                        coerced.insert(def.name.item.clone(), v);
                    }
                    Ok(None) => {}
                    Err(errs) => {
                        for e in errs {
                            errors.push(format!("Variable \"${}\": {}", def.name.item, e.message));
                        }
                    }
                },
                None if ty.is_non_null() => {
                    errors.push(format!(
                        "Variable \"${}\" of required type \"{:?}\" was not provided.",
                        def.name.item, ty
                    ));
                }
                None => {}
            },
        }
    }
    if errors.is_empty() {
        Ok(coerced)
    } else {
        Err(GraphQLError::VariableCoercion(errors.join("\n")))
    }
}

fn resolve_ast_type(schema: &Schema, ty: &ast::Type) -> Option<TypeRef> {
    match ty {
        ast::Type::Named(name) => schema.get_type(name).map(TypeRef::named_from_arc),
        ast::Type::List(inner) => resolve_ast_type(schema, inner).map(TypeRef::list),
        ast::Type::NonNull(inner) => resolve_ast_type(schema, inner).map(TypeRef::non_null),
    }
}

fn select_operation<'a>(
    operations: &[&'a Spanning<Operation>],
    name: Option<&str>,
) -> Result<&'a Spanning<Operation>, GraphQLError> {
    match name {
        Some(n) => operations
            .iter()
            .copied()
            .find(|op| op.item.name.as_ref().map(|s| s.item.as_str()) == Some(n))
            .ok_or_else(|| GraphQLError::UnknownOperationName(n.to_string())),
        None => match operations.len() {
            0 => Err(GraphQLError::NoOperationProvided),
            1 => Ok(operations[0]),
            _ => Err(GraphQLError::MultipleOperationsProvided),
        },
    }
}

/// `CollectFields`: groups a selection set by response key, expanding
/// fragment spreads and inline fragments and dropping anything `@skip`ped or
/// not `@include`d (§4.4).
pub(crate) fn collect_fields(
    exec: &Execution,
    parent_type_name: &str,
    selection_set: &[Selection],
    variables: &IndexMap<ArcStr, Value>,
) -> IndexMap<ArcStr, Vec<Spanning<ast::Field>>> {
    let mut grouped = IndexMap::new();
    let mut visited = HashSet::new();
    collect_fields_into(exec, parent_type_name, selection_set, variables, &mut grouped, &mut visited);
    grouped
}

fn collect_fields_into(
    exec: &Execution,
    parent_type_name: &str,
    selection_set: &[Selection],
    variables: &IndexMap<ArcStr, Value>,
    grouped: &mut IndexMap<ArcStr, Vec<Spanning<ast::Field>>>,
    visited_fragments: &mut HashSet<ArcStr>,
) {
    for selection in selection_set {
        match selection {
            Selection::Field(field) => {
                if should_skip(&field.item.directives, variables) {
                    continue;
                }
                grouped.entry(field.item.response_key().clone()).or_default().push(field.clone());
            }
            Selection::InlineFragment(frag) => {
                if should_skip(&frag.item.directives, variables) {
                    continue;
                }
                let applies = match &frag.item.type_condition {
                    Some(tc) => type_applies(exec, &tc.item, parent_type_name),
                    None => true,
                };
                if applies {
                    collect_fields_into(
                        exec,
                        parent_type_name,
                        &frag.item.selection_set,
                        variables,
                        grouped,
                        visited_fragments,
                    );
                }
            }
            Selection::FragmentSpread(spread) => {
                if should_skip(&spread.item.directives, variables) {
                    continue;
                }
                let name = &spread.item.name.item;
                if !visited_fragments.insert(name.clone()) {
                    continue;
                }
                if let Some(frag_def) = exec.fragments.get(name) {
                    if type_applies(exec, &frag_def.item.type_condition.item, parent_type_name) {
                        collect_fields_into(
                            exec,
                            parent_type_name,
                            &frag_def.item.selection_set,
                            variables,
                            grouped,
                            visited_fragments,
                        );
                    }
                }
            }
        }
    }
}

fn type_applies(exec: &Execution, condition: &str, parent_type_name: &str) -> bool {
    if condition == parent_type_name {
        return true;
    }
    match exec.schema.get_type(condition).as_deref() {
        Some(NamedType::Interface(_)) => exec.schema.get_type(parent_type_name).as_deref().is_some_and(|t| {
            matches!(t, NamedType::Object(o) if o.interfaces.iter().any(|i| i.as_str() == condition))
        }),
        Some(NamedType::Union(u)) => u.members.iter().any(|m| m.as_str() == parent_type_name),
        _ => false,
    }
}

fn directive_if_arg(directives: &[ast::Directive], name: &str, variables: &IndexMap<ArcStr, Value>) -> Option<bool> {
    let directive = directives.iter().find(|d| d.name.item.as_str() == name)?;
    let arg = directive.arguments.iter().find(|a| a.name.item.as_str() == "if")?;
    let boolean = TypeRef::named(crate::schema::scalars::boolean()).non_null();
    coerce_literal(&arg.value.item, &boolean, variables).ok().flatten()?.as_bool()
}

/// Whether a selection carrying `directives` should be dropped from its
/// selection set (§4.4: `@skip`/`@include`).
fn should_skip(directives: &[ast::Directive], variables: &IndexMap<ArcStr, Value>) -> bool {
    if directive_if_arg(directives, "skip", variables) == Some(true) {
        return true;
    }
    if directive_if_arg(directives, "include", variables) == Some(false) {
        return true;
    }
    false
}

/// Executes a selection set already grouped by response key, building the
/// resulting object in declaration order. Stops at the first field whose
/// error must keep propagating past this object rather than being absorbed
/// here (§4.4: "a non-null field's failure invalidates its nearest nullable
/// ancestor"), mirroring the reference executor's synchronous short-circuit
/// on a non-null violation.
fn execute_selection_set<'a>(
    exec: &Execution<'a>,
    parent_type_name: &str,
    parent_value: &Value,
    grouped: IndexMap<ArcStr, Vec<Spanning<ast::Field>>>,
    path: &Path,
    variables: &IndexMap<ArcStr, Value>,
    operation: &Spanning<Operation>,
) -> Result<Value, ExecutionError> {
    let mut out = Object::new();
    for (response_key, field_asts) in grouped {
        let field_path = path.push(PathSegment::Field(response_key.to_string()));
        let value = execute_field(exec, parent_type_name, parent_value, &field_asts, field_path, variables, operation)?;
        out.insert(response_key, value);
    }
    Ok(Value::Object(out))
}

fn default_field_resolver() -> FieldResolverFn {
    Arc::new(|source, _args, _ctx, info| match source {
        Value::Object(map) => Ok(map.get(info.field_name.as_str()).cloned().unwrap_or(Value::Null)),
        _ => Ok(Value::Null),
    })
}

fn coerce_arguments(
    field_def: &SchemaField,
    args_ast: &[ast::Argument],
    variables: &IndexMap<ArcStr, Value>,
) -> Result<Arguments, FieldError> {
    let mut out = IndexMap::new();
    for arg_def in &field_def.arguments {
        let provided = args_ast.iter().find(|a| a.name.item == arg_def.name);
        match provided {
            Some(a) => match coerce_literal(&a.value.item, &arg_def.arg_type, variables) {
                Ok(Some(v)) => {
                    out.insert(arg_def.name.clone(), v);
                }
                Ok(None) => {
                    if let Some(default) = &arg_def.default_value {
                        out.insert(arg_def.name.clone(), default.clone());
                    }
                }
                Err(errs) => {
                    let message = errs.into_iter().map(|e| e.message).collect::<Vec<_>>().join("; ");
                    return Err(FieldError::new(format!("Argument \"{}\": {message}", arg_def.name), None));
                }
            },
            None => match &arg_def.default_value {
                Some(default) => {
                    out.insert(arg_def.name.clone(), default.clone());
                }
                None if arg_def.arg_type.is_non_null() => {
                    return Err(FieldError::new(
                        format!(
                            "Argument \"{}\" of required type \"{:?}\" was not provided.",
                            arg_def.name, arg_def.arg_type
                        ),
                        None,
                    ));
                }
                None => {}
            },
        }
    }
    Ok(Arguments(out))
}

/// Resolves and completes one field, absorbing a propagating error into a
/// recorded `null` when this field's own type is nullable, or forwarding it
/// to the caller otherwise (§4.4).
fn execute_field<'a>(
    exec: &Execution<'a>,
    parent_type_name: &str,
    parent_value: &Value,
    field_asts: &[Spanning<ast::Field>],
    path: Path,
    variables: &IndexMap<ArcStr, Value>,
    operation: &Spanning<Operation>,
) -> Result<Value, ExecutionError> {
    let first = &field_asts[0].item;
    let field_name = &first.name.item;

    if field_name.as_str() == introspection::TYPENAME_FIELD {
        return Ok(Value::String(parent_type_name.into()));
    }

    let Some(parent_type) = exec.schema.get_type(parent_type_name) else {
        return Ok(Value::Null);
    };
    let Some(field_def) = parent_type.field_named(field_name).cloned() else {
        return Ok(Value::Null);
    };
    let field_def = Arc::new(field_def);
    let return_type = field_def.field_type.clone();

    let field_span = tracing::trace_span!("graphql.field", name = %field_name, parent_type = parent_type_name);
    let _enter = field_span.enter();

    let args = match coerce_arguments(&field_def, &first.arguments, variables) {
        Ok(a) => a,
        Err(e) => return absorb_or_propagate(exec, &return_type, ExecutionError::new(first.location, path.to_vec(), e)),
    };

    let merged_selection: Vec<Selection> =
        field_asts.iter().flat_map(|f| f.item.selection_set.clone()).collect();

    let resolve_info = ResolveInfo {
        field_name: field_name.clone(),
        field_def: field_def.clone(),
        return_type: return_type.clone(),
        parent_type: TypeRef::named_from_arc(parent_type.clone()),
        path: path.clone(),
        schema: exec.schema,
        root_value: &exec.root_value,
        operation,
        variables,
        exec,
        merged_selection,
    };

    let resolver = field_def
        .resolver
        .clone()
        .or_else(|| exec.field_resolver.clone())
        .unwrap_or_else(default_field_resolver);

    let resolved = resolver(parent_value, &args, &exec.context, &resolve_info);

    let result = match resolved {
        Ok(v) => complete_value(exec, &return_type, field_asts, &path, v, variables, parent_type_name, field_name, operation),
        Err(e) => Err(ExecutionError::new(first.location, path.to_vec(), e)),
    };

    match result {
        Ok(v) => Ok(v),
        Err(e) => absorb_or_propagate(exec, &return_type, e),
    }
}

fn absorb_or_propagate(
    exec: &Execution,
    return_type: &TypeRef,
    e: ExecutionError,
) -> Result<Value, ExecutionError> {
    if return_type.is_non_null() {
        Err(e)
    } else {
        exec.record_error(e);
        Ok(Value::Null)
    }
}

/// `CompleteValue` (§4.4): drives any [`Value::Deferred`] to settlement,
/// then completes the settled value against `return_type`'s non-null/list/
/// leaf/composite shape.
#[allow(clippy::too_many_arguments)]
fn complete_value<'a>(
    exec: &Execution<'a>,
    return_type: &TypeRef,
    field_asts: &[Spanning<ast::Field>],
    path: &Path,
    result: Value,
    variables: &IndexMap<ArcStr, Value>,
    parent_type_name: &str,
    field_name: &str,
    operation: &Spanning<Operation>,
) -> Result<Value, ExecutionError> {
    let result = match result {
        Value::Deferred(d) => match exec.queue.wait(&d) {
            Some(Ok(v)) => v,
            Some(Err(e)) => return Err(ExecutionError::new(field_asts[0].location, path.to_vec(), e)),
            None => {
                return Err(ExecutionError::new(
                    field_asts[0].location,
                    path.to_vec(),
                    FieldError::internal("deferred value never settled"),
                ))
            }
        },
        other => other,
    };

    match return_type {
        TypeRef::NonNull(inner) => {
            let completed = complete_value(
                exec, inner, field_asts, path, result, variables, parent_type_name, field_name, operation,
            )?;
            if completed.is_null() {
                return Err(ExecutionError::new(
                    field_asts[0].location,
                    path.to_vec(),
                    FieldError::new(
                        format!(
                            "Cannot return null for non-nullable field {parent_type_name}.{field_name}."
                        ),
                        None,
                    ),
                ));
            }
            Ok(completed)
        }
        _ if result.is_null() => Ok(Value::Null),
        TypeRef::List(inner) => complete_list_value(
            exec, inner, field_asts, path, result, variables, parent_type_name, field_name, operation,
        ),
        TypeRef::Named(lazy) => match lazy.resolve() {
            NamedType::Scalar(_) | NamedType::Enum(_) => complete_leaf_value(lazy.resolve(), result, field_asts, path),
            NamedType::Object(obj) => {
                complete_object_value(exec, obj, field_asts, path, result, variables, operation)
            }
            NamedType::Interface(_) | NamedType::Union(_) => {
                complete_abstract_value(exec, lazy.resolve(), field_asts, path, result, variables, operation)
            }
            NamedType::InputObject(_) => Err(ExecutionError::new(
                field_asts[0].location,
                path.to_vec(),
                FieldError::internal("input object used as an output type"),
            )),
        },
    }
}

#[allow(clippy::too_many_arguments)]
fn complete_list_value<'a>(
    exec: &'a Execution<'a>,
    element_type: &TypeRef,
    field_asts: &[Spanning<ast::Field>],
    path: &Path,
    result: Value,
    variables: &IndexMap<ArcStr, Value>,
    parent_type_name: &str,
    field_name: &str,
    operation: &'a Spanning<Operation>,
) -> Result<Value, ExecutionError> {
    let items = match result {
        Value::List(items) => items,
        other => {
            return Err(ExecutionError::new(
                field_asts[0].location,
                path.to_vec(),
                FieldError::internal(format!("Expected Iterable, but did not find one for field {parent_type_name}.{field_name}, found {other:?}.")),
            ))
        }
    };
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let item_path = path.push(PathSegment::Index(i));
        let completed = complete_value(
            exec, element_type, field_asts, &item_path, item, variables, parent_type_name, field_name, operation,
        );
        match completed {
            Ok(v) => out.push(v),
            Err(e) => {
                if element_type.is_non_null() {
                    return Err(e);
                }
                exec.record_error(e);
                out.push(Value::Null);
            }
        }
    }
    Ok(Value::List(out))
}

fn complete_leaf_value(
    ty: &NamedType,
    value: Value,
    field_asts: &[Spanning<ast::Field>],
    path: &Path,
) -> Result<Value, ExecutionError> {
    match ty {
        NamedType::Scalar(s) => (s.serialize)(&value).map_err(|e| {
            ExecutionError::new(field_asts[0].location, path.to_vec(), FieldError::internal(e))
        }),
        NamedType::Enum(_) => Ok(value),
        _ => unreachable!("complete_leaf_value only called for scalar/enum types"),
    }
}

fn complete_object_value<'a>(
    exec: &'a Execution<'a>,
    obj: &ObjectType,
    field_asts: &[Spanning<ast::Field>],
    path: &Path,
    value: Value,
    variables: &IndexMap<ArcStr, Value>,
    operation: &'a Spanning<Operation>,
) -> Result<Value, ExecutionError> {
    if let Some(is_type_of) = &obj.is_type_of {
        if !is_type_of(&value) {
            return Err(ExecutionError::new(
                field_asts[0].location,
                path.to_vec(),
                FieldError::internal(format!(
                    "Expected value of type \"{}\" but got an incompatible value.",
                    obj.name
                )),
            ));
        }
    }
    let merged: Vec<Selection> = field_asts.iter().flat_map(|f| f.item.selection_set.clone()).collect();
    let grouped = collect_fields(exec, &obj.name, &merged, variables);
    execute_selection_set(exec, &obj.name, &value, grouped, path, variables, operation)
}

fn complete_abstract_value<'a>(
    exec: &'a Execution<'a>,
    abstract_ty: &NamedType,
    field_asts: &[Spanning<ast::Field>],
    path: &Path,
    value: Value,
    variables: &IndexMap<ArcStr, Value>,
    operation: &'a Spanning<Operation>,
) -> Result<Value, ExecutionError> {
    let Some(type_name) = resolve_abstract_type(exec, abstract_ty, &value) else {
        return Err(ExecutionError::new(
            field_asts[0].location,
            path.to_vec(),
            FieldError::internal(format!(
                "Abstract type \"{}\" must resolve to an Object type at runtime.",
                abstract_ty.name()
            )),
        ));
    };
    if !exec.schema.is_possible_type(abstract_ty, &type_name) {
        return Err(ExecutionError::new(
            field_asts[0].location,
            path.to_vec(),
            FieldError::internal(format!(
                "Runtime Object type \"{type_name}\" is not a possible type for \"{}\".",
                abstract_ty.name()
            )),
        ));
    }
    match exec.schema.get_type(&type_name).as_deref() {
        Some(NamedType::Object(obj)) => {
            complete_object_value(exec, obj, field_asts, path, value, variables, operation)
        }
        _ => Err(ExecutionError::new(
            field_asts[0].location,
            path.to_vec(),
            FieldError::internal(format!("Runtime type \"{type_name}\" is not an object type.")),
        )),
    }
}

fn resolve_abstract_type(exec: &Execution, ty: &NamedType, value: &Value) -> Option<ArcStr> {
    match ty {
        NamedType::Interface(i) => {
            if let Some(resolve_type) = &i.resolve_type {
                if let Some(n) = resolve_type(value) {
                    return Some(n);
                }
            }
            exec.schema
                .possible_type_names(ty.name())
                .into_iter()
                .find(|name| is_type_of(exec.schema, name, value))
        }
        NamedType::Union(u) => {
            if let Some(resolve_type) = &u.resolve_type {
                if let Some(n) = resolve_type(value) {
                    return Some(n);
                }
            }
            u.members.iter().find(|name| is_type_of(exec.schema, name, value)).cloned()
        }
        _ => None,
    }
}

fn is_type_of(schema: &Schema, type_name: &str, value: &Value) -> bool {
    schema
        .get_type(type_name)
        .as_deref()
        .is_some_and(|t| matches!(t, NamedType::Object(o) if o.is_type_of.as_ref().is_some_and(|f| f(value))))
}

/// The canonical introspection query document, executed by [`introspect`]
/// (§4.5, §6.5).
const INTROSPECTION_QUERY: &str = r#"
query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types {
      ...FullType
    }
    directives {
      name
      description
      locations
      args { ...InputValue }
      isRepeatable
    }
  }
}
fragment FullType on __Type {
  kind
  name
  description
  specifiedByURL
  fields(includeDeprecated: true) {
    name
    description
    args { ...InputValue }
    type { ...TypeRef }
    isDeprecated
    deprecationReason
  }
  inputFields { ...InputValue }
  interfaces { ...TypeRef }
  possibleTypes { ...TypeRef }
  enumValues(includeDeprecated: true) {
    name
    description
    isDeprecated
    deprecationReason
  }
}
fragment InputValue on __InputValue {
  name
  description
  type { ...TypeRef }
  defaultValue
}
fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
      }
    }
  }
}
"#;

/// Runs the canonical introspection query against `schema`, reusing the same
/// executor introspection relies on at runtime (§4.5).
pub fn introspect(schema: &Schema) -> ExecutionResult {
    let document = ast::parse(INTROSPECTION_QUERY).expect("canonical introspection query must parse");
    execute(ExecutionParams {
        schema,
        document: &document,
        root_value: Value::Null,
        context_value: Value::Null,
        variable_values: IndexMap::new(),
        operation_name: None,
        field_resolver: None,
    })
    .expect("the canonical introspection document always selects a valid operation")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, Ordering};

    use crate::schema::types::{DeprecationStatus, Field, ObjectType};
    use crate::schema::{scalars, SchemaBuilder};
    use crate::scheduler::Deferred;

    use super::*;

    fn scalar_field(name: &str, field_type: TypeRef, resolver: FieldResolverFn) -> Field {
        Field {
            name: name.into(),
            description: None,
            arguments: vec![],
            field_type,
            deprecation_status: DeprecationStatus::Current,
            resolver: Some(resolver),
            complexity: None,
        }
    }

    fn run(schema: &Schema, source: &str) -> ExecutionResult {
        let document = ast::parse(source).expect("test document parses");
        execute(ExecutionParams {
            schema,
            document: &document,
            root_value: Value::Null,
            context_value: Value::Null,
            variable_values: IndexMap::new(),
            operation_name: None,
            field_resolver: None,
        })
        .expect("test document executes")
    }

    /// §8 scenario 2: a non-nullable field whose resolver returns null
    /// propagates as a client-safe field error, not a masked internal one.
    #[test]
    fn non_null_field_resolving_to_null_nulls_data_and_keeps_message_client_safe() {
        let query = NamedType::Object(ObjectType {
            name: "Query".into(),
            description: None,
            interfaces: vec![],
            fields: vec![scalar_field(
                "x",
                TypeRef::named(scalars::int()).non_null(),
                Arc::new(|_src, _args, _ctx, _info| Ok(Value::Null)),
            )],
            is_type_of: None,
        });
        let schema = SchemaBuilder::new(query).finish().expect("valid schema");

        let result = run(&schema, "{ x }");
        let json = result.to_json(true);

        assert_eq!(json["data"], serde_json::Value::Null);
        let errors = json["errors"].as_array().expect("errors array");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0]["message"],
            serde_json::Value::String("Cannot return null for non-nullable field Query.x.".into())
        );
        assert_eq!(errors[0]["path"], serde_json::json!(["x"]));
    }

    /// §8 scenario 3: a null element inside a `[Int!]` list nulls out just
    /// that field, with the error located at the element's index.
    #[test]
    fn null_list_element_nulls_the_list_field_not_the_whole_response() {
        let query = NamedType::Object(ObjectType {
            name: "Query".into(),
            description: None,
            interfaces: vec![],
            fields: vec![scalar_field(
                "items",
                TypeRef::named(scalars::int()).non_null().list(),
                Arc::new(|_src, _args, _ctx, _info| {
                    Ok(Value::List(vec![Value::Int(1), Value::Null, Value::Int(3)]))
                }),
            )],
            is_type_of: None,
        });
        let schema = SchemaBuilder::new(query).finish().expect("valid schema");

        let result = run(&schema, "{ items }");
        let json = result.to_json(true);

        assert_eq!(json["data"], serde_json::json!({"items": null}));
        let errors = json["errors"].as_array().expect("errors array");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0]["message"],
            serde_json::Value::String(
                "Cannot return null for non-nullable field Query.items.".into()
            )
        );
        assert_eq!(errors[0]["path"], serde_json::json!(["items", 1]));
    }

    /// §8 scenario 4 / §4.4 mutation serialization: field `b`'s resolver
    /// only ever observes the counter `a` set inside a deferred that
    /// settles on a later tick, because the executor waits for `a`'s
    /// deferred to fully settle before resolving `b`.
    #[test]
    fn mutation_top_level_fields_execute_sequentially() {
        let counter = Arc::new(AtomicI64::new(0));

        let counter_for_a = counter.clone();
        let a_resolver: FieldResolverFn = Arc::new(move |_src, _args, _ctx, info| {
            let queue = info.exec.queue.clone();
            let deferred = Deferred::pending(&queue);
            let settle = deferred.clone();
            let counter_for_a = counter_for_a.clone();
            queue.enqueue(move || {
                counter_for_a.store(1, Ordering::SeqCst);
                settle.resolve(Value::Null);
            });
            Ok(Value::Deferred(deferred))
        });

        let counter_for_b = counter.clone();
        let b_resolver: FieldResolverFn = Arc::new(move |_src, _args, _ctx, _info| {
            Ok(Value::Int(counter_for_b.load(Ordering::SeqCst)))
        });

        let mutation = NamedType::Object(ObjectType {
            name: "Mutation".into(),
            description: None,
            interfaces: vec![],
            fields: vec![
                scalar_field("a", TypeRef::named(scalars::int()), a_resolver),
                scalar_field("b", TypeRef::named(scalars::int()), b_resolver),
            ],
            is_type_of: None,
        });
        let query = NamedType::Object(ObjectType {
            name: "Query".into(),
            description: None,
            interfaces: vec![],
            fields: vec![scalar_field(
                "hello",
                TypeRef::named(scalars::string()),
                Arc::new(|_src, _args, _ctx, _info| Ok(Value::string("world"))),
            )],
            is_type_of: None,
        });
        let schema = SchemaBuilder::new(query)
            .mutation(mutation)
            .finish()
            .expect("valid schema");

        let result = run(&schema, "mutation { a b }");
        let json = result.to_json(true);

        assert!(json.get("errors").is_none(), "no errors expected: {json:?}");
        assert_eq!(json["data"], serde_json::json!({"a": null, "b": 1}));
    }
}
