//! The type-info tracker every validation rule shares while walking a
//! document (§4.2).
//!
//! Mirrors the reference implementation's `ValidatorContext`: a stack of
//! "what composite/input type am I inside right now" pushed and popped as
//! the shared traversal descends into selection sets, arguments, and
//! literal values, generalized from its borrowed/lifetime-parameterized
//! `MetaType` references to owned `Arc<NamedType>` handles, since our
//! schema has no per-document lifetime to borrow against.
//!
//! Unlike a closure-scoped push/pop helper, the stacks here are exposed as
//! plain `push_*`/`pop_*` pairs so the shared traversal in
//! [`super::visitor`] can interleave them with calls into each registered
//! rule without fighting the borrow checker over a second mutable borrow.

use std::collections::HashMap;
use std::sync::Arc;

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::ast::{self, Definition, Document, Fragment, Operation, Spanning};
use crate::error::RuleError;
use crate::schema::{DirectiveType, Field, NamedType, Schema, TypeRef};

/// Per-document tracking state shared by every rule (§4.2).
pub struct ValidationContext<'a> {
    pub schema: &'a Schema,
    pub document: &'a Document,
    errors: Vec<RuleError>,
    fragments: HashMap<ArcStr, &'a Spanning<Fragment>>,
    output_type_stack: Vec<Option<TypeRef>>,
    parent_output_type_stack: Vec<Option<TypeRef>>,
    input_type_stack: Vec<Option<TypeRef>>,
    field_stack: Vec<Option<Arc<Field>>>,
    argument_stack: Vec<Option<crate::schema::Argument>>,
    directive_stack: Vec<Option<&'a DirectiveType>>,
    operation_stack: Vec<Option<&'a Spanning<Operation>>>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(schema: &'a Schema, document: &'a Document) -> Self {
        let fragments = document
            .fragments()
            .map(|f| (f.item.name.item.clone(), f))
            .collect();
        ValidationContext {
            schema,
            document,
            errors: Vec::new(),
            fragments,
            output_type_stack: Vec::new(),
            parent_output_type_stack: Vec::new(),
            input_type_stack: Vec::new(),
            field_stack: Vec::new(),
            argument_stack: Vec::new(),
            directive_stack: Vec::new(),
            operation_stack: Vec::new(),
        }
    }

    pub fn report(&mut self, message: impl Into<String>, locations: Vec<ast::Location>) {
        self.errors.push(RuleError::new(message, locations));
    }

    pub fn into_errors(mut self) -> Vec<RuleError> {
        self.errors.sort_by(|a, b| a.message().cmp(b.message()));
        self.errors
    }

    pub fn fragment(&self, name: &str) -> Option<&'a Spanning<Fragment>> {
        self.fragments.get(name).copied()
    }

    pub fn fragment_names(&self) -> impl Iterator<Item = &ArcStr> {
        self.fragments.keys()
    }

    pub fn current_operation(&self) -> Option<&'a Spanning<Operation>> {
        self.operation_stack.last().copied().flatten()
    }

    pub fn current_output_type(&self) -> Option<&TypeRef> {
        self.output_type_stack.last().and_then(|t| t.as_ref())
    }

    pub fn parent_output_type(&self) -> Option<&TypeRef> {
        self.parent_output_type_stack.last().and_then(|t| t.as_ref())
    }

    pub fn current_input_type(&self) -> Option<&TypeRef> {
        self.input_type_stack.last().and_then(|t| t.as_ref())
    }

    pub fn current_field(&self) -> Option<&Field> {
        self.field_stack.last().and_then(|f| f.as_deref())
    }

    pub fn current_argument(&self) -> Option<&crate::schema::Argument> {
        self.argument_stack.last().and_then(|a| a.as_ref())
    }

    pub fn current_directive(&self) -> Option<&'a DirectiveType> {
        self.directive_stack.last().copied().flatten()
    }

    /// The composite type a selection set's fields are being collected
    /// against: the root type for an operation, or a fragment's declared
    /// type condition looked up in the schema.
    pub fn type_for_operation(&self, op: &Operation) -> Option<Arc<NamedType>> {
        let name = match op.operation_type {
            ast::OperationType::Query => Some(self.schema.query_type_name().to_string()),
            ast::OperationType::Mutation => self.schema.mutation_type_name().map(str::to_string),
            ast::OperationType::Subscription => {
                self.schema.subscription_type_name().map(str::to_string)
            }
        }?;
        self.schema.get_type(&name)
    }

    pub fn push_operation(&mut self, op: &'a Spanning<Operation>) {
        let ty = self.type_for_operation(&op.item).map(TypeRef::named_from_arc);
        self.operation_stack.push(Some(op));
        self.output_type_stack.push(ty);
    }

    pub fn pop_operation(&mut self) {
        self.output_type_stack.pop();
        self.operation_stack.pop();
    }

    pub fn push_fragment_definition(&mut self, frag: &Fragment) {
        let ty = self.schema.get_type(&frag.type_condition.item).map(TypeRef::named_from_arc);
        self.output_type_stack.push(ty);
    }

    pub fn pop_fragment_definition(&mut self) {
        self.output_type_stack.pop();
    }

    pub fn push_inline_fragment(&mut self, type_condition: Option<&str>) {
        let ty = match type_condition {
            Some(name) => self.schema.get_type(name).map(TypeRef::named_from_arc),
            None => self.current_output_type().cloned(),
        };
        self.output_type_stack.push(ty);
    }

    pub fn pop_inline_fragment(&mut self) {
        self.output_type_stack.pop();
    }

    /// Pushes the field definition for `field_name` on the current output
    /// type (if any), and descends into it as the new current output type,
    /// with the previous current type becoming the parent.
    pub fn push_field(&mut self, field_name: &str) {
        let parent_ty = self.current_output_type().cloned();
        let field_def = parent_ty
            .as_ref()
            .and_then(|t| t.innermost().field_named(field_name))
            .map(|field| Arc::new(field.clone()));
        let next_ty = field_def.as_ref().map(|f| f.field_type.clone());
        self.parent_output_type_stack.push(parent_ty);
        self.field_stack.push(field_def);
        self.output_type_stack.push(next_ty);
    }

    pub fn pop_field(&mut self) {
        self.output_type_stack.pop();
        self.field_stack.pop();
        self.parent_output_type_stack.pop();
    }

    pub fn push_argument(&mut self, argument_name: &str) {
        let arg_def = self
            .current_field()
            .and_then(|field| field.argument(argument_name))
            .cloned()
            .or_else(|| {
                self.current_directive().and_then(|d| d.argument(argument_name)).cloned()
            });
        let ty = arg_def.as_ref().map(|a| a.arg_type.clone());
        self.argument_stack.push(arg_def);
        self.input_type_stack.push(ty);
    }

    pub fn pop_argument(&mut self) {
        self.input_type_stack.pop();
        self.argument_stack.pop();
    }

    pub fn push_directive(&mut self, name: &str) {
        self.directive_stack.push(self.schema.directive(name));
    }

    pub fn pop_directive(&mut self) {
        self.directive_stack.pop();
    }

    pub fn push_list_element(&mut self) {
        let inner = self.current_input_type().and_then(|t| match t.nullable() {
            TypeRef::List(inner) => Some((**inner).clone()),
            other => Some(other.clone()),
        });
        self.input_type_stack.push(inner);
    }

    pub fn pop_list_element(&mut self) {
        self.input_type_stack.pop();
    }

    pub fn push_object_field(&mut self, field_name: &str) {
        let ty = self.current_input_type().and_then(|t| match t.nullable() {
            TypeRef::Named(_) => match t.nullable().innermost() {
                NamedType::InputObject(io) => io.field_named(field_name).map(|f| f.arg_type.clone()),
                _ => None,
            },
            _ => None,
        });
        self.input_type_stack.push(ty);
    }

    pub fn pop_object_field(&mut self) {
        self.input_type_stack.pop();
    }

    /// Declared-variable types for the current operation, by name — used
    /// by "variables are input types" / "variable usage allowed".
    pub fn variable_definitions(&self) -> IndexMap<ArcStr, &'a crate::ast::VariableDefinition> {
        let mut out = IndexMap::new();
        if let Some(op) = self.current_operation() {
            for def in &op.item.variable_definitions {
                out.insert(def.name.item.clone(), def);
            }
        }
        out
    }

    /// Resolves a syntactic `ast::Type` against the schema, the same way the
    /// executor resolves a variable definition's declared type. Shared by
    /// the rules that need a variable's or argument default's real type
    /// rather than just its name (rules 10/11).
    pub fn resolve_type(&self, ty: &ast::Type) -> Option<TypeRef> {
        match ty {
            ast::Type::Named(name) => self.schema.get_type(name).map(TypeRef::named_from_arc),
            ast::Type::List(inner) => self.resolve_type(inner).map(TypeRef::list),
            ast::Type::NonNull(inner) => self.resolve_type(inner).map(TypeRef::non_null),
        }
    }
}
