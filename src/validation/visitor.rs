//! The shared traversal every validation rule rides on (§4.2: "all rules
//! share one traversal").
//!
//! Unlike [`ast::visitor`](crate::ast::visitor), this walk also drives the
//! [`ValidationContext`] type-info stack (current/parent output type,
//! current field/argument/directive) as it descends, and dispatches to
//! every registered [`Rule`] at each node rather than a single visitor —
//! the generalization of the reference implementation's chained visitors
//! to a plain `Vec<Box<dyn Rule>>`.

use crate::ast::{
    Argument, Definition, Directive, Document, Field, Fragment, FragmentSpread, InlineFragment,
    Operation, Selection, Spanning, Value, VariableDefinition,
};

use super::context::ValidationContext;

/// Callbacks a validation rule implements. All methods default to a no-op,
/// so a rule only overrides the node kinds it cares about (§4.2).
#[allow(unused_variables)]
pub trait Rule {
    fn enter_document(&mut self, ctx: &mut ValidationContext, doc: &Document) {}
    fn leave_document(&mut self, ctx: &mut ValidationContext, doc: &Document) {}

    fn enter_operation(&mut self, ctx: &mut ValidationContext, op: &Spanning<Operation>) {}
    fn leave_operation(&mut self, ctx: &mut ValidationContext, op: &Spanning<Operation>) {}

    fn enter_fragment_definition(&mut self, ctx: &mut ValidationContext, frag: &Spanning<Fragment>) {}
    fn leave_fragment_definition(&mut self, ctx: &mut ValidationContext, frag: &Spanning<Fragment>) {}

    fn enter_variable_definition(&mut self, ctx: &mut ValidationContext, def: &VariableDefinition) {}
    fn leave_variable_definition(&mut self, ctx: &mut ValidationContext, def: &VariableDefinition) {}

    fn enter_field(&mut self, ctx: &mut ValidationContext, field: &Spanning<Field>) {}
    fn leave_field(&mut self, ctx: &mut ValidationContext, field: &Spanning<Field>) {}

    fn enter_fragment_spread(&mut self, ctx: &mut ValidationContext, spread: &Spanning<FragmentSpread>) {}
    fn leave_fragment_spread(&mut self, ctx: &mut ValidationContext, spread: &Spanning<FragmentSpread>) {}

    fn enter_inline_fragment(&mut self, ctx: &mut ValidationContext, frag: &Spanning<InlineFragment>) {}
    fn leave_inline_fragment(&mut self, ctx: &mut ValidationContext, frag: &Spanning<InlineFragment>) {}

    fn enter_directive(&mut self, ctx: &mut ValidationContext, directive: &Directive) {}
    fn leave_directive(&mut self, ctx: &mut ValidationContext, directive: &Directive) {}

    fn enter_argument(&mut self, ctx: &mut ValidationContext, argument: &Argument) {}
    fn leave_argument(&mut self, ctx: &mut ValidationContext, argument: &Argument) {}

    fn enter_value(&mut self, ctx: &mut ValidationContext, value: &Spanning<Value>) {}
    fn leave_value(&mut self, ctx: &mut ValidationContext, value: &Spanning<Value>) {}
}

/// Runs every rule in `rules` over `ctx.document` in a single pass.
pub fn visit<'a>(ctx: &mut ValidationContext<'a>, rules: &mut [Box<dyn Rule>]) {
    let doc = ctx.document;
    for rule in rules.iter_mut() {
        rule.enter_document(ctx, doc);
    }
    for def in &doc.definitions {
        match def {
            Definition::Operation(op) => visit_operation(ctx, rules, op),
            Definition::Fragment(frag) => visit_fragment_definition(ctx, rules, frag),
            Definition::NonExecutable(_) => {}
        }
    }
    for rule in rules.iter_mut() {
        rule.leave_document(ctx, doc);
    }
}

fn visit_operation<'a>(
    ctx: &mut ValidationContext<'a>,
    rules: &mut [Box<dyn Rule>],
    op: &'a Spanning<Operation>,
) {
    ctx.push_operation(op);
    for rule in rules.iter_mut() {
        rule.enter_operation(ctx, op);
    }
    for def in &op.item.variable_definitions {
        visit_variable_definition(ctx, rules, def);
    }
    for directive in &op.item.directives {
        visit_directive(ctx, rules, directive);
    }
    visit_selection_set(ctx, rules, &op.item.selection_set);
    for rule in rules.iter_mut() {
        rule.leave_operation(ctx, op);
    }
    ctx.pop_operation();
}

fn visit_fragment_definition(
    ctx: &mut ValidationContext,
    rules: &mut [Box<dyn Rule>],
    frag: &Spanning<Fragment>,
) {
    ctx.push_fragment_definition(&frag.item);
    for rule in rules.iter_mut() {
        rule.enter_fragment_definition(ctx, frag);
    }
    for directive in &frag.item.directives {
        visit_directive(ctx, rules, directive);
    }
    visit_selection_set(ctx, rules, &frag.item.selection_set);
    for rule in rules.iter_mut() {
        rule.leave_fragment_definition(ctx, frag);
    }
    ctx.pop_fragment_definition();
}

fn visit_variable_definition(
    ctx: &mut ValidationContext,
    rules: &mut [Box<dyn Rule>],
    def: &VariableDefinition,
) {
    for rule in rules.iter_mut() {
        rule.enter_variable_definition(ctx, def);
    }
    if let Some(default) = &def.default_value {
        visit_value(ctx, rules, default);
    }
    for rule in rules.iter_mut() {
        rule.leave_variable_definition(ctx, def);
    }
}

fn visit_selection_set(ctx: &mut ValidationContext, rules: &mut [Box<dyn Rule>], selections: &[Selection]) {
    for selection in selections {
        match selection {
            Selection::Field(field) => visit_field(ctx, rules, field),
            Selection::FragmentSpread(spread) => visit_fragment_spread(ctx, rules, spread),
            Selection::InlineFragment(frag) => visit_inline_fragment(ctx, rules, frag),
        }
    }
}

fn visit_field(ctx: &mut ValidationContext, rules: &mut [Box<dyn Rule>], field: &Spanning<Field>) {
    ctx.push_field(&field.item.name.item);
    for rule in rules.iter_mut() {
        rule.enter_field(ctx, field);
    }
    for arg in &field.item.arguments {
        visit_argument(ctx, rules, arg);
    }
    for directive in &field.item.directives {
        visit_directive(ctx, rules, directive);
    }
    visit_selection_set(ctx, rules, &field.item.selection_set);
    for rule in rules.iter_mut() {
        rule.leave_field(ctx, field);
    }
    ctx.pop_field();
}

fn visit_fragment_spread(
    ctx: &mut ValidationContext,
    rules: &mut [Box<dyn Rule>],
    spread: &Spanning<FragmentSpread>,
) {
    for rule in rules.iter_mut() {
        rule.enter_fragment_spread(ctx, spread);
    }
    for directive in &spread.item.directives {
        visit_directive(ctx, rules, directive);
    }
    for rule in rules.iter_mut() {
        rule.leave_fragment_spread(ctx, spread);
    }
}

fn visit_inline_fragment(
    ctx: &mut ValidationContext,
    rules: &mut [Box<dyn Rule>],
    frag: &Spanning<InlineFragment>,
) {
    let type_condition = frag.item.type_condition.as_ref().map(|t| t.item.as_str());
    ctx.push_inline_fragment(type_condition);
    for rule in rules.iter_mut() {
        rule.enter_inline_fragment(ctx, frag);
    }
    for directive in &frag.item.directives {
        visit_directive(ctx, rules, directive);
    }
    visit_selection_set(ctx, rules, &frag.item.selection_set);
    for rule in rules.iter_mut() {
        rule.leave_inline_fragment(ctx, frag);
    }
    ctx.pop_inline_fragment();
}

fn visit_directive(ctx: &mut ValidationContext, rules: &mut [Box<dyn Rule>], directive: &Directive) {
    ctx.push_directive(&directive.name.item);
    for rule in rules.iter_mut() {
        rule.enter_directive(ctx, directive);
    }
    for arg in &directive.arguments {
        visit_argument(ctx, rules, arg);
    }
    for rule in rules.iter_mut() {
        rule.leave_directive(ctx, directive);
    }
    ctx.pop_directive();
}

fn visit_argument(ctx: &mut ValidationContext, rules: &mut [Box<dyn Rule>], argument: &Argument) {
    ctx.push_argument(&argument.name.item);
    for rule in rules.iter_mut() {
        rule.enter_argument(ctx, argument);
    }
    visit_value(ctx, rules, &argument.value);
    for rule in rules.iter_mut() {
        rule.leave_argument(ctx, argument);
    }
    ctx.pop_argument();
}

fn visit_value(ctx: &mut ValidationContext, rules: &mut [Box<dyn Rule>], value: &Spanning<Value>) {
    for rule in rules.iter_mut() {
        rule.enter_value(ctx, value);
    }
    match &value.item {
        Value::List(items) => {
            for item in items {
                ctx.push_list_element();
                visit_value(ctx, rules, item);
                ctx.pop_list_element();
            }
        }
        Value::Object(fields) => {
            for (name, v) in fields {
                ctx.push_object_field(name);
                visit_value(ctx, rules, v);
                ctx.pop_object_field();
            }
        }
        _ => {}
    }
    for rule in rules.iter_mut() {
        rule.leave_value(ctx, value);
    }
}

