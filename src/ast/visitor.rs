//! Generic AST traversal (§3.1).
//!
//! This is the node-kind-agnostic counterpart to [`validation`](crate::validation)'s
//! rule traversal: it knows nothing about a schema and is useful for plain
//! tree walks (the schema-language printer does not need this, but document
//! transforms and analyses that only need structural traversal do).

use super::{Definition, Document, Field, FragmentSpread, InlineFragment, Selection, Value};

/// What a [`Visitor`] callback wants the walker to do next.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum VisitAction {
    /// Continue the traversal normally.
    #[default]
    Continue,
    /// Don't descend into this node's children.
    SkipChildren,
    /// Abort the traversal entirely.
    Stop,
    /// Replace the current value node before continuing (only honored for
    /// [`Value`] nodes reached through `enter_value`).
    Replace(Value),
}

/// Callbacks invoked per AST node kind during a [`walk`].
///
/// All methods have a default no-op/continue implementation, so a visitor
/// only overrides the kinds it cares about.
#[allow(unused_variables)]
pub trait Visitor {
    fn enter_document(&mut self, doc: &Document) -> VisitAction {
        VisitAction::Continue
    }
    fn leave_document(&mut self, doc: &Document) {}

    fn enter_field(&mut self, field: &Field) -> VisitAction {
        VisitAction::Continue
    }
    fn leave_field(&mut self, field: &Field) {}

    fn enter_fragment_spread(&mut self, spread: &FragmentSpread) -> VisitAction {
        VisitAction::Continue
    }
    fn leave_fragment_spread(&mut self, spread: &FragmentSpread) {}

    fn enter_inline_fragment(&mut self, frag: &InlineFragment) -> VisitAction {
        VisitAction::Continue
    }
    fn leave_inline_fragment(&mut self, frag: &InlineFragment) {}

    fn enter_value(&mut self, value: &Value) -> VisitAction {
        VisitAction::Continue
    }
    fn leave_value(&mut self, value: &Value) {}
}

/// Walks `doc` with `visitor`, honoring [`VisitAction::SkipChildren`] and
/// [`VisitAction::Stop`]. Returns `true` if the walk ran to completion,
/// `false` if a visitor requested `Stop`.
pub fn walk(doc: &Document, visitor: &mut dyn Visitor) -> bool {
    if visitor.enter_document(doc) == VisitAction::Stop {
        return false;
    }
    for def in &doc.definitions {
        let selection_set = match def {
            Definition::Operation(op) => Some(&op.item.selection_set),
            Definition::Fragment(frag) => Some(&frag.item.selection_set),
            Definition::NonExecutable(_) => None,
        };
        if let Some(selections) = selection_set {
            if !walk_selections(selections, visitor) {
                return false;
            }
        }
    }
    visitor.leave_document(doc);
    true
}

fn walk_selections(selections: &[Selection], visitor: &mut dyn Visitor) -> bool {
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                match visitor.enter_field(&field.item) {
                    VisitAction::Stop => return false,
                    VisitAction::SkipChildren => continue,
                    _ => {}
                }
                for arg in &field.item.arguments {
                    if !walk_value(&arg.value.item, visitor) {
                        return false;
                    }
                }
                if !walk_selections(&field.item.selection_set, visitor) {
                    return false;
                }
                visitor.leave_field(&field.item);
            }
            Selection::FragmentSpread(spread) => {
                match visitor.enter_fragment_spread(&spread.item) {
                    VisitAction::Stop => return false,
                    VisitAction::SkipChildren => continue,
                    _ => {}
                }
                visitor.leave_fragment_spread(&spread.item);
            }
            Selection::InlineFragment(frag) => {
                match visitor.enter_inline_fragment(&frag.item) {
                    VisitAction::Stop => return false,
                    VisitAction::SkipChildren => continue,
                    _ => {}
                }
                if !walk_selections(&frag.item.selection_set, visitor) {
                    return false;
                }
                visitor.leave_inline_fragment(&frag.item);
            }
        }
    }
    true
}

fn walk_value(value: &Value, visitor: &mut dyn Visitor) -> bool {
    match visitor.enter_value(value) {
        VisitAction::Stop => return false,
        VisitAction::SkipChildren => return true,
        _ => {}
    }
    match value {
        Value::List(items) => {
            for item in items {
                if !walk_value(&item.item, visitor) {
                    return false;
                }
            }
        }
        Value::Object(fields) => {
            for v in fields.values() {
                if !walk_value(&v.item, visitor) {
                    return false;
                }
            }
        }
        _ => {}
    }
    visitor.leave_value(value);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse;

    #[derive(Default)]
    struct FieldCounter(usize);
    impl Visitor for FieldCounter {
        fn enter_field(&mut self, _: &Field) -> VisitAction {
            self.0 += 1;
            VisitAction::Continue
        }
    }

    #[test]
    fn counts_fields() {
        let doc = parse("{ a b { c } }").unwrap();
        let mut counter = FieldCounter::default();
        walk(&doc, &mut counter);
        assert_eq!(counter.0, 3);
    }

    #[test]
    fn stop_halts_walk() {
        let doc = parse("{ a b c }").unwrap();
        struct StopAfterFirst(usize);
        impl Visitor for StopAfterFirst {
            fn enter_field(&mut self, _: &Field) -> VisitAction {
                self.0 += 1;
                if self.0 == 1 { VisitAction::Stop } else { VisitAction::Continue }
            }
        }
        let mut v = StopAfterFirst(0);
        let completed = walk(&doc, &mut v);
        assert!(!completed);
        assert_eq!(v.0, 1);
    }
}
