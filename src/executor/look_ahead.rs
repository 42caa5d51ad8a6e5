//! `lookAhead()`/`getFieldSelection(depth)` on [`ResolveInfo`](super::ResolveInfo)
//! (§4.4 supplement): a resolver-facing view of the merged, fragment-expanded
//! selection below the current field, with arguments already resolved
//! against variables.
//!
//! Grounded on the reference library's `LookAheadSelection`, generalized
//! from its macro-registered static field set to this crate's dynamic
//! schema: instead of walking `GraphQLType::meta()` output, this walks the
//! same `collect_fields` helper the executor itself uses for resolution.

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::ast::Selection;
use crate::value::Value;

use super::Execution;

/// One resolved argument as seen by a look-ahead.
#[derive(Clone, Debug)]
pub struct LookAheadValue {
    pub name: ArcStr,
    pub value: Value,
}

/// A field below the current one, with its own children available to a
/// bounded depth.
#[derive(Clone, Debug)]
pub struct LookAheadSelection {
    pub name: ArcStr,
    pub arguments: Vec<LookAheadValue>,
    children: Vec<LookAheadSelection>,
}

impl LookAheadSelection {
    /// Wraps an already-built set of children as the look-ahead view of the
    /// current field itself (§4.4 supplement: `ResolveInfo::look_ahead`).
    pub(super) fn root(name: ArcStr, arguments: Vec<LookAheadValue>, children: Vec<LookAheadSelection>) -> Self {
        LookAheadSelection { name, arguments, children }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.iter().find(|a| a.name == name).map(|a| &a.value)
    }

    pub fn children(&self) -> &[LookAheadSelection] {
        &self.children
    }
}

/// Builds the look-ahead tree for `selection_set` (already the current
/// field's own sub-selection), bounded to `depth` levels (`0` = this level
/// only, no children materialized).
pub(super) fn build(
    exec: &Execution,
    parent_type_name: &str,
    selection_set: &[Selection],
    variables: &IndexMap<ArcStr, Value>,
    depth: usize,
) -> Vec<LookAheadSelection> {
    let grouped = super::collect_fields(exec, parent_type_name, selection_set, variables);
    grouped
        .into_iter()
        .map(|(response_key, fields)| {
            let first = &fields[0].item;
            let arguments = first
                .arguments
                .iter()
                .filter_map(|arg| {
                    let coerced = exec
                        .schema
                        .get_type(parent_type_name)
                        .as_deref()
                        .and_then(|t| t.field_named(&first.name.item))
                        .and_then(|field_def| field_def.argument(&arg.name.item))
                        .and_then(|arg_def| {
                            crate::value::coerce::coerce_literal(&arg.value.item, &arg_def.arg_type, variables)
                                .ok()
                                .flatten()
                        });
                    coerced.map(|value| LookAheadValue { name: arg.name.item.clone(), value })
                })
                .collect();
            let children = if depth == 0 {
                Vec::new()
            } else {
                let child_type = exec
                    .schema
                    .get_type(parent_type_name)
                    .as_deref()
                    .and_then(|t| t.field_named(&first.name.item))
                    .map(|f| f.field_type.innermost_name());
                match child_type {
                    Some(name) => {
                        let merged: Vec<Selection> =
                            fields.iter().flat_map(|f| f.item.selection_set.clone()).collect();
                        build(exec, &name, &merged, variables, depth - 1)
                    }
                    None => Vec::new(),
                }
            };
            LookAheadSelection { name: response_key, arguments, children }
        })
        .collect()
}
