//! Flags two fields under the same response key that a single response
//! couldn't satisfy at once — different field names, different arguments,
//! or conflicting return types (§4.2 rule 13).
//!
//! Runs once per operation over its fully expanded selection tree (fragment
//! spreads and inline fragments flattened in), rather than hooking every
//! node through the shared traversal, since the conflict check needs the
//! whole selection set grouped by response key before it can compare
//! anything.

use std::collections::{BTreeMap, HashSet};

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::ast::{self, Field, Selection, Spanning};
use crate::schema::{NamedType, Schema, TypeRef};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct OverlappingFieldsCanBeMerged;

pub fn factory() -> OverlappingFieldsCanBeMerged {
    OverlappingFieldsCanBeMerged
}

impl Rule for OverlappingFieldsCanBeMerged {
    fn enter_operation(&mut self, ctx: &mut ValidationContext, op: &Spanning<ast::Operation>) {
        let Some(ty) = ctx.type_for_operation(&op.item) else { return };
        let conflicts = find_conflicts(ctx, ty.name(), &op.item.selection_set);
        for (message, locations) in conflicts {
            ctx.report(message, locations);
        }
    }
}

struct CollectedField<'a> {
    field: &'a Spanning<Field>,
    parent_type: ArcStr,
}

fn collect<'a>(
    ctx: &'a ValidationContext,
    parent_type_name: &str,
    selections: &'a [Selection],
    visited_fragments: &mut HashSet<ArcStr>,
    out: &mut Vec<(ArcStr, CollectedField<'a>)>,
) {
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                out.push((
                    field.item.response_key().clone(),
                    CollectedField { field, parent_type: parent_type_name.into() },
                ));
            }
            Selection::InlineFragment(frag) => {
                let type_name = frag
                    .item
                    .type_condition
                    .as_ref()
                    .map(|t| t.item.to_string())
                    .unwrap_or_else(|| parent_type_name.to_string());
                collect(ctx, &type_name, &frag.item.selection_set, visited_fragments, out);
            }
            Selection::FragmentSpread(spread) => {
                if !visited_fragments.insert(spread.item.name.item.clone()) {
                    continue;
                }
                if let Some(def) = ctx.fragment(&spread.item.name.item) {
                    collect(ctx, &def.item.type_condition.item, &def.item.selection_set, visited_fragments, out);
                }
            }
        }
    }
}

fn find_conflicts(
    ctx: &ValidationContext,
    parent_type_name: &str,
    selections: &[Selection],
) -> Vec<(String, Vec<ast::Location>)> {
    let mut fields = Vec::new();
    collect(ctx, parent_type_name, selections, &mut HashSet::new(), &mut fields);

    let mut by_key: IndexMap<ArcStr, Vec<&CollectedField>> = IndexMap::new();
    for (key, field) in &fields {
        by_key.entry(key.clone()).or_default().push(field);
    }

    let mut errors = Vec::new();
    for (key, entries) in &by_key {
        for i in 0..entries.len() {
            for j in (i + 1)..entries.len() {
                if let Some(err) = check_conflict(ctx.schema, key, entries[i], entries[j]) {
                    errors.push(err);
                }
            }
        }
    }
    errors
}

fn check_conflict(
    schema: &Schema,
    key: &str,
    a: &CollectedField,
    b: &CollectedField,
) -> Option<(String, Vec<ast::Location>)> {
    if fields_conflict_ignorable(schema, &a.parent_type, &b.parent_type) {
        return None;
    }

    let name_a = &a.field.item.name.item;
    let name_b = &b.field.item.name.item;
    let locations = vec![a.field.location, b.field.location];

    if name_a != name_b {
        return Some((
            format!(
                r#"Fields "{key}" conflict because "{name_a}" and "{name_b}" are different fields. Use different aliases on the fields to fetch both if this was intentional."#
            ),
            locations,
        ));
    }

    if args_map(&a.field.item) != args_map(&b.field.item) {
        return Some((
            format!(
                r#"Fields "{key}" conflict because they have differing arguments. Use different aliases on the fields to fetch both if this was intentional."#
            ),
            locations,
        ));
    }

    let field_def_a = schema.get_type(&a.parent_type).and_then(|t| t.field_named(name_a).cloned());
    let field_def_b = schema.get_type(&b.parent_type).and_then(|t| t.field_named(name_b).cloned());
    let (Some(def_a), Some(def_b)) = (field_def_a, field_def_b) else {
        return None;
    };

    if !same_type_shape(&def_a.field_type, &def_b.field_type) {
        return Some((
            format!(
                r#"Fields "{key}" conflict because they return conflicting types "{:?}" and "{:?}". Use different aliases on the fields to fetch both if this was intentional."#,
                def_a.field_type, def_b.field_type
            ),
            locations,
        ));
    }

    None
}

fn fields_conflict_ignorable(schema: &Schema, parent_a: &str, parent_b: &str) -> bool {
    if parent_a == parent_b {
        return false;
    }
    let is_object = |name: &str| matches!(schema.get_type(name).as_deref(), Some(NamedType::Object(_)));
    is_object(parent_a) && is_object(parent_b)
}

fn args_map(field: &Field) -> BTreeMap<&str, &ast::Value> {
    field.arguments.iter().map(|a| (a.name.item.as_str(), &a.value.item)).collect()
}

fn same_type_shape(a: &TypeRef, b: &TypeRef) -> bool {
    format!("{a:?}") == format!("{b:?}")
}

#[cfg(test)]
mod tests {
    use super::factory;
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn identical_fields_merge() {
        expect_passes_rule(factory(), r#"{ dog { name } dog { name } }"#);
    }

    #[test]
    fn aliased_fields_with_different_names_pass() {
        expect_passes_rule(factory(), r#"{ dog { nickname: name } dog { barks: barkVolume } }"#);
    }

    #[test]
    fn same_alias_different_fields_fails() {
        expect_fails_rule(
            factory(),
            r#"{ dog { x: name } dog { x: barkVolume } }"#,
            &[r#"Fields "x" conflict because "name" and "barkVolume" are different fields. Use different aliases on the fields to fetch both if this was intentional."#],
        );
    }

    #[test]
    fn same_field_different_args_fails() {
        expect_fails_rule(
            factory(),
            r#"{ complicatedArgs { intArgField(intArg: 1) } complicatedArgs { intArgField(intArg: 2) } }"#,
            &[r#"Fields "intArgField" conflict because they have differing arguments. Use different aliases on the fields to fetch both if this was intentional."#],
        );
    }

    #[test]
    fn sibling_object_types_do_not_conflict() {
        expect_passes_rule(
            factory(),
            r#"
            { catOrDog { ... on Cat { someValue: meowVolume } ... on Dog { someValue: barkVolume } } }
            "#,
        );
    }
}
