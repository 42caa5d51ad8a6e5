//! An optional rule, not part of the default set, that rejects a document
//! whose estimated cost exceeds a host-chosen ceiling (§4.2 rule 14).
//!
//! Cost is `1 + sum(children)` per field unless the field overrides it
//! through [`crate::schema::Field::complexity`], using literal argument
//! values coerced with no variables bound — a variable-dependent argument
//! is treated as absent for this estimate, since validation runs before any
//! variable value is known.

use indexmap::IndexMap;

use crate::ast::{self, Field, Selection};
use crate::value::Value;

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct QueryComplexity {
    max: i64,
}

impl QueryComplexity {
    /// `max == -1` disables the rule entirely. Any other negative value is
    /// rejected at construction, since it could never be satisfied.
    pub fn new(max: i64) -> Result<Self, String> {
        if max < -1 {
            return Err("argument must be greater or equal to 0.".to_string());
        }
        Ok(QueryComplexity { max })
    }
}

pub fn factory(max: i64) -> QueryComplexity {
    QueryComplexity::new(max).expect("valid max complexity")
}

impl Rule for QueryComplexity {
    fn enter_operation(&mut self, ctx: &mut ValidationContext, op: &crate::ast::Spanning<ast::Operation>) {
        if self.max == -1 {
            return;
        }
        let Some(root_type) = ctx.type_for_operation(&op.item) else { return };
        let complexity = selection_set_complexity(ctx, &root_type.name().to_string(), &op.item.selection_set);
        if complexity > self.max {
            ctx.report(error_message(self.max, complexity), vec![op.location]);
        }
    }
}

fn selection_set_complexity(ctx: &ValidationContext, type_name: &str, selections: &[Selection]) -> i64 {
    let mut total = 0;
    for selection in selections {
        match selection {
            Selection::Field(field) => total += field_complexity(ctx, type_name, &field.item),
            Selection::InlineFragment(frag) => {
                let ty = frag
                    .item
                    .type_condition
                    .as_ref()
                    .map(|t| t.item.to_string())
                    .unwrap_or_else(|| type_name.to_string());
                total += selection_set_complexity(ctx, &ty, &frag.item.selection_set);
            }
            Selection::FragmentSpread(spread) => {
                if let Some(def) = ctx.fragment(&spread.item.name.item) {
                    total += selection_set_complexity(ctx, &def.item.type_condition.item, &def.item.selection_set);
                }
            }
        }
    }
    total
}

fn field_complexity(ctx: &ValidationContext, parent_type_name: &str, field: &Field) -> i64 {
    let Some(parent) = ctx.schema.get_type(parent_type_name) else { return 0 };
    let Some(field_def) = parent.field_named(&field.name.item) else { return 0 };
    let child_complexity =
        selection_set_complexity(ctx, &field_def.field_type.innermost_name(), &field.selection_set);
    match &field_def.complexity {
        Some(f) => f(child_complexity, &coerced_args(field_def, field)),
        None => 1 + child_complexity,
    }
}

/// Coerces each declared argument's literal, skipping variable references
/// (unresolvable at validation time) and malformed literals (reported
/// separately by [`super::values_of_correct_type`]) rather than failing the
/// whole estimate.
fn coerced_args(field_def: &crate::schema::Field, field: &Field) -> IndexMap<arcstr::ArcStr, Value> {
    let mut out = IndexMap::new();
    for arg_def in &field_def.arguments {
        let Some(literal) = field.arguments.iter().find(|a| a.name.item == arg_def.name) else { continue };
        if let Ok(Some(v)) =
            crate::value::coerce::coerce_literal(&literal.value.item, &arg_def.arg_type, &IndexMap::new())
        {
            out.insert(arg_def.name.clone(), v);
        }
    }
    out
}

fn error_message(max: i64, actual: i64) -> String {
    format!("Max query complexity should be {max} but got {actual}.")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory, QueryComplexity};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn disabled_rule_never_fails() {
        expect_passes_rule(factory(-1), r#"{ dog { name nickname barkVolume } }"#);
    }

    #[test]
    fn under_budget_passes() {
        expect_passes_rule(factory(10), r#"{ dog { name } }"#);
    }

    #[test]
    fn over_budget_fails() {
        expect_fails_rule(
            factory(2),
            r#"{ dog { name nickname barkVolume } }"#,
            &[&error_message(2, 4)],
        );
    }

    #[test]
    fn rejects_invalid_max_at_construction() {
        assert!(QueryComplexity::new(-2).is_err());
    }
}
