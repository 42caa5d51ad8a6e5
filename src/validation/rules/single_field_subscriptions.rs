//! Flags a subscription operation selecting more than one top-level field,
//! including any expanded through a fragment (§4.2 rule 6, §4.4).

use crate::ast::{OperationType, Selection, Spanning};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct SingleFieldSubscriptions;

pub fn factory() -> SingleFieldSubscriptions {
    SingleFieldSubscriptions
}

impl Rule for SingleFieldSubscriptions {
    fn enter_operation(&mut self, ctx: &mut ValidationContext, op: &Spanning<crate::ast::Operation>) {
        if op.item.operation_type != OperationType::Subscription {
            return;
        }
        let root_field_count = count_root_fields(ctx, &op.item.selection_set);
        if root_field_count > 1 {
            let name = op.item.name.as_ref().map(|n| n.item.to_string());
            ctx.report(error_message(name.as_deref()), vec![op.location]);
        }
    }
}

/// Counts top-level field selections, expanding fragment spreads and inline
/// fragments (but not their nested selection sets) since `__typename` and a
/// data field both count as root fields.
fn count_root_fields(ctx: &ValidationContext, selections: &[Selection]) -> usize {
    let mut count = 0;
    for selection in selections {
        match selection {
            Selection::Field(_) => count += 1,
            Selection::InlineFragment(frag) => count += count_root_fields(ctx, &frag.item.selection_set),
            Selection::FragmentSpread(spread) => {
                if let Some(frag) = ctx.fragment(&spread.item.name.item) {
                    count += count_root_fields(ctx, &frag.item.selection_set);
                }
            }
        }
    }
    count
}

fn error_message(name: Option<&str>) -> String {
    match name {
        Some(name) => format!(r#"Subscription "{name}" must select only one top level field."#),
        None => "Anonymous Subscription must select only one top level field.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn single_root_field_passes() {
        expect_passes_rule(factory(), r#"subscription Sub { dog { name } }"#);
    }

    #[test]
    fn multiple_root_fields_fail() {
        expect_fails_rule(
            factory(),
            r#"subscription Sub { dog { name } cat { meows } }"#,
            &[&error_message(Some("Sub"))],
        );
    }

    #[test]
    fn anonymous_multiple_root_fields_fail() {
        expect_fails_rule(
            factory(),
            r#"subscription { dog { name } cat { meows } }"#,
            &[&error_message(None)],
        );
    }
}
