//! An optional rule, not part of the default set, that rejects a document
//! whose selection sets nest deeper than a host-chosen ceiling (§4.2 rule
//! 14). Introspection fields (`__schema`, `__type`, `__typename`) don't
//! count toward depth, since their own nesting is a fixed property of the
//! schema shape rather than the query author's choice.

use crate::ast::{self, Selection};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct QueryDepth {
    max: i64,
}

impl QueryDepth {
    /// `max == -1` disables the rule entirely. Any other negative value is
    /// rejected at construction, since it could never be satisfied.
    pub fn new(max: i64) -> Result<Self, String> {
        if max < -1 {
            return Err("argument must be greater or equal to 0.".to_string());
        }
        Ok(QueryDepth { max })
    }
}

pub fn factory(max: i64) -> QueryDepth {
    QueryDepth::new(max).expect("valid max depth")
}

impl Rule for QueryDepth {
    fn enter_operation(&mut self, ctx: &mut ValidationContext, op: &crate::ast::Spanning<ast::Operation>) {
        if self.max == -1 {
            return;
        }
        let depth = selection_set_depth(ctx, &op.item.selection_set, 0);
        if depth > self.max {
            ctx.report(error_message(self.max, depth), vec![op.location]);
        }
    }
}

fn selection_set_depth(ctx: &ValidationContext, selections: &[Selection], depth: i64) -> i64 {
    let mut max_depth = depth;
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                if field.item.name.item.starts_with("__") {
                    continue;
                }
                let d = if field.item.selection_set.is_empty() {
                    depth + 1
                } else {
                    selection_set_depth(ctx, &field.item.selection_set, depth + 1)
                };
                max_depth = max_depth.max(d);
            }
            Selection::InlineFragment(frag) => {
                max_depth = max_depth.max(selection_set_depth(ctx, &frag.item.selection_set, depth));
            }
            Selection::FragmentSpread(spread) => {
                if let Some(def) = ctx.fragment(&spread.item.name.item) {
                    max_depth = max_depth.max(selection_set_depth(ctx, &def.item.selection_set, depth));
                }
            }
        }
    }
    max_depth
}

fn error_message(max: i64, actual: i64) -> String {
    format!("Query depth limit of {max} exceeded, found {actual}.")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory, QueryDepth};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn disabled_rule_never_fails() {
        expect_passes_rule(factory(-1), r#"{ dog { name } }"#);
    }

    #[test]
    fn under_budget_passes() {
        expect_passes_rule(factory(3), r#"{ human { pets { name } } }"#);
    }

    #[test]
    fn over_budget_fails() {
        expect_fails_rule(
            factory(1),
            r#"{ human { pets { name } } }"#,
            &[&error_message(1, 2)],
        );
    }

    #[test]
    fn rejects_invalid_max_at_construction() {
        assert!(QueryDepth::new(-2).is_err());
    }
}
