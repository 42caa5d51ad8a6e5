//! Flags a leaf-typed field (scalar/enum) with a sub-selection, or a
//! composite-typed field without one (§4.2 rule 7).

use crate::ast::{Field, Spanning};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct ScalarLeafs;

pub fn factory() -> ScalarLeafs {
    ScalarLeafs
}

impl Rule for ScalarLeafs {
    fn enter_field(&mut self, ctx: &mut ValidationContext, field: &Spanning<Field>) {
        let Some(field_type) = ctx.current_output_type() else { return };
        let ty = field_type.innermost();
        let has_selections = !field.item.selection_set.is_empty();
        if ty.is_leaf() && has_selections {
            ctx.report(
                no_subselection_allowed_message(&field.item.name.item, &format!("{field_type:?}")),
                vec![field.location],
            );
        } else if !ty.is_leaf() && !has_selections {
            ctx.report(
                required_subselection_message(&field.item.name.item, &format!("{field_type:?}")),
                vec![field.location],
            );
        }
    }
}

fn no_subselection_allowed_message(field_name: &str, ty: &str) -> String {
    format!(r#"Field "{field_name}" must not have a selection since type "{ty}" has no subfields."#)
}

fn required_subselection_message(field_name: &str, ty: &str) -> String {
    format!(r#"Field "{field_name}" of type "{ty}" must have a selection of subfields. Did you mean "{field_name} {{ ... }}"?"#)
}

#[cfg(test)]
mod tests {
    use super::{factory, no_subselection_allowed_message, required_subselection_message};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn scalar_leaf_selections_pass() {
        expect_passes_rule(factory(), r#"{ dog { barkVolume } }"#);
    }

    #[test]
    fn composite_leaf_with_selection_passes() {
        expect_passes_rule(factory(), r#"{ dog { name } }"#);
    }

    #[test]
    fn scalar_with_subselection_fails() {
        expect_fails_rule(
            factory(),
            r#"{ dog { barkVolume { sinceWhen } } }"#,
            &[&no_subselection_allowed_message("barkVolume", "Int")],
        );
    }

    #[test]
    fn composite_without_subselection_fails() {
        expect_fails_rule(
            factory(),
            r#"{ dog }"#,
            &[&required_subselection_message("dog", "Dog")],
        );
    }
}
