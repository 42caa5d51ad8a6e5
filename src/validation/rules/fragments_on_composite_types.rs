//! Flags fragments conditioning on a scalar, enum, or input-object type
//! (§4.2 rule 3).

use crate::ast::{Fragment, InlineFragment, Spanning};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct FragmentsOnCompositeTypes;

pub fn factory() -> FragmentsOnCompositeTypes {
    FragmentsOnCompositeTypes
}

impl Rule for FragmentsOnCompositeTypes {
    fn enter_fragment_definition(&mut self, ctx: &mut ValidationContext, frag: &Spanning<Fragment>) {
        let invalid = ctx.current_output_type().map(|t| t.innermost().is_composite() == false);
        if invalid == Some(true) {
            let type_name = ctx.current_output_type().unwrap().innermost_name();
            ctx.report(
                error_message(Some(&frag.item.name.item), &type_name),
                vec![frag.item.type_condition.location],
            );
        }
    }

    fn enter_inline_fragment(&mut self, ctx: &mut ValidationContext, frag: &Spanning<InlineFragment>) {
        let Some(type_cond) = &frag.item.type_condition else { return };
        let invalid = ctx.current_output_type().map(|t| !t.innermost().is_composite());
        if invalid == Some(true) {
            let type_name = ctx.current_output_type().unwrap().innermost_name();
            ctx.report(error_message(None, &type_name), vec![type_cond.location]);
        }
    }
}

fn error_message(fragment_name: Option<&str>, on_type: &str) -> String {
    match fragment_name {
        Some(name) => format!(r#"Fragment "{name}" cannot condition on non composite type "{on_type}""#),
        None => format!(r#"Fragment cannot condition on non composite type "{on_type}""#),
    }
}

#[cfg(test)]
mod tests {
    use super::factory;
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn fragment_on_object_passes() {
        expect_passes_rule(factory(), r#"fragment F on Dog { name } { dog { ...F } }"#);
    }

    #[test]
    fn fragment_on_scalar_fails() {
        expect_fails_rule(
            factory(),
            r#"fragment F on Boolean { name } { dog { ...F } }"#,
            &[&error_message(Some("F"), "Boolean")],
        );
    }
}
