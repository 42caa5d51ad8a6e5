//! Flags a variable declared with an output type (object, interface, union)
//! instead of an input type (§4.2 rule 11).

use crate::ast::VariableDefinition;

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct VariablesAreInputTypes;

pub fn factory() -> VariablesAreInputTypes {
    VariablesAreInputTypes
}

impl Rule for VariablesAreInputTypes {
    fn enter_variable_definition(&mut self, ctx: &mut ValidationContext, def: &VariableDefinition) {
        let Some(ty) = ctx.resolve_type(&def.var_type.item) else { return };
        if !ty.innermost().is_input_type() {
            ctx.report(error_message(&def.name.item, &def.var_type.item.to_string()), vec![def.var_type.location]);
        }
    }
}

fn error_message(var_name: &str, ty: &str) -> String {
    format!(r#"Variable "${var_name}" cannot be non-input type "{ty}"."#)
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn input_type_variable_passes() {
        expect_passes_rule(factory(), r#"query Foo($var: ComplexInput) { dog { name } }"#);
    }

    #[test]
    fn list_of_input_type_passes() {
        expect_passes_rule(factory(), r#"query Foo($var: [String]) { dog { name } }"#);
    }

    #[test]
    fn output_type_variable_fails() {
        expect_fails_rule(
            factory(),
            r#"query Foo($var: Dog) { dog { name } }"#,
            &[&error_message("var", "Dog")],
        );
    }

    #[test]
    fn list_of_output_type_fails() {
        expect_fails_rule(
            factory(),
            r#"query Foo($var: [Dog]!) { dog { name } }"#,
            &[&error_message("var", "[Dog]!")],
        );
    }
}
