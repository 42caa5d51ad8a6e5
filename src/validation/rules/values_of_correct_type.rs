//! Runs the literal coercer against every argument value and variable
//! default value, surfacing its errors at validation time instead of
//! waiting for execution-time coercion to reject them (§4.2 rule 9, §4.1
//! `coerceLiteral`).
//!
//! Variable references inside a value are left to `coerceLiteral` itself,
//! which treats an unresolved variable as "undefined" rather than an error —
//! their declared-type compatibility is rule 11's job, not this one's.

use indexmap::IndexMap;

use crate::ast::{Argument, VariableDefinition};
use crate::value::coerce::coerce_literal;

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct ValuesOfCorrectType;

pub fn factory() -> ValuesOfCorrectType {
    ValuesOfCorrectType
}

impl Rule for ValuesOfCorrectType {
    fn enter_argument(&mut self, ctx: &mut ValidationContext, argument: &Argument) {
        let Some(ty) = ctx.current_input_type().cloned() else { return };
        if let Err(errors) = coerce_literal(&argument.value.item, &ty, &IndexMap::new()) {
            for e in errors {
                ctx.report(e.message, vec![argument.value.location]);
            }
        }
    }

    fn enter_variable_definition(&mut self, ctx: &mut ValidationContext, def: &VariableDefinition) {
        let Some(default) = &def.default_value else { return };
        let Some(ty) = ctx.resolve_type(&def.var_type.item) else { return };
        if let Err(errors) = coerce_literal(&default.item, &ty, &IndexMap::new()) {
            for e in errors {
                ctx.report(e.message, vec![default.location]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::factory;
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn well_typed_arguments_pass() {
        expect_passes_rule(
            factory(),
            r#"{ complicatedArgs { intArgField(intArg: 2) } }"#,
        );
    }

    #[test]
    fn good_default_value_passes() {
        expect_passes_rule(factory(), r#"query Foo($var: Int = 2) { dog { name } }"#);
    }

    #[test]
    fn bad_scalar_value_fails() {
        expect_fails_rule(
            factory(),
            r#"{ complicatedArgs { intArgField(intArg: "two") } }"#,
            &[r#"Expected type "Int". Int cannot represent non-integer value: String("two")"#],
        );
    }

    #[test]
    fn unknown_enum_value_fails() {
        expect_fails_rule(
            factory(),
            r#"{ dog { doesKnowCommand(dogCommand: JUMP) } }"#,
            &[r#"Value "JUMP" does not exist in "DogCommand" enum."#],
        );
    }

    #[test]
    fn bad_default_value_fails() {
        expect_fails_rule(
            factory(),
            r#"query Foo($var: Int = "two") { dog { name } }"#,
            &[r#"Expected type "Int". Int cannot represent non-integer value: String("two")"#],
        );
    }
}
