//! Flags a non-null argument (with no default) missing from a field or
//! directive application (§4.2 rule 10).

use crate::ast::{Directive, Field, Spanning};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct ProvidedRequiredArguments;

pub fn factory() -> ProvidedRequiredArguments {
    ProvidedRequiredArguments
}

impl Rule for ProvidedRequiredArguments {
    fn leave_field(&mut self, ctx: &mut ValidationContext, field: &Spanning<Field>) {
        let Some(field_def) = ctx.current_field() else { return };
        for arg_def in &field_def.arguments {
            if !arg_def.arg_type.is_non_null() || arg_def.default_value.is_some() {
                continue;
            }
            if field.item.arguments.iter().any(|a| a.name.item == arg_def.name) {
                continue;
            }
            ctx.report(
                field_error_message(&field.item.name.item, &arg_def.name, &format!("{:?}", arg_def.arg_type)),
                vec![field.location],
            );
        }
    }

    fn leave_directive(&mut self, ctx: &mut ValidationContext, directive: &Directive) {
        let Some(directive_type) = ctx.schema.directive(&directive.name.item) else { return };
        for arg_def in &directive_type.arguments {
            if !arg_def.arg_type.is_non_null() || arg_def.default_value.is_some() {
                continue;
            }
            if directive.arguments.iter().any(|a| a.name.item == arg_def.name) {
                continue;
            }
            ctx.report(
                directive_error_message(&directive.name.item, &arg_def.name, &format!("{:?}", arg_def.arg_type)),
                vec![directive.location],
            );
        }
    }
}

fn field_error_message(field_name: &str, arg_name: &str, arg_type: &str) -> String {
    format!(
        r#"Field "{field_name}" argument "{arg_name}" of type "{arg_type}" is required, but it was not provided."#
    )
}

fn directive_error_message(directive_name: &str, arg_name: &str, arg_type: &str) -> String {
    format!(
        r#"Directive "@{directive_name}" argument "{arg_name}" of type "{arg_type}" is required, but it was not provided."#
    )
}

#[cfg(test)]
mod tests {
    use super::{factory, field_error_message};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn all_required_arguments_provided() {
        expect_passes_rule(
            factory(),
            r#"{ complicatedArgs { nonNullIntArgField(nonNullIntArg: 1) } }"#,
        );
    }

    #[test]
    fn missing_required_argument_fails() {
        expect_fails_rule(
            factory(),
            r#"{ complicatedArgs { nonNullIntArgField } }"#,
            &[&field_error_message("nonNullIntArgField", "nonNullIntArg", "Int!")],
        );
    }

    #[test]
    fn required_argument_with_default_not_required() {
        expect_passes_rule(
            factory(),
            r#"{ complicatedArgs { nonNullFieldWithDefault } }"#,
        );
    }
}
