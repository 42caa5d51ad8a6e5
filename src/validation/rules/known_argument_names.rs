//! Flags field arguments not declared on the field's definition (§4.2 rule
//! 2). Directive arguments are checked separately by
//! [`super::known_directive_argument_names`].

use crate::ast::{Argument, Field, Spanning};
use crate::util::{did_you_mean, suggestion_list};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct KnownArgumentNames {
    current_field: Option<(arcstr::ArcStr, arcstr::ArcStr)>,
}

pub fn factory() -> KnownArgumentNames {
    KnownArgumentNames { current_field: None }
}

impl Rule for KnownArgumentNames {
    fn enter_field(&mut self, ctx: &mut ValidationContext, field: &Spanning<Field>) {
        self.current_field = ctx.parent_output_type().map(|t| {
            (t.innermost_name(), field.item.name.item.clone())
        });
    }

    fn leave_field(&mut self, _: &mut ValidationContext, _: &Spanning<Field>) {
        self.current_field = None;
    }

    fn enter_argument(&mut self, ctx: &mut ValidationContext, argument: &Argument) {
        let Some((type_name, field_name)) = self.current_field.clone() else { return };
        let field_def = ctx
            .parent_output_type()
            .map(|t| t.innermost())
            .and_then(|t| t.field_named(&field_name))
            .cloned();
        let Some(field_def) = field_def else { return };
        if field_def.argument(&argument.name.item).is_none() {
            let known: Vec<&str> = field_def.arguments.iter().map(|a| a.name.as_str()).collect();
            let suggestions = suggestion_list(&argument.name.item, known);
            ctx.report(
                error_message(&argument.name.item, &field_name, &type_name, &suggestions),
                vec![argument.name.location],
            );
        }
    }
}

fn error_message(arg_name: &str, field_name: &str, type_name: &str, suggestions: &[&str]) -> String {
    format!(
        r#"Unknown argument "{arg_name}" on field "{field_name}" of type "{type_name}".{}"#,
        did_you_mean(suggestions)
    )
}

#[cfg(test)]
mod tests {
    use super::factory;
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn known_args_pass() {
        expect_passes_rule(
            factory(),
            r#"
            fragment F on Dog { doesKnowCommand(dogCommand: SIT) }
            "#,
        );
    }

    #[test]
    fn unknown_arg_fails() {
        expect_fails_rule(
            factory(),
            r#"
            fragment F on Dog { doesKnowCommand(unknown: true) }
            "#,
            &[&error_message("unknown", "doesKnowCommand", "Dog", &[])],
        );
    }
}
