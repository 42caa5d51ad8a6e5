//! Flags directive arguments not declared on the directive's definition
//! (§4.2 rule 2 supplement — split from field-argument checking since a
//! directive has no parent output type to key off of).

use crate::ast::{Argument, Directive};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct KnownDirectiveArgumentNames {
    current_directive: Option<arcstr::ArcStr>,
}

pub fn factory() -> KnownDirectiveArgumentNames {
    KnownDirectiveArgumentNames { current_directive: None }
}

impl Rule for KnownDirectiveArgumentNames {
    fn enter_directive(&mut self, ctx: &mut ValidationContext, directive: &Directive) {
        self.current_directive = ctx
            .schema
            .directive(&directive.name.item)
            .map(|_| directive.name.item.clone());
    }

    fn leave_directive(&mut self, _: &mut ValidationContext, _: &Directive) {
        self.current_directive = None;
    }

    fn enter_argument(&mut self, ctx: &mut ValidationContext, argument: &Argument) {
        let Some(directive_name) = self.current_directive.clone() else { return };
        let known = ctx
            .schema
            .directive(&directive_name)
            .and_then(|d| d.argument(&argument.name.item))
            .is_some();
        if !known {
            ctx.report(
                error_message(&argument.name.item, &directive_name),
                vec![argument.name.location],
            );
        }
    }
}

fn error_message(arg_name: &str, directive_name: &str) -> String {
    format!(r#"Unknown argument "{arg_name}" on directive "@{directive_name}""#)
}

#[cfg(test)]
mod tests {
    use super::factory;
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn known_directive_args_pass() {
        expect_passes_rule(factory(), r#"{ dog @skip(if: true) { name } }"#);
    }

    #[test]
    fn unknown_directive_arg_fails() {
        expect_fails_rule(
            factory(),
            r#"{ dog @skip(unless: true) { name } }"#,
            &[&error_message("unless", "skip")],
        );
    }
}
