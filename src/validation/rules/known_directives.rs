//! Flags unknown directives and directives used at a location their
//! definition doesn't allow (§4.2 rule 2).

use crate::ast::{Directive, Field, Fragment, FragmentSpread, InlineFragment, OperationType, Spanning};
use crate::schema::DirectiveLocation;

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct KnownDirectives {
    location_stack: Vec<DirectiveLocation>,
}

pub fn factory() -> KnownDirectives {
    KnownDirectives { location_stack: Vec::new() }
}

impl Rule for KnownDirectives {
    fn enter_operation(&mut self, _: &mut ValidationContext, op: &Spanning<crate::ast::Operation>) {
        self.location_stack.push(match op.item.operation_type {
            OperationType::Query => DirectiveLocation::Query,
            OperationType::Mutation => DirectiveLocation::Mutation,
            OperationType::Subscription => DirectiveLocation::Subscription,
        });
    }

    fn leave_operation(&mut self, _: &mut ValidationContext, _: &Spanning<crate::ast::Operation>) {
        self.location_stack.pop();
    }

    fn enter_field(&mut self, _: &mut ValidationContext, _: &Spanning<Field>) {
        self.location_stack.push(DirectiveLocation::Field);
    }

    fn leave_field(&mut self, _: &mut ValidationContext, _: &Spanning<Field>) {
        self.location_stack.pop();
    }

    fn enter_fragment_definition(&mut self, _: &mut ValidationContext, _: &Spanning<Fragment>) {
        self.location_stack.push(DirectiveLocation::FragmentDefinition);
    }

    fn leave_fragment_definition(&mut self, _: &mut ValidationContext, _: &Spanning<Fragment>) {
        self.location_stack.pop();
    }

    fn enter_fragment_spread(&mut self, _: &mut ValidationContext, _: &Spanning<FragmentSpread>) {
        self.location_stack.push(DirectiveLocation::FragmentSpread);
    }

    fn leave_fragment_spread(&mut self, _: &mut ValidationContext, _: &Spanning<FragmentSpread>) {
        self.location_stack.pop();
    }

    fn enter_inline_fragment(&mut self, _: &mut ValidationContext, _: &Spanning<InlineFragment>) {
        self.location_stack.push(DirectiveLocation::InlineFragment);
    }

    fn leave_inline_fragment(&mut self, _: &mut ValidationContext, _: &Spanning<InlineFragment>) {
        self.location_stack.pop();
    }

    fn enter_directive(&mut self, ctx: &mut ValidationContext, directive: &Directive) {
        let name = &directive.name.item;
        match ctx.schema.directive(name) {
            Some(directive_type) => {
                if let Some(current) = self.location_stack.last() {
                    if !directive_type.locations.iter().any(|l| l == current) {
                        ctx.report(misplaced_error_message(name, *current), vec![directive.location]);
                    }
                }
            }
            None => ctx.report(unknown_error_message(name), vec![directive.location]),
        }
    }
}

fn unknown_error_message(name: &str) -> String {
    format!(r#"Unknown directive "{name}""#)
}

fn misplaced_error_message(name: &str, location: DirectiveLocation) -> String {
    format!(r#"Directive "{name}" may not be used on {}"#, location.name())
}

#[cfg(test)]
mod tests {
    use super::factory;
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn known_directives_are_valid() {
        expect_passes_rule(
            factory(),
            r#"
            { dog @include(if: true) { name } }
            "#,
        );
    }

    #[test]
    fn unknown_directive_fails() {
        expect_fails_rule(
            factory(),
            r#"
            { dog @unknown(if: true) { name } }
            "#,
            &[&unknown_error_message("unknown")],
        );
    }

    #[test]
    fn misplaced_directive_fails() {
        expect_fails_rule(
            factory(),
            r#"
            query Foo @include(if: true) { dog { name } }
            "#,
            &[&misplaced_error_message("include", crate::schema::DirectiveLocation::Query)],
        );
    }
}
