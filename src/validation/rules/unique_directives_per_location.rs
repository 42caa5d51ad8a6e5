//! Flags the same non-repeatable directive applied twice at one location
//! (§4.2 rule 4 supplement): `@skip(if: true) @skip(if: false)` on the same
//! field is rejected even though each application is individually valid.

use std::collections::hash_map::{Entry, HashMap};

use arcstr::ArcStr;

use crate::ast::{Directive, Field, Fragment, FragmentSpread, InlineFragment, Location, Operation, Spanning};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct UniqueDirectivesPerLocation {
    seen: HashMap<ArcStr, Location>,
}

pub fn factory() -> UniqueDirectivesPerLocation {
    UniqueDirectivesPerLocation { seen: HashMap::new() }
}

impl UniqueDirectivesPerLocation {
    fn check(&mut self, ctx: &mut ValidationContext, directives: &[Directive]) {
        self.seen.clear();
        for directive in directives {
            let name = &directive.name.item;
            if ctx.schema.directive(name).map(|d| d.is_repeatable).unwrap_or(false) {
                continue;
            }
            match self.seen.entry(name.clone()) {
                Entry::Occupied(e) => {
                    ctx.report(error_message(name), vec![*e.get(), directive.location]);
                }
                Entry::Vacant(e) => {
                    e.insert(directive.location);
                }
            }
        }
    }
}

impl Rule for UniqueDirectivesPerLocation {
    fn enter_operation(&mut self, ctx: &mut ValidationContext, op: &Spanning<Operation>) {
        self.check(ctx, &op.item.directives);
    }

    fn enter_field(&mut self, ctx: &mut ValidationContext, field: &Spanning<Field>) {
        self.check(ctx, &field.item.directives);
    }

    fn enter_fragment_definition(&mut self, ctx: &mut ValidationContext, frag: &Spanning<Fragment>) {
        self.check(ctx, &frag.item.directives);
    }

    fn enter_fragment_spread(&mut self, ctx: &mut ValidationContext, spread: &Spanning<FragmentSpread>) {
        self.check(ctx, &spread.item.directives);
    }

    fn enter_inline_fragment(&mut self, ctx: &mut ValidationContext, frag: &Spanning<InlineFragment>) {
        self.check(ctx, &frag.item.directives);
    }
}

fn error_message(name: &str) -> String {
    format!(r#"The directive "{name}" can only be used once at this location."#)
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn distinct_locations_pass() {
        expect_passes_rule(
            factory(),
            r#"{ dog @include(if: true) { name @include(if: true) } }"#,
        );
    }

    #[test]
    fn duplicated_directive_fails() {
        expect_fails_rule(
            factory(),
            r#"{ dog @include(if: true) @include(if: false) { name } }"#,
            &[&error_message("include")],
        );
    }
}
