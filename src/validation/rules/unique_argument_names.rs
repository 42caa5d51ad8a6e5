//! Flags two arguments on the same field or directive application sharing a
//! name (§4.2 rule 1).

use std::collections::hash_map::{Entry, HashMap};

use arcstr::ArcStr;

use crate::ast::{Argument, Directive, Field, Spanning};
use crate::ast::Location;

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct UniqueArgumentNames {
    known_names: HashMap<ArcStr, Location>,
}

pub fn factory() -> UniqueArgumentNames {
    UniqueArgumentNames { known_names: HashMap::new() }
}

impl Rule for UniqueArgumentNames {
    fn enter_field(&mut self, _: &mut ValidationContext, _: &Spanning<Field>) {
        self.known_names.clear();
    }

    fn enter_directive(&mut self, _: &mut ValidationContext, _: &Directive) {
        self.known_names.clear();
    }

    fn enter_argument(&mut self, ctx: &mut ValidationContext, argument: &Argument) {
        match self.known_names.entry(argument.name.item.clone()) {
            Entry::Occupied(e) => {
                ctx.report(error_message(&argument.name.item), vec![*e.get(), argument.name.location]);
            }
            Entry::Vacant(e) => {
                e.insert(argument.name.location);
            }
        }
    }
}

fn error_message(arg_name: &str) -> String {
    format!(r#"There can only be one argument named "{arg_name}""#)
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn distinct_arguments_pass() {
        expect_passes_rule(
            factory(),
            r#"{ dog { isAtLocation(x: 1, y: 2) } }"#,
        );
    }

    #[test]
    fn duplicate_field_argument_fails() {
        expect_fails_rule(
            factory(),
            r#"{ dog { doesKnowCommand(dogCommand: SIT, dogCommand: DOWN) } }"#,
            &[&error_message("dogCommand")],
        );
    }
}
