//! Flags two operations in one document sharing a name (§4.2 rule 1).

use std::collections::hash_map::{Entry, HashMap};

use arcstr::ArcStr;

use crate::ast::{Location, Operation, Spanning};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct UniqueOperationNames {
    names: HashMap<ArcStr, Location>,
}

pub fn factory() -> UniqueOperationNames {
    UniqueOperationNames { names: HashMap::new() }
}

impl Rule for UniqueOperationNames {
    fn enter_operation(&mut self, ctx: &mut ValidationContext, op: &Spanning<Operation>) {
        let Some(op_name) = &op.item.name else { return };
        match self.names.entry(op_name.item.clone()) {
            Entry::Occupied(e) => {
                ctx.report(error_message(&op_name.item), vec![*e.get(), op.location]);
            }
            Entry::Vacant(e) => {
                e.insert(op.location);
            }
        }
    }
}

fn error_message(op_name: &str) -> String {
    format!("There can only be one operation named {op_name}")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn one_named_operation_passes() {
        expect_passes_rule(factory(), r#"query Foo { dog { name } }"#);
    }

    #[test]
    fn distinct_names_pass() {
        expect_passes_rule(
            factory(),
            r#"query Foo { dog { name } } query Bar { dog { name } }"#,
        );
    }

    #[test]
    fn duplicate_names_fail() {
        expect_fails_rule(
            factory(),
            r#"query Foo { dog { name } } query Foo { dog { nickname } }"#,
            &[&error_message("Foo")],
        );
    }
}
