//! Flags an anonymous operation sharing a document with any other operation
//! (§4.2 rule 5): `{ dog { name } }` is fine alone, but not alongside
//! `query Named { ... }`.

use crate::ast::{Document, Operation, Spanning};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct LoneAnonymousOperation {
    operation_count: usize,
}

pub fn factory() -> LoneAnonymousOperation {
    LoneAnonymousOperation { operation_count: 0 }
}

impl Rule for LoneAnonymousOperation {
    fn enter_document(&mut self, _: &mut ValidationContext, doc: &Document) {
        self.operation_count = doc.operations().count();
    }

    fn enter_operation(&mut self, ctx: &mut ValidationContext, op: &Spanning<Operation>) {
        if op.item.name.is_none() && self.operation_count > 1 {
            ctx.report(error_message(), vec![op.location]);
        }
    }
}

fn error_message() -> String {
    "This anonymous operation must be the only defined operation.".to_string()
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn lone_anonymous_operation_passes() {
        expect_passes_rule(factory(), r#"{ dog { name } }"#);
    }

    #[test]
    fn anonymous_with_another_operation_fails() {
        expect_fails_rule(
            factory(),
            r#"
            { dog { name } }
            query Named { dog { barks } }
            "#,
            &[&error_message()],
        );
    }
}
