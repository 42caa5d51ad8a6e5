//! Rejects non-executable definitions in a query document (§4.2 rule 1).

use crate::ast::{Definition, Document};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct ExecutableDefinitionsOnly;

pub fn factory() -> ExecutableDefinitionsOnly {
    ExecutableDefinitionsOnly
}

impl Rule for ExecutableDefinitionsOnly {
    fn enter_document(&mut self, ctx: &mut ValidationContext, doc: &Document) {
        for def in &doc.definitions {
            if let Definition::NonExecutable(name) = def {
                ctx.report(error_message(&name.item), vec![name.location]);
            }
        }
    }
}

fn error_message(name: &str) -> String {
    format!(r#"The "{name}" definition is not executable"#)
}

#[cfg(test)]
mod tests {
    use super::factory;
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn passes_with_only_operations_and_fragments() {
        expect_passes_rule(
            factory(),
            r#"
            query Q { dog { name } }
            fragment F on Dog { name }
            "#,
        );
    }
}
