//! Flags two fields in the same input object literal sharing a name (§4.2
//! rule 1).
//!
//! [`crate::ast::Value::Object`] is keyed by an [`indexmap::IndexMap`], so a
//! duplicate key is already collapsed by the time parsing hands us a
//! document; this rule only has teeth against a future AST that preserves
//! duplicate object-literal keys as written.

use crate::ast::{Location, Value};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct UniqueInputFieldNames;

pub fn factory() -> UniqueInputFieldNames {
    UniqueInputFieldNames
}

impl Rule for UniqueInputFieldNames {
    fn enter_value(&mut self, ctx: &mut ValidationContext, value: &crate::ast::Spanning<Value>) {
        let Value::Object(fields) = &value.item else { return };
        let mut seen: Vec<(&str, Location)> = Vec::new();
        for (name, field_value) in fields {
            if let Some((_, first_loc)) = seen.iter().find(|(n, _)| *n == name.as_str()) {
                ctx.report(error_message(name), vec![*first_loc, field_value.location]);
            } else {
                seen.push((name.as_str(), field_value.location));
            }
        }
    }
}

fn error_message(field_name: &str) -> String {
    format!(r#"There can only be one input field named "{field_name}""#)
}

#[cfg(test)]
mod tests {
    use super::factory;
    use crate::validation::test_harness::expect_passes_rule;

    #[test]
    fn input_object_with_distinct_fields_passes() {
        expect_passes_rule(
            factory(),
            r#"{ dog(x: { f1: "a", f2: "b" }) { name } }"#,
        );
    }
}
