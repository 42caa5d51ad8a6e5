//! Flags a field selected on a composite type that doesn't declare it
//! (§4.2 rule 8). `__typename` is always valid on any object, interface, or
//! union, the same way the executor resolves it without a schema lookup
//! (§4.4, [`crate::schema::introspection`]).

use crate::ast::{Field, Spanning};
use crate::schema::introspection::TYPENAME_FIELD;
use crate::util::{did_you_mean, suggestion_list};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct FieldsOnCorrectType;

pub fn factory() -> FieldsOnCorrectType {
    FieldsOnCorrectType
}

impl Rule for FieldsOnCorrectType {
    fn enter_field(&mut self, ctx: &mut ValidationContext, field: &Spanning<Field>) {
        let field_name = &field.item.name.item;
        if field_name.as_str() == TYPENAME_FIELD {
            return;
        }
        let Some(parent_type) = ctx.parent_output_type() else { return };
        let parent = parent_type.innermost();
        if !parent.is_composite() {
            return;
        }
        if parent.field_named(field_name).is_some() {
            return;
        }
        let known: Vec<&str> = parent.fields().map(|fs| fs.iter().map(|f| f.name.as_str()).collect()).unwrap_or_default();
        let suggestions = suggestion_list(field_name, known);
        ctx.report(error_message(field_name, &parent.name().to_string(), &suggestions), vec![field.location]);
    }
}

fn error_message(field_name: &str, type_name: &str, suggestions: &[&str]) -> String {
    format!(
        r#"Cannot query field "{field_name}" on type "{type_name}".{}"#,
        did_you_mean(suggestions)
    )
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn known_field_passes() {
        expect_passes_rule(factory(), r#"{ dog { name } }"#);
    }

    #[test]
    fn typename_always_passes() {
        expect_passes_rule(factory(), r#"{ dog { __typename } catOrDog { __typename } }"#);
    }

    #[test]
    fn unknown_field_fails() {
        expect_fails_rule(
            factory(),
            r#"{ dog { barks nam } }"#,
            &[&error_message("nam", "Dog", &["name"])],
        );
    }

    #[test]
    fn unknown_field_on_union_fails() {
        expect_fails_rule(
            factory(),
            r#"{ catOrDog { name } }"#,
            &[&error_message("name", "CatOrDog", &[])],
        );
    }
}
