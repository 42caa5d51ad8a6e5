//! Flags references to types absent from the schema, in type conditions and
//! variable declarations (§4.2 rule 2).

use crate::ast::{Fragment, InlineFragment, Location, Spanning, VariableDefinition};
use crate::util::{did_you_mean, suggestion_list};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct KnownTypeNames;

pub fn factory() -> KnownTypeNames {
    KnownTypeNames
}

impl Rule for KnownTypeNames {
    fn enter_inline_fragment(&mut self, ctx: &mut ValidationContext, frag: &Spanning<InlineFragment>) {
        if let Some(type_cond) = &frag.item.type_condition {
            validate_type(ctx, &type_cond.item, type_cond.location);
        }
    }

    fn enter_fragment_definition(&mut self, ctx: &mut ValidationContext, frag: &Spanning<Fragment>) {
        let type_cond = &frag.item.type_condition;
        validate_type(ctx, &type_cond.item, type_cond.location);
    }

    fn enter_variable_definition(&mut self, ctx: &mut ValidationContext, def: &VariableDefinition) {
        let type_name = def.var_type.item.innermost_name();
        validate_type(ctx, type_name, def.var_type.location);
    }
}

fn validate_type(ctx: &mut ValidationContext, type_name: &str, location: Location) {
    if !ctx.schema.has_type(type_name) {
        let known: Vec<&str> = ctx.schema.known_types().map(|t| t.name()).collect();
        let suggestions = suggestion_list(type_name, known);
        ctx.report(error_message(type_name, &suggestions), vec![location]);
    }
}

fn error_message(type_name: &str, suggestions: &[&str]) -> String {
    format!(r#"Unknown type "{type_name}".{}"#, did_you_mean(suggestions))
}

#[cfg(test)]
mod tests {
    use super::factory;
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn known_type_names_are_valid() {
        expect_passes_rule(
            factory(),
            r#"
            query Foo($var: String) {
              dog { ... on Dog { name }, ... { name } }
            }
            "#,
        );
    }

    #[test]
    fn unknown_type_names_are_invalid() {
        expect_fails_rule(
            factory(),
            r#"
            query Foo($var: JumbledUpLetters) {
              dog { ... on Badger { name } }
            }
            "#,
            &[&error_message("Badger", &[]), &error_message("JumbledUpLetters", &[])],
        );
    }
}
