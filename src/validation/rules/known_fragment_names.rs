//! Flags fragment spreads naming a fragment with no definition in the
//! document (§4.2 rule 2).

use crate::ast::{FragmentSpread, Spanning};
use crate::util::{did_you_mean, suggestion_list};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct KnownFragmentNames;

pub fn factory() -> KnownFragmentNames {
    KnownFragmentNames
}

impl Rule for KnownFragmentNames {
    fn enter_fragment_spread(&mut self, ctx: &mut ValidationContext, spread: &Spanning<FragmentSpread>) {
        let name = &spread.item.name;
        if ctx.fragment(&name.item).is_none() {
            let known: Vec<&str> = ctx.fragment_names().map(|n| n.as_str()).collect();
            let suggestions = suggestion_list(&name.item, known);
            ctx.report(error_message(&name.item, &suggestions), vec![name.location]);
        }
    }
}

fn error_message(name: &str, suggestions: &[&str]) -> String {
    format!(r#"Unknown fragment "{name}".{}"#, did_you_mean(suggestions))
}

#[cfg(test)]
mod tests {
    use super::factory;
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn known_fragments_pass() {
        expect_passes_rule(
            factory(),
            r#"
            { human(id: "4") { ...HumanFields } }
            fragment HumanFields on Human { name }
            "#,
        );
    }

    #[test]
    fn unknown_fragment_fails() {
        expect_fails_rule(
            factory(),
            r#"
            { human(id: "4") { ...MissingFields } }
            "#,
            &[&error_message("MissingFields", &[])],
        );
    }
}
