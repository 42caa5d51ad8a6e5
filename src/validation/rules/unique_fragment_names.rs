//! Flags two fragment definitions in one document sharing a name (§4.2 rule
//! 1).

use std::collections::hash_map::{Entry, HashMap};

use arcstr::ArcStr;

use crate::ast::{Fragment, Location, Spanning};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct UniqueFragmentNames {
    names: HashMap<ArcStr, Location>,
}

pub fn factory() -> UniqueFragmentNames {
    UniqueFragmentNames { names: HashMap::new() }
}

impl Rule for UniqueFragmentNames {
    fn enter_fragment_definition(&mut self, ctx: &mut ValidationContext, frag: &Spanning<Fragment>) {
        let name = &frag.item.name;
        match self.names.entry(name.item.clone()) {
            Entry::Occupied(e) => {
                ctx.report(duplicate_message(&name.item), vec![*e.get(), name.location]);
            }
            Entry::Vacant(e) => {
                e.insert(name.location);
            }
        }
    }
}

fn duplicate_message(frag_name: &str) -> String {
    format!("There can only be one fragment named {frag_name}")
}

#[cfg(test)]
mod tests {
    use super::{duplicate_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn many_fragments_pass() {
        expect_passes_rule(
            factory(),
            r#"
            { dog { ...A ...B } }
            fragment A on Dog { name }
            fragment B on Dog { nickname }
            "#,
        );
    }

    #[test]
    fn duplicate_fragment_names_fail() {
        expect_fails_rule(
            factory(),
            r#"
            { dog { ...A } }
            fragment A on Dog { name }
            fragment A on Dog { nickname }
            "#,
            &[&duplicate_message("A")],
        );
    }
}
