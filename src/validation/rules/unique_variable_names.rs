//! Flags two variables declared under the same operation with the same name
//! (§4.2 rule 1). The name table resets at each operation boundary.

use std::collections::hash_map::{Entry, HashMap};

use arcstr::ArcStr;

use crate::ast::{Location, Operation, Spanning, VariableDefinition};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct UniqueVariableNames {
    names: HashMap<ArcStr, Location>,
}

pub fn factory() -> UniqueVariableNames {
    UniqueVariableNames { names: HashMap::new() }
}

impl Rule for UniqueVariableNames {
    fn enter_operation(&mut self, _: &mut ValidationContext, _: &Spanning<Operation>) {
        self.names.clear();
    }

    fn enter_variable_definition(&mut self, ctx: &mut ValidationContext, def: &VariableDefinition) {
        match self.names.entry(def.name.item.clone()) {
            Entry::Occupied(e) => {
                ctx.report(error_message(&def.name.item), vec![*e.get(), def.name.location]);
            }
            Entry::Vacant(e) => {
                e.insert(def.name.location);
            }
        }
    }
}

fn error_message(var_name: &str) -> String {
    format!("There can only be one variable named {var_name}")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn unique_variable_names_pass() {
        expect_passes_rule(
            factory(),
            r#"
            query A($x: Int, $y: String) { dog { name } }
            query B($x: String, $y: Int) { dog { name } }
            "#,
        );
    }

    #[test]
    fn duplicate_variable_names_fail() {
        expect_fails_rule(
            factory(),
            r#"query A($x: Int, $x: String) { dog { name } }"#,
            &[&error_message("x")],
        );
    }
}
