//! Flags fragment definitions that no operation ever spreads, directly or
//! transitively (§4.2 rule 3).

use std::collections::{HashMap, HashSet};

use arcstr::ArcStr;

use crate::ast::{Document, Fragment, FragmentSpread, Operation, Spanning};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

#[derive(Clone, PartialEq, Eq, Hash)]
enum Scope {
    Operation(Option<ArcStr>),
    Fragment(ArcStr),
}

pub struct NoUnusedFragments {
    spreads: HashMap<Scope, Vec<ArcStr>>,
    defined_fragments: Vec<Spanning<ArcStr>>,
    current_scope: Option<Scope>,
}

pub fn factory() -> NoUnusedFragments {
    NoUnusedFragments {
        spreads: HashMap::new(),
        defined_fragments: Vec::new(),
        current_scope: None,
    }
}

impl NoUnusedFragments {
    fn find_reachable(&self, from: &Scope, result: &mut HashSet<ArcStr>) {
        if let Scope::Fragment(name) = from {
            if result.contains(name) {
                return;
            }
            result.insert(name.clone());
        }
        if let Some(spreads) = self.spreads.get(from) {
            for spread in spreads {
                self.find_reachable(&Scope::Fragment(spread.clone()), result);
            }
        }
    }
}

impl Rule for NoUnusedFragments {
    fn enter_operation(&mut self, _: &mut ValidationContext, op: &Spanning<Operation>) {
        let name = op.item.name.as_ref().map(|s| s.item.clone());
        self.current_scope = Some(Scope::Operation(name));
    }

    fn enter_fragment_definition(&mut self, _: &mut ValidationContext, frag: &Spanning<Fragment>) {
        self.defined_fragments.push(frag.item.name.clone());
        self.current_scope = Some(Scope::Fragment(frag.item.name.item.clone()));
    }

    fn enter_fragment_spread(&mut self, _: &mut ValidationContext, spread: &Spanning<FragmentSpread>) {
        if let Some(scope) = &self.current_scope {
            self.spreads.entry(scope.clone()).or_default().push(spread.item.name.item.clone());
        }
    }

    fn leave_document(&mut self, ctx: &mut ValidationContext, doc: &Document) {
        let mut reachable = HashSet::new();
        for op in doc.operations() {
            let name = op.item.name.as_ref().map(|s| s.item.clone());
            self.find_reachable(&Scope::Operation(name), &mut reachable);
        }
        for frag in &self.defined_fragments {
            if !reachable.contains(&frag.item) {
                ctx.report(error_message(&frag.item), vec![frag.location]);
            }
        }
    }
}

fn error_message(name: &str) -> String {
    format!(r#"Fragment "{name}" is never used"#)
}

#[cfg(test)]
mod tests {
    use super::factory;
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn all_used_fragments_pass() {
        expect_passes_rule(
            factory(),
            r#"{ dog { ...F } } fragment F on Dog { name }"#,
        );
    }

    #[test]
    fn unused_fragment_fails() {
        expect_fails_rule(
            factory(),
            r#"{ dog { name } } fragment F on Dog { name }"#,
            &[&error_message("F")],
        );
    }
}
