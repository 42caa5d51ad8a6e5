//! Flags fragments that spread themselves, directly or through a chain of
//! other fragments (§4.2 rule 3: "cycles detected by DFS on spread edges
//! with a path stack").

use std::collections::{HashMap, HashSet};

use arcstr::ArcStr;

use crate::ast::{Document, Fragment, FragmentSpread, Location, Spanning};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct NoFragmentCycles {
    current_fragment: Option<ArcStr>,
    spreads: HashMap<ArcStr, Vec<Spanning<ArcStr>>>,
    fragment_order: Vec<ArcStr>,
}

pub fn factory() -> NoFragmentCycles {
    NoFragmentCycles {
        current_fragment: None,
        spreads: HashMap::new(),
        fragment_order: Vec::new(),
    }
}

impl Rule for NoFragmentCycles {
    fn enter_fragment_definition(&mut self, _: &mut ValidationContext, frag: &Spanning<Fragment>) {
        let name = frag.item.name.item.clone();
        self.current_fragment = Some(name.clone());
        self.fragment_order.push(name);
    }

    fn leave_fragment_definition(&mut self, _: &mut ValidationContext, _: &Spanning<Fragment>) {
        self.current_fragment = None;
    }

    fn enter_fragment_spread(&mut self, _: &mut ValidationContext, spread: &Spanning<FragmentSpread>) {
        if let Some(current) = &self.current_fragment {
            self.spreads.entry(current.clone()).or_default().push(spread.item.name.clone());
        }
    }

    fn leave_document(&mut self, ctx: &mut ValidationContext, _: &Document) {
        let mut detector = CycleDetector {
            visited: HashSet::new(),
            spreads: &self.spreads,
            errors: Vec::new(),
        };
        for frag in &self.fragment_order {
            if !detector.visited.contains(frag) {
                detector.detect_from(frag, &mut Vec::new());
            }
        }
        for (message, locations) in detector.errors {
            ctx.report(message, locations);
        }
    }
}

struct CycleDetector<'a> {
    visited: HashSet<ArcStr>,
    spreads: &'a HashMap<ArcStr, Vec<Spanning<ArcStr>>>,
    errors: Vec<(String, Vec<Location>)>,
}

impl<'a> CycleDetector<'a> {
    fn detect_from(&mut self, from: &ArcStr, path: &mut Vec<Spanning<ArcStr>>) {
        self.visited.insert(from.clone());
        let Some(children) = self.spreads.get(from) else { return };

        let mut path_indices: HashMap<ArcStr, usize> = path
            .iter()
            .enumerate()
            .map(|(i, s)| (s.item.clone(), i))
            .collect();
        path_indices.insert(from.clone(), path.len());

        for spread in children.clone() {
            if let Some(&index) = path_indices.get(&spread.item) {
                let err_pos = if index < path.len() { path[index].location } else { spread.location };
                self.errors.push((error_message(&spread.item), vec![err_pos]));
                continue;
            }
            path.push(spread.clone());
            self.detect_from(&spread.item.clone(), path);
            path.pop();
        }
    }
}

fn error_message(frag_name: &str) -> String {
    format!(r#"Cannot spread fragment "{frag_name}" within itself"#)
}

#[cfg(test)]
mod tests {
    use super::factory;
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn acyclic_fragments_pass() {
        expect_passes_rule(
            factory(),
            r#"{ dog { ...F } } fragment F on Dog { name }"#,
        );
    }

    #[test]
    fn direct_cycle_fails() {
        expect_fails_rule(
            factory(),
            r#"{ dog { ...F } } fragment F on Dog { ...F }"#,
            &[&error_message("F")],
        );
    }

    #[test]
    fn transitive_cycle_fails() {
        expect_fails_rule(
            factory(),
            r#"
            { dog { ...A } }
            fragment A on Dog { ...B }
            fragment B on Dog { ...A }
            "#,
            &[&error_message("B")],
        );
    }
}
