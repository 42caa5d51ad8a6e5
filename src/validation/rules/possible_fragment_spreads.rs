//! Flags a fragment spread whose type condition can never overlap with the
//! type of the spot it's spread into (§4.2 rule 12): spreading a `Dog`
//! fragment into a `Cat` selection, or into a union/interface none of whose
//! possible types can ever be a `Dog`.

use std::collections::HashSet;

use arcstr::ArcStr;

use crate::ast::{FragmentSpread, InlineFragment, Spanning};
use crate::schema::{NamedType, Schema, TypeRef};

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct PossibleFragmentSpreads {
    container_stack: Vec<Option<TypeRef>>,
}

pub fn factory() -> PossibleFragmentSpreads {
    PossibleFragmentSpreads { container_stack: Vec::new() }
}

impl Rule for PossibleFragmentSpreads {
    fn enter_operation(&mut self, ctx: &mut ValidationContext, _: &Spanning<crate::ast::Operation>) {
        self.container_stack.push(ctx.current_output_type().cloned());
    }

    fn leave_operation(&mut self, _: &mut ValidationContext, _: &Spanning<crate::ast::Operation>) {
        self.container_stack.pop();
    }

    fn enter_fragment_definition(&mut self, ctx: &mut ValidationContext, _: &Spanning<crate::ast::Fragment>) {
        self.container_stack.push(ctx.current_output_type().cloned());
    }

    fn leave_fragment_definition(&mut self, _: &mut ValidationContext, _: &Spanning<crate::ast::Fragment>) {
        self.container_stack.pop();
    }

    fn enter_field(&mut self, ctx: &mut ValidationContext, _: &Spanning<crate::ast::Field>) {
        self.container_stack.push(ctx.current_output_type().cloned());
    }

    fn leave_field(&mut self, _: &mut ValidationContext, _: &Spanning<crate::ast::Field>) {
        self.container_stack.pop();
    }

    fn enter_inline_fragment(&mut self, ctx: &mut ValidationContext, frag: &Spanning<InlineFragment>) {
        let parent = self.container_stack.last().cloned().flatten();
        if let (Some(parent_ty), Some(cond)) = (&parent, &frag.item.type_condition) {
            check(ctx, None, &cond.item, parent_ty, cond.location);
        }
        self.container_stack.push(ctx.current_output_type().cloned());
    }

    fn leave_inline_fragment(&mut self, _: &mut ValidationContext, _: &Spanning<InlineFragment>) {
        self.container_stack.pop();
    }

    fn enter_fragment_spread(&mut self, ctx: &mut ValidationContext, spread: &Spanning<FragmentSpread>) {
        let parent = self.container_stack.last().cloned().flatten();
        let Some(parent_ty) = parent else { return };
        let Some(frag_def) = ctx.fragment(&spread.item.name.item) else { return };
        let frag_type_name = frag_def.item.type_condition.item.clone();
        check(ctx, Some(&spread.item.name.item), &frag_type_name, &parent_ty, spread.location);
    }
}

fn check(
    ctx: &mut ValidationContext,
    frag_name: Option<&str>,
    frag_type_name: &str,
    parent_ty: &TypeRef,
    location: crate::ast::Location,
) {
    if !ctx.schema.has_type(frag_type_name) {
        return;
    }
    let parent_type_name = parent_ty.innermost_name();
    if !types_overlap(ctx.schema, frag_type_name, &parent_type_name) {
        ctx.report(error_message(frag_name, frag_type_name, &parent_type_name), vec![location]);
    }
}

fn possible_type_names(schema: &Schema, name: &str) -> HashSet<ArcStr> {
    match schema.get_type(name).as_deref() {
        Some(NamedType::Object(o)) => [o.name.clone()].into_iter().collect(),
        Some(NamedType::Interface(i)) => schema.possible_type_names(&i.name).into_iter().collect(),
        Some(NamedType::Union(u)) => u.members.iter().cloned().collect(),
        _ => HashSet::new(),
    }
}

fn types_overlap(schema: &Schema, a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let pa = possible_type_names(schema, a);
    let pb = possible_type_names(schema, b);
    pa.intersection(&pb).next().is_some()
}

fn error_message(frag_name: Option<&str>, frag_type: &str, parent_type: &str) -> String {
    match frag_name {
        Some(name) => format!(
            r#"Fragment "{name}" cannot be spread here as objects of type "{parent_type}" can never be of type "{frag_type}"."#
        ),
        None => format!(
            r#"Fragment cannot be spread here as objects of type "{parent_type}" can never be of type "{frag_type}"."#
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn matching_type_spread_passes() {
        expect_passes_rule(
            factory(),
            r#"
            { dog { ...dogFragment } }
            fragment dogFragment on Dog { barkVolume }
            "#,
        );
    }

    #[test]
    fn interface_into_implementer_inline_passes() {
        expect_passes_rule(factory(), r#"{ pet { ... on Dog { barkVolume } } }"#);
    }

    #[test]
    fn non_overlapping_object_spread_fails() {
        expect_fails_rule(
            factory(),
            r#"
            { dog { ...catFragment } }
            fragment catFragment on Cat { meows }
            "#,
            &[&error_message(Some("catFragment"), "Cat", "Dog")],
        );
    }

    #[test]
    fn non_overlapping_inline_fragment_fails() {
        expect_fails_rule(
            factory(),
            r#"{ dog { ... on Cat { meows } } }"#,
            &[&error_message(None, "Cat", "Dog")],
        );
    }
}
