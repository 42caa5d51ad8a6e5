//! Flags a variable used somewhere its declared type doesn't satisfy the
//! type required by that position (§4.2 rule 11 supplement).
//!
//! Mirrors graphql-js's `allowedVariableUsage`: a nullable variable may fill
//! a non-null position only if a default value (on the variable or the
//! position itself) guarantees it's never actually null there.

use crate::ast::Value;
use crate::schema::TypeRef;

use crate::validation::context::ValidationContext;
use crate::validation::visitor::Rule;

pub struct VariablesInAllowedPosition;

pub fn factory() -> VariablesInAllowedPosition {
    VariablesInAllowedPosition
}

impl Rule for VariablesInAllowedPosition {
    fn enter_value(&mut self, ctx: &mut ValidationContext, value: &crate::ast::Spanning<Value>) {
        let Value::Variable(var_name) = &value.item else { return };
        let Some(location_type) = ctx.current_input_type().cloned() else { return };
        let var_defs = ctx.variable_definitions();
        let Some(var_def) = var_defs.get(var_name.as_str()) else { return };
        let Some(var_type) = ctx.resolve_type(&var_def.var_type.item) else { return };

        let var_has_default = var_def
            .default_value
            .as_ref()
            .map(|d| !matches!(d.item, Value::Null))
            .unwrap_or(false);
        let location_has_default = ctx.current_argument().map(|a| a.default_value.is_some()).unwrap_or(false);

        if !allowed_variable_usage(&var_type, var_has_default, &location_type, location_has_default) {
            ctx.report(
                error_message(var_name, &format!("{var_type:?}"), &format!("{location_type:?}")),
                vec![value.location],
            );
        }
    }
}

fn allowed_variable_usage(
    var_type: &TypeRef,
    var_has_non_null_default: bool,
    location_type: &TypeRef,
    location_has_default: bool,
) -> bool {
    if let TypeRef::NonNull(location_inner) = location_type {
        if !var_type.is_non_null() {
            if !var_has_non_null_default && !location_has_default {
                return false;
            }
            return is_subtype(var_type, location_inner);
        }
    }
    is_subtype(var_type, location_type)
}

/// Whether `sub` can be used wherever `sup` is expected: same named type, a
/// non-null wrapping a type that's a subtype of `sup`, or a list whose
/// elements are pairwise subtypes.
fn is_subtype(sub: &TypeRef, sup: &TypeRef) -> bool {
    match sup {
        TypeRef::NonNull(sup_inner) => match sub {
            TypeRef::NonNull(sub_inner) => is_subtype(sub_inner, sup_inner),
            _ => false,
        },
        TypeRef::List(sup_inner) => match sub {
            TypeRef::List(sub_inner) => is_subtype(sub_inner, sup_inner),
            TypeRef::NonNull(sub_inner) => is_subtype(sub_inner, sup),
            TypeRef::Named(_) => false,
        },
        TypeRef::Named(_) => match sub {
            TypeRef::NonNull(sub_inner) => is_subtype(sub_inner, sup),
            TypeRef::Named(_) => sub.innermost_name() == sup.innermost_name(),
            TypeRef::List(_) => false,
        },
    }
}

fn error_message(var_name: &str, var_type: &str, location_type: &str) -> String {
    format!(r#"Variable "${var_name}" of type "{var_type}" used in position expecting type "{location_type}"."#)
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn matching_types_pass() {
        expect_passes_rule(
            factory(),
            r#"query Foo($intArg: Int) { complicatedArgs { intArgField(intArg: $intArg) } }"#,
        );
    }

    #[test]
    fn non_null_variable_for_nullable_position_passes() {
        expect_passes_rule(
            factory(),
            r#"query Foo($intArg: Int!) { complicatedArgs { intArgField(intArg: $intArg) } }"#,
        );
    }

    #[test]
    fn nullable_variable_with_default_for_non_null_position_passes() {
        expect_passes_rule(
            factory(),
            r#"query Foo($intArg: Int = 1) { complicatedArgs { nonNullIntArgField(nonNullIntArg: $intArg) } }"#,
        );
    }

    #[test]
    fn nullable_variable_for_non_null_position_fails() {
        expect_fails_rule(
            factory(),
            r#"query Foo($intArg: Int) { complicatedArgs { nonNullIntArgField(nonNullIntArg: $intArg) } }"#,
            &[&error_message("intArg", "Int", "Int!")],
        );
    }

    #[test]
    fn mismatched_scalar_type_fails() {
        expect_fails_rule(
            factory(),
            r#"query Foo($stringArg: String) { complicatedArgs { intArgField(intArg: $stringArg) } }"#,
            &[&error_message("stringArg", "String", "Int")],
        );
    }
}
