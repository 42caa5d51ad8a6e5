//! The standard rule set (§4.2): one module per rule, each exposing a
//! `factory()` that builds a fresh [`Rule`](super::visitor::Rule) instance
//! (rule state doesn't outlive a single document's traversal, so a rule
//! can't be reused across calls).
//!
//! [`default_rules`] is the full specified set run against every document;
//! [`query_complexity::QueryComplexity`] and [`query_depth::QueryDepth`] are
//! optional and take a host-chosen limit, so they're constructed separately
//! and appended by whoever calls [`super::validate`].

pub mod executable_definitions_only;
pub mod fields_on_correct_type;
pub mod fragments_on_composite_types;
pub mod known_argument_names;
pub mod known_directive_argument_names;
pub mod known_directives;
pub mod known_fragment_names;
pub mod known_type_names;
pub mod lone_anonymous_operation;
pub mod no_fragment_cycles;
pub mod no_unused_fragments;
pub mod overlapping_fields_can_be_merged;
pub mod possible_fragment_spreads;
pub mod provided_required_arguments;
pub mod query_complexity;
pub mod query_depth;
pub mod scalar_leafs;
pub mod single_field_subscriptions;
pub mod unique_argument_names;
pub mod unique_directives_per_location;
pub mod unique_fragment_names;
pub mod unique_input_field_names;
pub mod unique_operation_names;
pub mod unique_variable_names;
pub mod values_of_correct_type;
pub mod variables_are_input_types;
pub mod variables_in_allowed_position;

use super::visitor::Rule;

/// The standard rule set (§4.2, all 14 rule categories save the optional
/// complexity/depth limits), in the order graphql-js runs them.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(executable_definitions_only::factory()),
        Box::new(unique_operation_names::factory()),
        Box::new(lone_anonymous_operation::factory()),
        Box::new(single_field_subscriptions::factory()),
        Box::new(known_type_names::factory()),
        Box::new(fragments_on_composite_types::factory()),
        Box::new(variables_are_input_types::factory()),
        Box::new(scalar_leafs::factory()),
        Box::new(fields_on_correct_type::factory()),
        Box::new(unique_fragment_names::factory()),
        Box::new(known_fragment_names::factory()),
        Box::new(no_unused_fragments::factory()),
        Box::new(possible_fragment_spreads::factory()),
        Box::new(no_fragment_cycles::factory()),
        Box::new(unique_variable_names::factory()),
        Box::new(variables_in_allowed_position::factory()),
        Box::new(known_directives::factory()),
        Box::new(unique_directives_per_location::factory()),
        Box::new(known_argument_names::factory()),
        Box::new(known_directive_argument_names::factory()),
        Box::new(unique_argument_names::factory()),
        Box::new(unique_input_field_names::factory()),
        Box::new(values_of_correct_type::factory()),
        Box::new(provided_required_arguments::factory()),
        Box::new(overlapping_fields_can_be_merged::factory()),
    ]
}
