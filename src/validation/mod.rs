//! Document validation (§4.2, §5): a single shared traversal drives every
//! registered rule over a parsed document before it's allowed anywhere near
//! the executor.

pub mod context;
pub mod rules;
pub mod test_harness;
pub mod visitor;

use crate::ast::Document;
use crate::error::RuleError;
use crate::schema::Schema;

pub use context::ValidationContext;
pub use rules::default_rules;
pub use visitor::{visit, Rule};

/// Runs `rules` over `document` against `schema`, returning every violation
/// found, sorted for deterministic output (§4.2, §8 "validation never
/// short-circuits").
pub fn validate(schema: &Schema, document: &Document, rules: Vec<Box<dyn Rule>>) -> Vec<RuleError> {
    let mut ctx = ValidationContext::new(schema, document);
    let mut rules = rules;
    visit(&mut ctx, &mut rules);
    ctx.into_errors()
}
