//! Bridges source text to our [`Document`](super::Document) AST.
//!
//! Lexing and parsing query text is explicitly out of scope for this crate
//! (§1): that job is delegated to the `graphql-parser` crate, an external
//! collaborator also depended on elsewhere in this codebase family (the
//! sibling schema-building crate lists it as a workspace dependency). This
//! module only *converts* `graphql_parser`'s borrowed AST into our owned
//! one; no tokenizing happens here.

use arcstr::ArcStr;
use derive_more::{Display, Error};
use indexmap::IndexMap;

use super::{
    Argument, Definition, Directive, Document, Field, Fragment, FragmentSpread, InlineFragment,
    Location, Operation, OperationType, Selection, SourcePosition, Spanning, Type,
    VariableDefinition, Value,
};

/// A syntax error produced while parsing query source text.
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
#[display("syntax error: {message} at {position}")]
pub struct SyntaxError {
    pub message: String,
    pub position: SourcePosition,
}

/// Parses `source` into a [`Document`].
///
/// Delegates the actual lexing/parsing to [`graphql_parser::parse_query`].
pub fn parse(source: &str) -> Result<Document, SyntaxError> {
    let parsed = graphql_parser::parse_query::<String>(source).map_err(|err| SyntaxError {
        message: err.to_string(),
        position: SourcePosition::default(),
    })?;

    let definitions = parsed
        .definitions
        .into_iter()
        .map(convert_definition)
        .collect();

    Ok(Document { definitions })
}

fn pos(p: graphql_parser::Pos) -> SourcePosition {
    SourcePosition { offset: 0, line: p.line, column: p.column }
}

fn span(start: graphql_parser::Pos, end: graphql_parser::Pos) -> Location {
    Location { start: pos(start), end: pos(end) }
}

fn convert_definition(def: graphql_parser::query::Definition<'static, String>) -> Definition {
    use graphql_parser::query::{Definition as D, OperationDefinition as OD};
    match def {
        D::Operation(OD::SelectionSet(set)) => {
            let start = set.span.0;
            Definition::Operation(Spanning::new(
                Operation {
                    operation_type: OperationType::Query,
                    name: None,
                    variable_definitions: vec![],
                    directives: vec![],
                    selection_set: convert_selection_set(set),
                    location: span(start, start),
                },
                span(start, start),
            ))
        }
        D::Operation(OD::Query(q)) => {
            let loc = span(q.position, q.position);
            Definition::Operation(Spanning::new(
                Operation {
                    operation_type: OperationType::Query,
                    name: q.name.map(|n| Spanning::new(ArcStr::from(n), loc)),
                    variable_definitions: q
                        .variable_definitions
                        .into_iter()
                        .map(convert_variable_definition)
                        .collect(),
                    directives: q.directives.into_iter().map(convert_directive).collect(),
                    selection_set: convert_selection_set(q.selection_set),
                    location: loc,
                },
                loc,
            ))
        }
        D::Operation(OD::Mutation(m)) => {
            let loc = span(m.position, m.position);
            Definition::Operation(Spanning::new(
                Operation {
                    operation_type: OperationType::Mutation,
                    name: m.name.map(|n| Spanning::new(ArcStr::from(n), loc)),
                    variable_definitions: m
                        .variable_definitions
                        .into_iter()
                        .map(convert_variable_definition)
                        .collect(),
                    directives: m.directives.into_iter().map(convert_directive).collect(),
                    selection_set: convert_selection_set(m.selection_set),
                    location: loc,
                },
                loc,
            ))
        }
        D::Operation(OD::Subscription(s)) => {
            let loc = span(s.position, s.position);
            Definition::Operation(Spanning::new(
                Operation {
                    operation_type: OperationType::Subscription,
                    name: s.name.map(|n| Spanning::new(ArcStr::from(n), loc)),
                    variable_definitions: s
                        .variable_definitions
                        .into_iter()
                        .map(convert_variable_definition)
                        .collect(),
                    directives: s.directives.into_iter().map(convert_directive).collect(),
                    selection_set: convert_selection_set(s.selection_set),
                    location: loc,
                },
                loc,
            ))
        }
        D::Fragment(f) => {
            let loc = span(f.position, f.position);
            let graphql_parser::query::TypeCondition::On(on) = f.type_condition;
            Definition::Fragment(Spanning::new(
                Fragment {
                    name: Spanning::new(ArcStr::from(f.name), loc),
                    type_condition: Spanning::new(ArcStr::from(on), loc),
                    directives: f.directives.into_iter().map(convert_directive).collect(),
                    selection_set: convert_selection_set(f.selection_set),
                    location: loc,
                },
                loc,
            ))
        }
    }
}

fn convert_selection_set(
    set: graphql_parser::query::SelectionSet<'static, String>,
) -> Vec<Selection> {
    set.items.into_iter().map(convert_selection).collect()
}

fn convert_selection(sel: graphql_parser::query::Selection<'static, String>) -> Selection {
    use graphql_parser::query::Selection as S;
    match sel {
        S::Field(f) => {
            let loc = span(f.position, f.position);
            Selection::Field(Spanning::new(
                Field {
                    alias: f.alias.map(|a| Spanning::new(ArcStr::from(a), loc)),
                    name: Spanning::new(ArcStr::from(f.name), loc),
                    arguments: f
                        .arguments
                        .into_iter()
                        .map(|(name, value)| Argument {
                            name: Spanning::new(ArcStr::from(name), loc),
                            value: Spanning::new(convert_value(value), loc),
                        })
                        .collect(),
                    directives: f.directives.into_iter().map(convert_directive).collect(),
                    selection_set: convert_selection_set(f.selection_set),
                    location: loc,
                },
                loc,
            ))
        }
        S::FragmentSpread(s) => {
            let loc = span(s.position, s.position);
            Selection::FragmentSpread(Spanning::new(
                FragmentSpread {
                    name: Spanning::new(ArcStr::from(s.fragment_name), loc),
                    directives: s.directives.into_iter().map(convert_directive).collect(),
                    location: loc,
                },
                loc,
            ))
        }
        S::InlineFragment(i) => {
            let loc = span(i.position, i.position);
            Selection::InlineFragment(Spanning::new(
                InlineFragment {
                    type_condition: i.type_condition.map(|tc| {
                        let graphql_parser::query::TypeCondition::On(on) = tc;
                        Spanning::new(ArcStr::from(on), loc)
                    }),
                    directives: i.directives.into_iter().map(convert_directive).collect(),
                    selection_set: convert_selection_set(i.selection_set),
                    location: loc,
                },
                loc,
            ))
        }
    }
}

fn convert_directive(d: graphql_parser::query::Directive<'static, String>) -> Directive {
    let loc = span(d.position, d.position);
    Directive {
        name: Spanning::new(ArcStr::from(d.name), loc),
        arguments: d
            .arguments
            .into_iter()
            .map(|(name, value)| Argument {
                name: Spanning::new(ArcStr::from(name), loc),
                value: Spanning::new(convert_value(value), loc),
            })
            .collect(),
        location: loc,
    }
}

fn convert_variable_definition(
    v: graphql_parser::query::VariableDefinition<'static, String>,
) -> VariableDefinition {
    let loc = span(v.position, v.position);
    VariableDefinition {
        name: Spanning::new(ArcStr::from(v.name), loc),
        var_type: Spanning::new(convert_type(v.var_type), loc),
        default_value: v.default_value.map(|val| Spanning::new(convert_value(val), loc)),
        directives: vec![],
    }
}

fn convert_type(t: graphql_parser::query::Type<'static, String>) -> Type {
    use graphql_parser::query::Type as T;
    match t {
        T::NamedType(name) => Type::Named(ArcStr::from(name)),
        T::ListType(inner) => Type::List(Box::new(convert_type(*inner))),
        T::NonNullType(inner) => Type::NonNull(Box::new(convert_type(*inner))),
    }
}

fn convert_value(v: graphql_parser::query::Value<'static, String>) -> Value {
    use graphql_parser::query::Value as V;
    match v {
        V::Variable(name) => Value::Variable(ArcStr::from(name)),
        V::Int(n) => Value::Int(n.as_i64().unwrap_or_default()),
        V::Float(f) => Value::Float(f),
        V::String(s) => Value::String(ArcStr::from(s)),
        V::Boolean(b) => Value::Boolean(b),
        V::Null => Value::Null,
        V::Enum(name) => Value::Enum(ArcStr::from(name)),
        V::List(items) => {
            Value::List(items.into_iter().map(|i| Spanning::unlocated(convert_value(i))).collect())
        }
        V::Object(fields) => {
            let mut map = IndexMap::new();
            for (k, val) in fields {
                map.insert(ArcStr::from(k), Spanning::unlocated(convert_value(val)));
            }
            Value::Object(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_query() {
        let doc = parse("{ hello }").unwrap();
        assert_eq!(doc.operations().count(), 1);
    }

    #[test]
    fn parses_named_operation_with_variable() {
        let doc = parse("query Greet($name: String!) { hello(name: $name) }").unwrap();
        let op = doc.operations().next().unwrap();
        assert_eq!(op.item.name.as_ref().unwrap().item.as_str(), "Greet");
        assert_eq!(op.item.variable_definitions.len(), 1);
    }

    #[test]
    fn rejects_malformed_source() {
        assert!(parse("{ hello ").is_err());
    }
}
