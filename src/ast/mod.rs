//! The query/schema syntax tree produced by [`parse`](super::ast::parse::parse)
//! and walked by the validator and executor.
//!
//! Nodes are owned (no lifetime parameter) and cheap to clone: string data is
//! stored behind [`ArcStr`], so cloning a subtree only bumps reference
//! counts. This mirrors the reference implementation's choice of `ArcStr`
//! for names, generalized here to the whole tree since we no longer borrow
//! from a single source buffer (graphql-parser owns that).

pub mod parse;
pub mod visitor;

use std::fmt;

use arcstr::ArcStr;
use indexmap::IndexMap;

pub use self::parse::{parse, SyntaxError};
pub use self::visitor::{visit, VisitAction, Visitor};

/// A position within a source document.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SourcePosition {
    /// Byte offset from the start of the source.
    pub offset: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Start/end span of an AST node in its source document.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Location {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

/// A type reference as written in a document (`Int`, `[Int!]`, `ID!`, ...).
///
/// Carries no semantic information and might refer to types that don't
/// exist; resolving it against a schema is the job of
/// [`schema::TypeRef::resolve`](crate::schema::TypeRef).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Type {
    Named(ArcStr),
    List(Box<Type>),
    NonNull(Box<Type>),
}

impl Type {
    /// The innermost named type, stripping all wrapping.
    pub fn innermost_name(&self) -> &str {
        match self {
            Type::Named(name) => name,
            Type::List(t) | Type::NonNull(t) => t.innermost_name(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(name) => write!(f, "{name}"),
            Type::List(t) => write!(f, "[{t}]"),
            Type::NonNull(t) => write!(f, "{t}!"),
        }
    }
}

/// A literal input value as written in a document. Variables are resolved
/// separately, at coercion time, against the operation's variable map.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Variable(ArcStr),
    Int(i64),
    Float(f64),
    String(ArcStr),
    Boolean(bool),
    Null,
    Enum(ArcStr),
    List(Vec<Spanning<Value>>),
    Object(IndexMap<ArcStr, Spanning<Value>>),
}

/// A node plus the source span it came from.
#[derive(Clone, Debug)]
pub struct Spanning<T> {
    pub item: T,
    pub location: Location,
}

impl<T> Spanning<T> {
    pub fn new(item: T, location: Location) -> Self {
        Spanning { item, location }
    }

    pub fn unlocated(item: T) -> Self {
        Spanning { item, location: Location::default() }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanning<U> {
        Spanning { item: f(self.item), location: self.location }
    }
}

impl<T: PartialEq> PartialEq for Spanning<T> {
    fn eq(&self, other: &Self) -> bool {
        self.item == other.item
    }
}

#[derive(Clone, Debug)]
pub struct Argument {
    pub name: Spanning<ArcStr>,
    pub value: Spanning<Value>,
}

#[derive(Clone, Debug)]
pub struct Directive {
    pub name: Spanning<ArcStr>,
    pub arguments: Vec<Argument>,
    pub location: Location,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationType::Query => "query",
            OperationType::Mutation => "mutation",
            OperationType::Subscription => "subscription",
        })
    }
}

#[derive(Clone, Debug)]
pub struct VariableDefinition {
    pub name: Spanning<ArcStr>,
    pub var_type: Spanning<Type>,
    pub default_value: Option<Spanning<Value>>,
    pub directives: Vec<Directive>,
}

#[derive(Clone, Debug)]
pub struct Field {
    pub alias: Option<Spanning<ArcStr>>,
    pub name: Spanning<ArcStr>,
    pub arguments: Vec<Argument>,
    pub directives: Vec<Directive>,
    pub selection_set: Vec<Selection>,
    pub location: Location,
}

impl Field {
    /// The key this field's result is stored under: its alias, or its name.
    pub fn response_key(&self) -> &ArcStr {
        self.alias.as_ref().map(|a| &a.item).unwrap_or(&self.name.item)
    }
}

#[derive(Clone, Debug)]
pub struct FragmentSpread {
    pub name: Spanning<ArcStr>,
    pub directives: Vec<Directive>,
    pub location: Location,
}

#[derive(Clone, Debug)]
pub struct InlineFragment {
    pub type_condition: Option<Spanning<ArcStr>>,
    pub directives: Vec<Directive>,
    pub selection_set: Vec<Selection>,
    pub location: Location,
}

#[derive(Clone, Debug)]
pub enum Selection {
    Field(Spanning<Field>),
    FragmentSpread(Spanning<FragmentSpread>),
    InlineFragment(Spanning<InlineFragment>),
}

#[derive(Clone, Debug)]
pub struct Operation {
    pub operation_type: OperationType,
    pub name: Option<Spanning<ArcStr>>,
    pub variable_definitions: Vec<VariableDefinition>,
    pub directives: Vec<Directive>,
    pub selection_set: Vec<Selection>,
    pub location: Location,
}

#[derive(Clone, Debug)]
pub struct Fragment {
    pub name: Spanning<ArcStr>,
    pub type_condition: Spanning<ArcStr>,
    pub directives: Vec<Directive>,
    pub selection_set: Vec<Selection>,
    pub location: Location,
}

/// A single definition within a [`Document`].
///
/// Only operation and fragment definitions are *executable*; the others
/// exist so that [`rules::executable_definitions_only`] has something to
/// reject and so a document parsed from a schema-language source can still
/// be represented uniformly, even though schema-language parsing itself is
/// out of scope for this crate (§1).
#[derive(Clone, Debug)]
pub enum Definition {
    Operation(Spanning<Operation>),
    Fragment(Spanning<Fragment>),
    NonExecutable(Spanning<ArcStr>),
}

/// A fully parsed query document: the root of the AST.
#[derive(Clone, Debug, Default)]
pub struct Document {
    pub definitions: Vec<Definition>,
}

impl Document {
    pub fn operations(&self) -> impl Iterator<Item = &Spanning<Operation>> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Operation(op) => Some(op),
            _ => None,
        })
    }

    pub fn fragments(&self) -> impl Iterator<Item = &Spanning<Fragment>> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Fragment(f) => Some(f),
            _ => None,
        })
    }
}
