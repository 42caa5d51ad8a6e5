//! Deterministic SDL printing (§4.5, §6.5).
//!
//! Printed in type-map iteration order with the standard scalars and
//! introspection types filtered out, the way a server exposing its schema
//! to developer tooling wants a stable, diffable document rather than one
//! that reorders itself between runs.

use std::fmt::Write as _;

use arcstr::ArcStr;

use crate::value::Value;

use super::build::Schema;
use super::directive::DirectiveType;
use super::types::{Argument, EnumType, Field, InputObjectType, InterfaceType, NamedType, ObjectType, ScalarType, UnionType};

const BUILTIN_SCALARS: &[&str] = &["Int", "Float", "String", "Boolean", "ID"];

fn is_builtin_type(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name) || name.starts_with("__")
}

/// Prints the full schema document: every user-defined type and directive,
/// skipping the standard scalars and introspection machinery that every
/// schema carries implicitly.
pub fn print_schema(schema: &Schema) -> String {
    schema.force_full_resolution();
    let mut out = String::new();
    print_schema_definition(schema, &mut out);

    for directive in schema.directives() {
        if is_builtin_directive(&directive.name) {
            continue;
        }
        print_directive(directive, &mut out);
        out.push('\n');
    }

    for ty in schema.known_types() {
        if is_builtin_type(ty.name()) {
            continue;
        }
        print_named_type(ty, &mut out);
        out.push('\n');
    }

    out
}

fn is_builtin_directive(name: &str) -> bool {
    matches!(name, "skip" | "include" | "deprecated")
}

fn print_schema_definition(schema: &Schema, out: &mut String) {
    let needs_definition = schema.query_type_name() != "Query"
        || schema.mutation_type_name().is_some()
        || schema.subscription_type_name().is_some();
    if !needs_definition {
        return;
    }
    let _ = writeln!(out, "schema {{");
    let _ = writeln!(out, "  query: {}", schema.query_type_name());
    if let Some(m) = schema.mutation_type_name() {
        let _ = writeln!(out, "  mutation: {m}");
    }
    if let Some(s) = schema.subscription_type_name() {
        let _ = writeln!(out, "  subscription: {s}");
    }
    let _ = writeln!(out, "}}\n");
}

/// Renders a single AST/coerced literal value the way it would appear in
/// SDL (a default value, an argument literal).
pub fn print_value(v: &Value) -> String {
    match v {
        Value::Null => "null".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => format!("{:?}", s.as_str()),
        Value::List(items) => {
            format!("[{}]", items.iter().map(print_value).collect::<Vec<_>>().join(", "))
        }
        Value::Object(map) => {
            let fields = map
                .iter()
                .map(|(k, v)| format!("{k}: {}", print_value(v)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{{fields}}}")
        }
        Value::Opaque(_) => "<opaque>".to_string(),
        Value::Deferred(_) => "<pending>".to_string(),
    }
}

fn print_description(description: Option<&str>, indent: &str, out: &mut String) {
    if let Some(d) = description {
        if d.contains('\n') {
            let _ = writeln!(out, "{indent}\"\"\"\n{indent}{d}\n{indent}\"\"\"");
        } else {
            let _ = writeln!(out, "{indent}\"{d}\"");
        }
    }
}

fn print_deprecated(status: &super::types::DeprecationStatus, out: &mut String) {
    if let Some(reason) = status.reason() {
        let _ = write!(out, " @deprecated(reason: {:?})", reason);
    } else if status.is_deprecated() {
        out.push_str(" @deprecated");
    }
}

fn print_arguments(args: &[Argument], out: &mut String) {
    if args.is_empty() {
        return;
    }
    let rendered: Vec<String> = args
        .iter()
        .map(|a| {
            let mut s = format!("{}: {}", a.name, a.arg_type.to_ast_type());
            if let Some(d) = &a.default_value {
                let _ = write!(s, " = {}", print_value(d));
            }
            s
        })
        .collect();
    let _ = write!(out, "({})", rendered.join(", "));
}

fn print_fields(fields: &[Field], out: &mut String) {
    for f in fields {
        if f.is_builtin() {
            continue;
        }
        print_description(f.description.as_deref(), "  ", out);
        let _ = write!(out, "  {}", f.name);
        print_arguments(&f.arguments, out);
        let _ = write!(out, ": {}", f.field_type.to_ast_type());
        print_deprecated(&f.deprecation_status, out);
        out.push('\n');
    }
}

fn print_named_type(ty: &NamedType, out: &mut String) {
    match ty {
        NamedType::Scalar(s) => print_scalar(s, out),
        NamedType::Object(o) => print_object(o, out),
        NamedType::Interface(i) => print_interface(i, out),
        NamedType::Union(u) => print_union(u, out),
        NamedType::Enum(e) => print_enum(e, out),
        NamedType::InputObject(io) => print_input_object(io, out),
    }
}

fn print_scalar(s: &ScalarType, out: &mut String) {
    print_description(s.description.as_deref(), "", out);
    let _ = write!(out, "scalar {}", s.name);
    if let Some(url) = &s.specified_by_url {
        let _ = write!(out, " @specifiedBy(url: {:?})", url.as_str());
    }
    out.push('\n');
}

fn print_object(o: &ObjectType, out: &mut String) {
    print_description(o.description.as_deref(), "", out);
    let _ = write!(out, "type {}", o.name);
    print_implements(&o.interfaces, out);
    let _ = writeln!(out, " {{");
    print_fields(&o.fields, out);
    out.push_str("}\n");
}

fn print_interface(i: &InterfaceType, out: &mut String) {
    print_description(i.description.as_deref(), "", out);
    let _ = write!(out, "interface {}", i.name);
    print_implements(&i.interfaces, out);
    let _ = writeln!(out, " {{");
    print_fields(&i.fields, out);
    out.push_str("}\n");
}

fn print_implements(interfaces: &[ArcStr], out: &mut String) {
    if !interfaces.is_empty() {
        let _ = write!(
            out,
            " implements {}",
            interfaces.iter().map(ArcStr::as_str).collect::<Vec<_>>().join(" & ")
        );
    }
}

fn print_union(u: &UnionType, out: &mut String) {
    print_description(u.description.as_deref(), "", out);
    let _ = writeln!(
        out,
        "union {} = {}",
        u.name,
        u.members.iter().map(ArcStr::as_str).collect::<Vec<_>>().join(" | ")
    );
}

fn print_enum(e: &EnumType, out: &mut String) {
    print_description(e.description.as_deref(), "", out);
    let _ = writeln!(out, "enum {} {{", e.name);
    for v in &e.values {
        print_description(v.description.as_deref(), "  ", out);
        let _ = write!(out, "  {}", v.name);
        print_deprecated(&v.deprecation_status, out);
        out.push('\n');
    }
    out.push_str("}\n");
}

fn print_input_object(io: &InputObjectType, out: &mut String) {
    print_description(io.description.as_deref(), "", out);
    let _ = writeln!(out, "input {} {{", io.name);
    for f in &io.input_fields {
        print_description(f.description.as_deref(), "  ", out);
        let _ = write!(out, "  {}: {}", f.name, f.arg_type.to_ast_type());
        if let Some(d) = &f.default_value {
            let _ = write!(out, " = {}", print_value(d));
        }
        out.push('\n');
    }
    out.push_str("}\n");
}

fn print_directive(d: &DirectiveType, out: &mut String) {
    print_description(d.description.as_deref(), "", out);
    let _ = write!(out, "directive @{}", d.name);
    print_arguments(&d.arguments, out);
    if d.is_repeatable {
        out.push_str(" repeatable");
    }
    let locations = d.locations.iter().map(|l| l.name()).collect::<Vec<_>>().join(" | ");
    let _ = write!(out, " on {locations}");
    out.push('\n');
}
