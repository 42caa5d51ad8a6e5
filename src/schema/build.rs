//! Schema construction and the invariants enforced at that point (§3.2,
//! §7: "schema-invariant errors throw at schema-validation time — they are
//! configuration bugs").

use std::collections::HashSet;
use std::sync::{Arc, Mutex, OnceLock};

use arcstr::ArcStr;
use derive_more::{Display, Error};
use indexmap::IndexMap;

use super::directive::{DirectiveLocation, DirectiveType};
use super::types::{Argument, NamedType, TypeRef};
use super::{introspection, scalars};

/// A schema-invariant violation detected at build time (§3.2).
///
/// These are configuration bugs in the host's type definitions, not
/// something a query document can trigger, so they're reported by throwing
/// (returning `Err`) rather than accumulating like validation errors.
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
pub enum SchemaError {
    #[display("duplicate type name `{_0}`")]
    DuplicateTypeName(#[error(not(source))] ArcStr),
    #[display("type `{_0}` has no fields")]
    EmptyFields(#[error(not(source))] ArcStr),
    #[display("union `{_0}` has no member types")]
    EmptyUnion(#[error(not(source))] ArcStr),
    #[display("enum `{_0}` has no values")]
    EmptyEnum(#[error(not(source))] ArcStr),
    #[display("enum `{_0}` has duplicate or reserved value `{_1}`")]
    InvalidEnumValue(#[error(not(source))] ArcStr, ArcStr),
    #[display("input object `{_0}` has no fields")]
    EmptyInputObject(#[error(not(source))] ArcStr),
    #[display("input object `{_0}` has a non-nullable circular reference with no escape")]
    InputObjectCycle(#[error(not(source))] ArcStr),
    #[display("union `{_0}` member `{_1}` is not an object type")]
    NonObjectUnionMember(#[error(not(source))] ArcStr, ArcStr),
    #[display("duplicate union member `{_1}` in `{_0}`")]
    DuplicateUnionMember(#[error(not(source))] ArcStr, ArcStr),
    #[display("type `{_0}` is missing interface field `{_2}` required by `{_1}`")]
    MissingInterfaceField(#[error(not(source))] ArcStr, ArcStr, ArcStr),
    #[display(
        "type `{_0}` field `{_2}` is not a valid subtype of interface `{_1}`'s field"
    )]
    IncompatibleInterfaceFieldType(#[error(not(source))] ArcStr, ArcStr, ArcStr),
    #[display("type `{_0}` field `{_2}` argument `{_3}` doesn't match interface `{_1}`")]
    IncompatibleInterfaceArgument(#[error(not(source))] ArcStr, ArcStr, ArcStr, ArcStr),
    #[display(
        "type `{_0}` field `{_2}` declares extra required argument `{_3}` not on interface `{_1}`"
    )]
    ExtraRequiredArgument(#[error(not(source))] ArcStr, ArcStr, ArcStr, ArcStr),
    #[display("type `{_0}` does not implement transitive interface `{_1}`")]
    MissingTransitiveInterface(#[error(not(source))] ArcStr, ArcStr),
    #[display("unknown type `{_0}` referenced by `{_1}`")]
    UnknownType(#[error(not(source))] ArcStr, ArcStr),
    #[display("duplicate argument name `{_1}` on `{_0}`")]
    DuplicateArgumentName(#[error(not(source))] ArcStr, ArcStr),
    #[display("directive `@{_0}` used at disallowed location {_1}")]
    DirectiveLocationNotAllowed(#[error(not(source))] ArcStr, ArcStr),
    #[display("non-repeatable directive `@{_0}` used more than once at {_1}")]
    NonRepeatableDirectiveRepeated(#[error(not(source))] ArcStr, ArcStr),
    #[display("the query root type must be an object type")]
    QueryRootNotObject,
    #[display("type loader returned a different instance for `{_0}` on a second call")]
    UnstableTypeLoader(#[error(not(source))] ArcStr),
}

/// A function resolving a type by name, used when the host prefers lazy,
/// on-demand type construction over an upfront transitive scan (§9).
pub type TypeLoader = Arc<dyn Fn(&str) -> Option<NamedType> + Send + Sync>;

/// An immutable, already-validated GraphQL schema (§3.2, §3.4: "schemas are
/// built once and treated as immutable").
pub struct Schema {
    pub(crate) query_type: ArcStr,
    pub(crate) mutation_type: Option<ArcStr>,
    pub(crate) subscription_type: Option<ArcStr>,
    pub(crate) directives: IndexMap<ArcStr, DirectiveType>,
    scanned_types: IndexMap<ArcStr, Arc<NamedType>>,
    type_loader: Option<TypeLoader>,
    loader_cache: Mutex<IndexMap<ArcStr, Arc<NamedType>>>,
    type_map_latch: OnceLock<()>,
}

impl Schema {
    pub fn query_type_name(&self) -> &str {
        &self.query_type
    }

    pub fn mutation_type_name(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    pub fn subscription_type_name(&self) -> Option<&str> {
        self.subscription_type.as_deref()
    }

    pub fn directive(&self, name: &str) -> Option<&DirectiveType> {
        self.directives.get(name)
    }

    pub fn directives(&self) -> impl Iterator<Item = &DirectiveType> {
        self.directives.values()
    }

    /// Forces full resolution of every statically-known type. Only
    /// meaningful when no [`TypeLoader`] is in play; introspection calls
    /// this once to guarantee `__schema.types` is exhaustive (§9).
    pub fn force_full_resolution(&self) {
        self.type_map_latch.get_or_init(|| ());
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.get_type(name).is_some()
    }

    /// Looks up a type by name, going through the [`TypeLoader`] if one was
    /// configured, otherwise consulting the upfront transitive scan (§9).
    pub fn get_type(&self, name: &str) -> Option<Arc<NamedType>> {
        if let Some(found) = self.scanned_types.get(name) {
            return Some(found.clone());
        }
        let loader = self.type_loader.as_ref()?;
        let mut cache = self.loader_cache.lock().expect("loader cache poisoned");
        if let Some(cached) = cache.get(name) {
            return Some(cached.clone());
        }
        let ty = Arc::new(loader(name)?);
        cache.insert(name.into(), ty.clone());
        Some(ty)
    }

    /// All eagerly-known types: the standard scalars, introspection types,
    /// and everything reachable from the root types and directive argument
    /// types, excluding anything only reachable through a [`TypeLoader`]
    /// (those are discovered on demand and not enumerable up front).
    pub fn known_types(&self) -> impl Iterator<Item = &NamedType> {
        self.scanned_types.values().map(|t| t.as_ref())
    }

    /// The object types implementing interface `interface_name` (§4.4's
    /// `PossibleTypes`, also used by validation rules 10/11). Forces full
    /// resolution first, since an object reachable only through a
    /// [`TypeLoader`] would otherwise be invisible to this scan.
    pub fn possible_type_names(&self, interface_name: &str) -> Vec<ArcStr> {
        self.force_full_resolution();
        self.known_types()
            .filter_map(|t| match t {
                NamedType::Object(o) if o.interfaces.iter().any(|i| i.as_str() == interface_name) => {
                    Some(o.name.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Whether `type_name` is among the concrete types `abstract_ty` (an
    /// interface or union) could resolve to at runtime.
    pub fn is_possible_type(&self, abstract_ty: &NamedType, type_name: &str) -> bool {
        match abstract_ty {
            NamedType::Interface(i) => {
                self.possible_type_names(&i.name).iter().any(|n| n.as_str() == type_name)
            }
            NamedType::Union(u) => u.members.iter().any(|m| m.as_str() == type_name),
            _ => false,
        }
    }
}

/// Builds a [`Schema`], enforcing the invariants of §3.2 before returning
/// it.
pub struct SchemaBuilder {
    query: Option<NamedType>,
    mutation: Option<NamedType>,
    subscription: Option<NamedType>,
    additional_types: Vec<NamedType>,
    directives: IndexMap<ArcStr, DirectiveType>,
    type_loader: Option<TypeLoader>,
}

impl SchemaBuilder {
    pub fn new(query: NamedType) -> Self {
        let mut directives = IndexMap::new();
        directives.insert("skip".into(), default_skip_directive());
        directives.insert("include".into(), default_include_directive());
        directives.insert("deprecated".into(), default_deprecated_directive());
        SchemaBuilder {
            query: Some(query),
            mutation: None,
            subscription: None,
            additional_types: Vec::new(),
            directives,
            type_loader: None,
        }
    }

    pub fn mutation(mut self, ty: NamedType) -> Self {
        self.mutation = Some(ty);
        self
    }

    pub fn subscription(mut self, ty: NamedType) -> Self {
        self.subscription = Some(ty);
        self
    }

    pub fn additional_type(mut self, ty: NamedType) -> Self {
        self.additional_types.push(ty);
        self
    }

    pub fn directive(mut self, directive: DirectiveType) -> Self {
        self.directives.insert(directive.name.clone(), directive);
        self
    }

    pub fn type_loader(mut self, loader: TypeLoader) -> Self {
        self.type_loader = Some(loader);
        self
    }

    pub fn finish(self) -> Result<Schema, SchemaError> {
        let query = self.query.expect("query root is required");
        if !matches!(query, NamedType::Object(_)) {
            return Err(SchemaError::QueryRootNotObject);
        }
        let query = introspection::with_meta_fields(query);

        let mut types: IndexMap<ArcStr, NamedType> = IndexMap::new();
        for builtin in [
            scalars::int(),
            scalars::float(),
            scalars::string(),
            scalars::boolean(),
            scalars::id(),
        ] {
            types.insert(builtin.name().into(), builtin);
        }
        for introspection_type in introspection::types() {
            types.insert(introspection_type.name().into(), introspection_type);
        }

        insert_unique(&mut types, query.clone())?;
        if let Some(m) = &self.mutation {
            insert_unique(&mut types, m.clone())?;
        }
        if let Some(s) = &self.subscription {
            insert_unique(&mut types, s.clone())?;
        }
        for extra in &self.additional_types {
            insert_unique(&mut types, extra.clone())?;
        }

        // Transitively collect every type reachable from fields, arguments,
        // interfaces, and union members, registering placeholders as we go
        // so cycles terminate.
        let mut frontier: Vec<ArcStr> = types.keys().cloned().collect();
        while let Some(name) = frontier.pop() {
            let referenced = referenced_type_names(types.get(&name).expect("just inserted"));
            for r in referenced {
                if !types.contains_key(&r) {
                    // Types not supplied directly are only reachable when a
                    // loader is configured; otherwise this is an error,
                    // caught below once every declared type has been seen.
                    frontier_missing(&mut types, &self.type_loader, &r, &mut frontier)?;
                }
            }
        }

        for directive in self.directives.values() {
            for arg in &directive.arguments {
                let name = arg.arg_type.innermost_name();
                if !types.contains_key(&name) && self.type_loader.is_none() {
                    return Err(SchemaError::UnknownType(name, directive.name.clone()));
                }
            }
        }

        validate_invariants(&types)?;

        let query_name = query.name().into();
        let mutation_name = self.mutation.as_ref().map(|t| t.name().into());
        let subscription_name = self.subscription.as_ref().map(|t| t.name().into());

        Ok(Schema {
            query_type: query_name,
            mutation_type: mutation_name,
            subscription_type: subscription_name,
            directives: self.directives,
            scanned_types: types.into_iter().map(|(k, v)| (k, Arc::new(v))).collect(),
            type_loader: self.type_loader,
            loader_cache: Mutex::new(IndexMap::new()),
            type_map_latch: OnceLock::new(),
        })
    }
}

fn frontier_missing(
    types: &mut IndexMap<ArcStr, NamedType>,
    loader: &Option<TypeLoader>,
    name: &ArcStr,
    frontier: &mut Vec<ArcStr>,
) -> Result<(), SchemaError> {
    match loader {
        Some(load) => {
            if let Some(ty) = load(name) {
                frontier.push(name.clone());
                types.insert(name.clone(), ty);
            }
            Ok(())
        }
        None => Err(SchemaError::UnknownType(name.clone(), name.clone())),
    }
}

fn insert_unique(
    types: &mut IndexMap<ArcStr, NamedType>,
    ty: NamedType,
) -> Result<(), SchemaError> {
    let name: ArcStr = ty.name().into();
    if types.contains_key(&name) {
        return Err(SchemaError::DuplicateTypeName(name));
    }
    types.insert(name, ty);
    Ok(())
}

fn referenced_type_names(ty: &NamedType) -> Vec<ArcStr> {
    let mut out = Vec::new();
    let push_field = |out: &mut Vec<ArcStr>, f: &super::types::Field| {
        out.push(f.field_type.innermost_name());
        for a in &f.arguments {
            out.push(a.arg_type.innermost_name());
        }
    };
    match ty {
        NamedType::Object(o) => {
            for f in &o.fields {
                push_field(&mut out, f);
            }
            out.extend(o.interfaces.iter().cloned());
        }
        NamedType::Interface(i) => {
            for f in &i.fields {
                push_field(&mut out, f);
            }
            out.extend(i.interfaces.iter().cloned());
        }
        NamedType::Union(u) => out.extend(u.members.iter().cloned()),
        NamedType::InputObject(io) => {
            for f in &io.input_fields {
                out.push(f.arg_type.innermost_name());
            }
        }
        NamedType::Scalar(_) | NamedType::Enum(_) => {}
    }
    out
}

fn argument_names_unique(
    type_name: &ArcStr,
    field_name: &ArcStr,
    args: &[Argument],
) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for a in args {
        if !seen.insert(a.name.clone()) {
            return Err(SchemaError::DuplicateArgumentName(
                format!("{type_name}.{field_name}").into(),
                a.name.clone(),
            ));
        }
    }
    Ok(())
}

fn validate_invariants(types: &IndexMap<ArcStr, NamedType>) -> Result<(), SchemaError> {
    for ty in types.values() {
        match ty {
            NamedType::Object(o) => {
                if o.fields.is_empty() {
                    return Err(SchemaError::EmptyFields(o.name.clone()));
                }
                for f in &o.fields {
                    check_output_field(&o.name, f, types)?;
                }
                for iface_name in &o.interfaces {
                    check_implements(&o.name, &o.fields, iface_name, types)?;
                }
                check_transitive_interfaces(&o.name, &o.interfaces, types)?;
            }
            NamedType::Interface(i) => {
                if i.fields.is_empty() {
                    return Err(SchemaError::EmptyFields(i.name.clone()));
                }
                for f in &i.fields {
                    check_output_field(&i.name, f, types)?;
                }
                for iface_name in &i.interfaces {
                    check_implements(&i.name, &i.fields, iface_name, types)?;
                }
            }
            NamedType::Union(u) => {
                if u.members.is_empty() {
                    return Err(SchemaError::EmptyUnion(u.name.clone()));
                }
                let mut seen = HashSet::new();
                for m in &u.members {
                    if !seen.insert(m.clone()) {
                        return Err(SchemaError::DuplicateUnionMember(u.name.clone(), m.clone()));
                    }
                    match types.get(m) {
                        Some(NamedType::Object(_)) => {}
                        _ => {
                            return Err(SchemaError::NonObjectUnionMember(
                                u.name.clone(),
                                m.clone(),
                            ))
                        }
                    }
                }
            }
            NamedType::Enum(e) => {
                if e.values.is_empty() {
                    return Err(SchemaError::EmptyEnum(e.name.clone()));
                }
                let mut seen = HashSet::new();
                for v in &e.values {
                    let reserved = matches!(v.name.as_str(), "true" | "false" | "null");
                    if reserved || !seen.insert(v.name.clone()) {
                        return Err(SchemaError::InvalidEnumValue(e.name.clone(), v.name.clone()));
                    }
                }
            }
            NamedType::InputObject(io) => {
                if io.input_fields.is_empty() {
                    return Err(SchemaError::EmptyInputObject(io.name.clone()));
                }
                for f in &io.input_fields {
                    if !types
                        .get(&f.arg_type.innermost_name())
                        .is_some_and(NamedType::is_input_type)
                    {
                        return Err(SchemaError::UnknownType(
                            f.arg_type.innermost_name(),
                            io.name.clone(),
                        ));
                    }
                }
                check_no_required_cycle(io, types, &mut HashSet::new())?;
            }
            NamedType::Scalar(_) => {}
        }
    }
    Ok(())
}

fn check_output_field(
    type_name: &ArcStr,
    f: &super::types::Field,
    types: &IndexMap<ArcStr, NamedType>,
) -> Result<(), SchemaError> {
    let out_name = f.field_type.innermost_name();
    if !types.get(&out_name).is_some_and(NamedType::is_output_type) {
        return Err(SchemaError::UnknownType(out_name, type_name.clone()));
    }
    argument_names_unique(type_name, &f.name, &f.arguments)?;
    for a in &f.arguments {
        let in_name = a.arg_type.innermost_name();
        if !types.get(&in_name).is_some_and(NamedType::is_input_type) {
            return Err(SchemaError::UnknownType(in_name, type_name.clone()));
        }
    }
    Ok(())
}

fn check_implements(
    type_name: &ArcStr,
    fields: &[super::types::Field],
    iface_name: &ArcStr,
    types: &IndexMap<ArcStr, NamedType>,
) -> Result<(), SchemaError> {
    let Some(NamedType::Interface(iface)) = types.get(iface_name) else {
        return Err(SchemaError::UnknownType(iface_name.clone(), type_name.clone()));
    };
    for iface_field in &iface.fields {
        let Some(impl_field) = fields.iter().find(|f| f.name == iface_field.name) else {
            return Err(SchemaError::MissingInterfaceField(
                type_name.clone(),
                iface_name.clone(),
                iface_field.name.clone(),
            ));
        };
        if !is_covariant(&impl_field.field_type, &iface_field.field_type, types) {
            return Err(SchemaError::IncompatibleInterfaceFieldType(
                type_name.clone(),
                iface_name.clone(),
                iface_field.name.clone(),
            ));
        }
        for iface_arg in &iface_field.arguments {
            let Some(impl_arg) = impl_field.arguments.iter().find(|a| a.name == iface_arg.name)
            else {
                return Err(SchemaError::IncompatibleInterfaceArgument(
                    type_name.clone(),
                    iface_name.clone(),
                    iface_field.name.clone(),
                    iface_arg.name.clone(),
                ));
            };
            if !type_ref_eq(&impl_arg.arg_type, &iface_arg.arg_type) {
                return Err(SchemaError::IncompatibleInterfaceArgument(
                    type_name.clone(),
                    iface_name.clone(),
                    iface_field.name.clone(),
                    iface_arg.name.clone(),
                ));
            }
        }
        for extra in &impl_field.arguments {
            let on_interface = iface_field.arguments.iter().any(|a| a.name == extra.name);
            if !on_interface && extra.arg_type.is_non_null() && extra.default_value.is_none() {
                return Err(SchemaError::ExtraRequiredArgument(
                    type_name.clone(),
                    iface_name.clone(),
                    iface_field.name.clone(),
                    extra.name.clone(),
                ));
            }
        }
    }
    Ok(())
}

fn check_transitive_interfaces(
    type_name: &ArcStr,
    interfaces: &[ArcStr],
    types: &IndexMap<ArcStr, NamedType>,
) -> Result<(), SchemaError> {
    for iface_name in interfaces {
        if let Some(NamedType::Interface(iface)) = types.get(iface_name) {
            for transitive in &iface.interfaces {
                if !interfaces.contains(transitive) {
                    return Err(SchemaError::MissingTransitiveInterface(
                        type_name.clone(),
                        transitive.clone(),
                    ));
                }
            }
        }
    }
    Ok(())
}

/// An implementer's field type is a valid subtype of the interface's
/// declared type: identical, a more specific object type for an abstract
/// interface/union field, or the non-null wrapper of a valid subtype.
fn is_covariant(
    sub: &TypeRef,
    sup: &TypeRef,
    types: &IndexMap<ArcStr, NamedType>,
) -> bool {
    match (sub, sup) {
        (TypeRef::NonNull(a), TypeRef::NonNull(b)) => is_covariant(a, b, types),
        (TypeRef::NonNull(a), b) => is_covariant(a, b, types),
        (TypeRef::List(a), TypeRef::List(b)) => is_covariant(a, b, types),
        (TypeRef::Named(_), TypeRef::Named(_)) => {
            let sub_name = sub.innermost_name();
            let sup_name = sup.innermost_name();
            if sub_name == sup_name {
                return true;
            }
            match types.get(&sup_name) {
                Some(NamedType::Union(u)) => u.members.contains(&sub_name),
                Some(NamedType::Interface(_)) => {
                    matches!(types.get(&sub_name), Some(NamedType::Object(o)) if o.interfaces.contains(&sup_name))
                }
                _ => false,
            }
        }
        _ => false,
    }
}

fn type_ref_eq(a: &TypeRef, b: &TypeRef) -> bool {
    a.to_ast_type() == b.to_ast_type()
}

fn check_no_required_cycle(
    io: &super::types::InputObjectType,
    types: &IndexMap<ArcStr, NamedType>,
    visiting: &mut HashSet<ArcStr>,
) -> Result<(), SchemaError> {
    if !visiting.insert(io.name.clone()) {
        return Err(SchemaError::InputObjectCycle(io.name.clone()));
    }
    for f in &io.input_fields {
        if f.arg_type.is_non_null() && f.default_value.is_none() {
            if let Some(NamedType::InputObject(nested)) = types.get(&f.arg_type.innermost_name()) {
                check_no_required_cycle(nested, types, visiting)?;
            }
        }
    }
    visiting.remove(&io.name);
    Ok(())
}

fn default_skip_directive() -> DirectiveType {
    DirectiveType {
        name: "skip".into(),
        description: Some("Directs the executor to skip this field or fragment when the `if` argument is true.".into()),
        locations: vec![
            DirectiveLocation::Field,
            DirectiveLocation::FragmentSpread,
            DirectiveLocation::InlineFragment,
        ],
        arguments: vec![Argument {
            name: "if".into(),
            description: Some("Skipped when true.".into()),
            arg_type: TypeRef::named(scalars::boolean()).non_null(),
            default_value: None,
        }],
        is_repeatable: false,
    }
}

fn default_include_directive() -> DirectiveType {
    DirectiveType {
        name: "include".into(),
        description: Some("Directs the executor to include this field or fragment only when the `if` argument is true.".into()),
        locations: vec![
            DirectiveLocation::Field,
            DirectiveLocation::FragmentSpread,
            DirectiveLocation::InlineFragment,
        ],
        arguments: vec![Argument {
            name: "if".into(),
            description: Some("Included when true.".into()),
            arg_type: TypeRef::named(scalars::boolean()).non_null(),
            default_value: None,
        }],
        is_repeatable: false,
    }
}

fn default_deprecated_directive() -> DirectiveType {
    DirectiveType {
        name: "deprecated".into(),
        description: Some("Marks an element of a GraphQL schema as no longer supported.".into()),
        locations: vec![
            DirectiveLocation::FieldDefinition,
            DirectiveLocation::ArgumentDefinition,
            DirectiveLocation::InputFieldDefinition,
            DirectiveLocation::Enum,
            DirectiveLocation::EnumValue,
        ],
        arguments: vec![Argument {
            name: "reason".into(),
            description: Some("Explains why this element was deprecated.".into()),
            arg_type: TypeRef::named(scalars::string()),
            default_value: Some(crate::value::Value::String("No longer supported".into())),
        }],
        is_repeatable: false,
    }
}
