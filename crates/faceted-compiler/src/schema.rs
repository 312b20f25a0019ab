// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Source-type introspection.
//!
//! The resolvers never look at raw syntax: this module turns the `struct`
//! and `enum` items of a compilation unit into a [`SourceSchema`] — ordered
//! member lists with pre-peeled type shapes, base-type links from
//! `#[extends(..)]`, and enum variant tables. Everything downstream works
//! against this model.

use std::collections::BTreeMap;

use proc_macro2::Span;
use syn::{Attribute, Fields, Ident, ItemEnum, ItemStruct, Type};

/// Collection wrapper of a member type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// `Vec<T>`
    Vec,
    /// `Box<[T]>`
    BoxedSlice,
}

/// Smart-pointer wrapper of a member type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    /// `Box<T>`
    Box,
    /// `Rc<T>`
    Rc,
    /// `Arc<T>`
    Arc,
}

/// Whether a source member is part of the projected surface by default.
///
/// Rust has no property/field split; the mapping here is visibility:
/// `pub` members are `Property` and always considered, everything else is
/// `Field` and only included when a definition opts in with
/// `include_fields`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Public field.
    Property,
    /// Non-public field.
    Field,
}

/// Pre-peeled shape of a member type.
///
/// Wrappers are recognized in one canonical order, outermost first:
/// `Option` (nullability), then `Vec`/`Box<[..]>` (collection), then
/// `Box`/`Rc`/`Arc` (pointer), then `RefCell` (interior mutability), then
/// the base type. `Option<Vec<Rc<RefCell<Node>>>>` peels fully;
/// anything stacked differently keeps its unpeeled remainder as the base.
#[derive(Debug, Clone)]
pub struct TypeShape {
    /// `Option` wrapper present.
    pub nullable: bool,
    /// Collection wrapper, if any.
    pub collection: Option<CollectionKind>,
    /// Pointer wrapper, if any.
    pub pointer: Option<PointerKind>,
    /// `RefCell` wrapper present.
    pub cell: bool,
    /// Name of the base type (`"String"`, `"Person"`).
    pub base: String,
    /// The base type itself.
    pub base_ty: Type,
    /// The full declared type.
    pub ty: Type,
}

impl TypeShape {
    /// Peel a declared type into its shape.
    #[must_use]
    pub fn of(ty: &Type) -> Self {
        let full = ty.clone();
        let mut nullable = false;
        let mut collection = None;
        let mut pointer = None;
        let mut cell = false;

        let mut current = ty.clone();
        if let Some(inner) = generic_arg(&current, "Option") {
            nullable = true;
            current = inner;
        }
        if let Some(inner) = generic_arg(&current, "Vec") {
            collection = Some(CollectionKind::Vec);
            current = inner;
        } else if let Some(elem) = boxed_slice_elem(&current) {
            collection = Some(CollectionKind::BoxedSlice);
            current = elem;
        }
        for (name, kind) in [
            ("Box", PointerKind::Box),
            ("Rc", PointerKind::Rc),
            ("Arc", PointerKind::Arc),
        ] {
            if let Some(inner) = generic_arg(&current, name) {
                pointer = Some(kind);
                current = inner;
                break;
            }
        }
        if let Some(inner) = generic_arg(&current, "RefCell") {
            cell = true;
            current = inner;
        }

        let base = type_name(&current);
        Self {
            nullable,
            collection,
            pointer,
            cell,
            base,
            base_ty: current,
            ty: full,
        }
    }

    /// `true` when the member needs no unwrapping at all.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        !self.nullable && self.collection.is_none() && self.pointer.is_none() && !self.cell
    }
}

/// Last path-segment name of a type, or its token text for non-path types.
#[must_use]
pub fn type_name(ty: &Type) -> String {
    if let Type::Path(path) = ty
        && let Some(segment) = path.path.segments.last()
    {
        return segment.ident.to_string();
    }
    quote::quote!(#ty).to_string()
}

/// Extract the single generic argument of `wrapper<T>`, matched by the last
/// path segment.
fn generic_arg(ty: &Type, wrapper: &str) -> Option<Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner.clone()),
        _ => None,
    }
}

/// Inner type of `Option<T>`, if `ty` is one.
pub(crate) fn option_inner(ty: &Type) -> Option<Type> {
    generic_arg(ty, "Option")
}

/// Element type of `Box<[T]>`.
fn boxed_slice_elem(ty: &Type) -> Option<Type> {
    let inner = generic_arg(ty, "Box")?;
    match inner {
        Type::Slice(slice) => Some(*slice.elem),
        _ => None,
    }
}

/// One introspected source member.
#[derive(Debug, Clone)]
pub struct SourceMember {
    /// Member name.
    pub name: String,
    /// Peeled type shape.
    pub shape: TypeShape,
    /// Property/field classification.
    pub kind: MemberKind,
    /// Doc comment lines, copied onto facet members.
    pub docs: Vec<String>,
}

/// One introspected source type.
#[derive(Debug, Clone)]
pub struct SourceType {
    /// Type name.
    pub name: String,
    /// Base type named by `#[extends(..)]`, if any.
    pub base: Option<String>,
    /// Declared members, in declaration order (base chain not included).
    pub members: Vec<SourceMember>,
    /// Span of the declaration.
    pub span: Span,
}

/// One enum variant.
#[derive(Debug, Clone)]
pub struct EnumVariant {
    /// Variant name.
    pub name: String,
    /// Explicit discriminant, when declared as an integer literal.
    pub discriminant: Option<i64>,
    /// Unit variant (no payload).
    pub is_unit: bool,
}

/// One introspected enum.
#[derive(Debug, Clone)]
pub struct EnumDef {
    /// Enum name.
    pub name: String,
    /// Variants in declaration order.
    pub variants: Vec<EnumVariant>,
    /// Span of the declaration.
    pub span: Span,
}

impl EnumDef {
    /// `true` when every variant is a unit variant.
    #[must_use]
    pub fn is_unit_only(&self) -> bool {
        self.variants.iter().all(|variant| variant.is_unit)
    }

    /// Effective integer discriminants, in declaration order.
    ///
    /// Mirrors the language rule: an explicit discriminant resets the
    /// counter, and following variants continue from it.
    #[must_use]
    pub fn discriminants(&self) -> Vec<i64> {
        let mut next = 0_i64;
        let mut out = Vec::with_capacity(self.variants.len());
        for variant in &self.variants {
            let value = variant.discriminant.unwrap_or(next);
            out.push(value);
            next = value + 1;
        }
        out
    }
}

/// Well-known leaf types copied as-is by the flatten resolver and treated
/// as value types everywhere.
const WELL_KNOWN_LEAVES: &[&str] = &[
    "String",
    "str",
    "Uuid",
    "DateTime",
    "NaiveDate",
    "NaiveDateTime",
    "NaiveTime",
    "Duration",
    "Decimal",
    "IpAddr",
    "PathBuf",
];

const PRIMITIVES: &[&str] = &[
    "bool", "char", "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64", "i128",
    "isize", "f32", "f64",
];

/// The Member Introspection API: every type the compilation unit declared.
///
/// Built once per pass, before any resolver runs, and read-only afterwards.
#[derive(Debug, Default)]
pub struct SourceSchema {
    types: BTreeMap<String, SourceType>,
    enums: BTreeMap<String, EnumDef>,
}

impl SourceSchema {
    /// Introspect the source items of a compilation unit.
    #[must_use]
    pub fn build(structs: &[ItemStruct], enums: &[ItemEnum]) -> Self {
        let mut schema = Self::default();
        for item in structs {
            let source = introspect_struct(item);
            schema.types.insert(source.name.clone(), source);
        }
        for item in enums {
            let def = introspect_enum(item);
            schema.enums.insert(def.name.clone(), def);
        }
        schema
    }

    /// Look up a source type by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SourceType> {
        self.types.get(name)
    }

    /// Look up an enum by name.
    #[must_use]
    pub fn enum_def(&self, name: &str) -> Option<&EnumDef> {
        self.enums.get(name)
    }

    /// `true` when `name` is a declared enum.
    #[must_use]
    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.contains_key(name)
    }

    /// Base-to-derived inheritance chain for `name`.
    ///
    /// The returned chain starts at the root base and ends at `name`
    /// itself. A cyclic `extends` chain is cut at the first repeat rather
    /// than looping.
    #[must_use]
    pub fn chain(&self, name: &str) -> Vec<&SourceType> {
        let mut chain = Vec::new();
        let mut seen = Vec::new();
        let mut current = self.get(name);
        while let Some(ty) = current {
            if seen.contains(&ty.name) {
                break;
            }
            seen.push(ty.name.clone());
            chain.push(ty);
            current = ty.base.as_deref().and_then(|base| self.get(base));
        }
        chain.reverse();
        chain
    }

    /// `true` when `name` is a primitive, well-known leaf, or declared
    /// enum — the value-type classification used by the resolvers.
    #[must_use]
    pub fn is_value_type(&self, name: &str) -> bool {
        PRIMITIVES.contains(&name) || WELL_KNOWN_LEAVES.contains(&name) || self.is_enum(name)
    }

    /// `true` when `name` is a language primitive.
    #[must_use]
    pub fn is_primitive(&self, name: &str) -> bool {
        PRIMITIVES.contains(&name)
    }

    /// Total member count of a declared struct, inheritance included.
    ///
    /// Types the schema does not know report `None`.
    #[must_use]
    pub fn member_count(&self, name: &str) -> Option<usize> {
        if !self.types.contains_key(name) {
            return None;
        }
        Some(self.effective_members(name).len())
    }

    /// Effective member list of a type: the inheritance chain walked once,
    /// base-to-derived, a derived member shadowing its base counterpart at
    /// the base position. The flag marks members that came from a base.
    #[must_use]
    pub fn effective_members(&self, name: &str) -> Vec<(SourceMember, bool)> {
        let chain = self.chain(name);
        let mut out: Vec<(SourceMember, bool)> = Vec::new();
        for (level, source_type) in chain.iter().enumerate() {
            let inherited = level + 1 < chain.len();
            for member in &source_type.members {
                if let Some(existing) =
                    out.iter_mut().find(|(existing, _)| existing.name == member.name)
                {
                    *existing = (member.clone(), inherited);
                } else {
                    out.push((member.clone(), inherited));
                }
            }
        }
        out
    }
}

fn introspect_struct(item: &ItemStruct) -> SourceType {
    let members = match &item.fields {
        Fields::Named(named) => named
            .named
            .iter()
            .map(|field| SourceMember {
                name: field
                    .ident
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                shape: TypeShape::of(&field.ty),
                kind: match field.vis {
                    syn::Visibility::Public(_) => MemberKind::Property,
                    _ => MemberKind::Field,
                },
                docs: doc_lines(&field.attrs),
            })
            .collect(),
        _ => Vec::new(),
    };

    SourceType {
        name: item.ident.to_string(),
        base: extends_base(&item.attrs),
        members,
        span: item.ident.span(),
    }
}

fn introspect_enum(item: &ItemEnum) -> EnumDef {
    let variants = item
        .variants
        .iter()
        .map(|variant| EnumVariant {
            name: variant.ident.to_string(),
            discriminant: variant.discriminant.as_ref().and_then(|(_, expr)| {
                if let syn::Expr::Lit(lit) = expr
                    && let syn::Lit::Int(int) = &lit.lit
                {
                    int.base10_parse().ok()
                } else {
                    None
                }
            }),
            is_unit: matches!(variant.fields, Fields::Unit),
        })
        .collect();

    EnumDef {
        name: item.ident.to_string(),
        variants,
        span: item.ident.span(),
    }
}

/// Read `#[extends(Base)]`.
fn extends_base(attrs: &[Attribute]) -> Option<String> {
    attrs
        .iter()
        .find(|attr| attr.path().is_ident("extends"))
        .and_then(|attr| attr.parse_args::<Ident>().ok())
        .map(|ident| ident.to_string())
}

/// Collect `#[doc = "..."]` lines.
fn doc_lines(attrs: &[Attribute]) -> Vec<String> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| {
            if let syn::Meta::NameValue(meta) = &attr.meta
                && let syn::Expr::Lit(lit) = &meta.value
                && let syn::Lit::Str(text) = &lit.lit
            {
                Some(text.value())
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    #[test]
    fn peels_option_vec_rc_refcell() {
        let ty: Type = parse_quote!(Option<Vec<Rc<RefCell<Node>>>>);
        let shape = TypeShape::of(&ty);

        assert!(shape.nullable);
        assert_eq!(shape.collection, Some(CollectionKind::Vec));
        assert_eq!(shape.pointer, Some(PointerKind::Rc));
        assert!(shape.cell);
        assert_eq!(shape.base, "Node");
    }

    #[test]
    fn peels_boxed_slice() {
        let ty: Type = parse_quote!(Box<[String]>);
        let shape = TypeShape::of(&ty);

        assert_eq!(shape.collection, Some(CollectionKind::BoxedSlice));
        assert_eq!(shape.base, "String");
        assert!(!shape.nullable);
    }

    #[test]
    fn plain_type_has_no_wrappers() {
        let ty: Type = parse_quote!(u32);
        let shape = TypeShape::of(&ty);

        assert!(shape.is_plain());
        assert_eq!(shape.base, "u32");
    }

    #[test]
    fn chain_walks_extends_base_first() {
        let base: ItemStruct = parse_quote! {
            pub struct Entity {
                pub id: u64,
            }
        };
        let derived: ItemStruct = parse_quote! {
            #[extends(Entity)]
            pub struct Person {
                pub name: String,
            }
        };
        let schema = SourceSchema::build(&[base, derived], &[]);

        let chain = schema.chain("Person");
        let names: Vec<&str> = chain.iter().map(|ty| ty.name.as_str()).collect();
        assert_eq!(names, ["Entity", "Person"]);
        assert_eq!(schema.member_count("Person"), Some(2));
    }

    #[test]
    fn cyclic_extends_terminates() {
        let a: ItemStruct = parse_quote! {
            #[extends(B)]
            pub struct A {
                pub x: u8,
            }
        };
        let b: ItemStruct = parse_quote! {
            #[extends(A)]
            pub struct B {
                pub y: u8,
            }
        };
        let schema = SourceSchema::build(&[a, b], &[]);

        assert_eq!(schema.chain("A").len(), 2);
    }

    #[test]
    fn enum_discriminants_follow_explicit_values() {
        let item: ItemEnum = parse_quote! {
            pub enum Priority {
                Low,
                Medium = 5,
                High,
            }
        };
        let schema = SourceSchema::build(&[], &[item]);
        let def = schema.enum_def("Priority").unwrap();

        assert!(def.is_unit_only());
        assert_eq!(def.discriminants(), vec![0, 5, 6]);
    }

    #[test]
    fn visibility_classifies_member_kind() {
        let item: ItemStruct = parse_quote! {
            pub struct Account {
                pub name: String,
                secret: String,
            }
        };
        let schema = SourceSchema::build(&[item], &[]);
        let account = schema.get("Account").unwrap();

        assert_eq!(account.members[0].kind, MemberKind::Property);
        assert_eq!(account.members[1].kind, MemberKind::Field);
    }
}
