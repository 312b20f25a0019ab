// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Resolved member plans.
//!
//! Extraction, directive resolution, and nested-graph resolution all refine
//! the same [`MemberDescriptor`] list; the dual emitter consumes the final
//! [`FacetDef`] without looking back at directives or syntax. Output and
//! member kinds are tagged variants matched exhaustively at emission time.

use darling::FromMeta;
use proc_macro2::Span;
use syn::{Ident, Type, Visibility};

use crate::schema::{MemberKind, PointerKind, TypeShape};

/// Shape of the emitted facet type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputKind {
    /// Named-field struct deriving `Debug`/`Clone`.
    Struct,
    /// Named-field struct additionally deriving `PartialEq` (value
    /// semantics); the default.
    #[default]
    Record,
    /// Tuple struct; members stay positional.
    Tuple,
}

impl FromMeta for OutputKind {
    fn from_string(value: &str) -> darling::Result<Self> {
        match value.to_lowercase().as_str() {
            "struct" => Ok(Self::Struct),
            "record" => Ok(Self::Record),
            "tuple" => Ok(Self::Tuple),
            _ => Err(darling::Error::unknown_value(value)),
        }
    }
}

/// Facet-side encoding of an enum member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumRepr {
    /// Variant name as `String`.
    Str,
    /// Discriminant as `i32`.
    Int,
}

/// Naming strategy for flattened leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingStrategy {
    /// Concatenate the member path (`address_street`); collision-free by
    /// construction.
    #[default]
    Prefix,
    /// Innermost member name only; collisions get numeric suffixes in
    /// first-seen traversal order.
    LeafOnly,
}

impl FromMeta for NamingStrategy {
    fn from_string(value: &str) -> darling::Result<Self> {
        match value.to_lowercase().as_str() {
            "prefix" => Ok(Self::Prefix),
            "leaf_only" | "leafonly" => Ok(Self::LeafOnly),
            _ => Err(darling::Error::unknown_value(value)),
        }
    }
}

/// One step of a dotted access path.
#[derive(Debug, Clone)]
pub struct PathStep {
    /// Member name read at this step.
    pub name: String,
    /// Step is `Option`-wrapped and must be null-guarded.
    pub nullable: bool,
    /// Pointer wrapper crossed at this step.
    pub pointer: Option<PointerKind>,
}

/// How the eager transform reads a member off the source instance.
#[derive(Debug, Clone)]
pub enum Accessor {
    /// Direct member read, possibly under a different name than the facet
    /// member (rename).
    Member(String),
    /// Dotted path into nested source types; every nullable step is
    /// guarded.
    Path(Vec<PathStep>),
    /// Raw directive expression, requalified by the token rewriter at
    /// emission.
    Expression(String),
}

/// A nested-facet link resolved against the registry.
#[derive(Debug, Clone)]
pub struct NestedFacet {
    /// Facet type replacing the member's source type.
    pub facet: String,
    /// The matched nested source type.
    pub source: String,
}

/// Fully resolved plan for one emitted member.
#[derive(Debug, Clone)]
pub struct MemberDescriptor {
    /// Emitted member name.
    pub name: String,
    /// Emitted member type.
    pub emitted_ty: Type,
    /// Source-side shape backing this member.
    pub shape: TypeShape,
    /// Source read strategy.
    pub accessor: Accessor,
    /// Property/field classification of the backing member.
    pub kind: MemberKind,
    /// Backing member came from an `#[extends(..)]` base.
    pub inherited: bool,
    /// Base type is a value type (primitive, well-known, enum).
    pub is_value_type: bool,
    /// Nested facet link; orthogonal to `shape.collection` — a collection
    /// of nested facets has both.
    pub nested: Option<NestedFacet>,
    /// Raw conditional predicates, AND-combined.
    pub conditions: Vec<String>,
    /// Literal used when the combined condition is false.
    pub default_literal: Option<String>,
    /// Enum representation override.
    pub enum_repr: Option<EnumRepr>,
    /// Participates in the reverse transform.
    pub reversible: bool,
    /// Participates in the expression-form transform.
    pub include_in_projection: bool,
    /// Access crosses a nullable step, so the emitted type is
    /// `Option`-wrapped even if the leaf is not.
    pub guarded: bool,
    /// Doc lines copied from the source member.
    pub docs: Vec<String>,
}

impl MemberDescriptor {
    /// Plan a plain copied member backing a direct source read.
    #[must_use]
    pub fn direct(
        name: impl Into<String>,
        shape: TypeShape,
        kind: MemberKind,
        inherited: bool,
        is_value_type: bool,
        docs: Vec<String>,
    ) -> Self {
        let name = name.into();
        Self {
            emitted_ty: shape.ty.clone(),
            accessor: Accessor::Member(name.clone()),
            name,
            shape,
            kind,
            inherited,
            is_value_type,
            nested: None,
            conditions: Vec::new(),
            default_literal: None,
            enum_repr: None,
            reversible: true,
            include_in_projection: true,
            guarded: false,
            docs,
        }
    }
}

/// Emitted type for a guarded access: `Option`-wrapped when the access
/// crosses a nullable step, never doubly wrapped.
#[must_use]
pub(crate) fn guarded_emitted_ty(leaf: &TypeShape, wrap: bool) -> Type {
    if !wrap {
        return leaf.ty.clone();
    }
    let inner = if leaf.nullable {
        crate::schema::option_inner(&leaf.ty).unwrap_or_else(|| leaf.ty.clone())
    } else {
        leaf.ty.clone()
    };
    syn::parse_quote!(Option<#inner>)
}

/// A source member excluded from the facet but required to rebuild the
/// source type in reverse.
#[derive(Debug, Clone)]
pub struct ExcludedRequired {
    /// Source member name.
    pub name: String,
    /// Source member type.
    pub ty: Type,
}

/// Emission-ready facet definition.
#[derive(Debug, Clone)]
pub struct FacetDef {
    /// Facet type name.
    pub name: Ident,
    /// Visibility of the emitted type.
    pub vis: Visibility,
    /// Source type name.
    pub source: String,
    /// Output kind; matched exhaustively by the emitter.
    pub output_kind: OutputKind,
    /// Resolved members, in emission order.
    pub members: Vec<MemberDescriptor>,
    /// Configured depth limit; `0` means unlimited up to the ceiling.
    pub max_depth: usize,
    /// Track reference identity at run time to break object cycles.
    pub preserve_references: bool,
    /// Emit `into_source`.
    pub generate_reverse: bool,
    /// Source members needing synthesized defaults in reverse.
    pub excluded_required: Vec<ExcludedRequired>,
    /// Definition came from `#[flatten(..)]`; no nesting, no reverse, no
    /// guarded constructor.
    pub is_flatten: bool,
    /// Declaration span.
    pub span: Span,
}

impl FacetDef {
    /// Configured depth clamped to the absolute ceiling.
    #[must_use]
    pub fn effective_depth(&self) -> usize {
        faceted_core::effective_depth(self.max_depth)
    }

    /// Facet name as a string.
    #[must_use]
    pub fn name_str(&self) -> String {
        self.name.to_string()
    }

    /// Find a member by emitted name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|member| member.name == name)
    }
}
