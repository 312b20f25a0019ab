// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Facet-level directive parsing.
//!
//! A facet is declared on a unit struct:
//!
//! ```rust,ignore
//! #[facet(source = "Person", exclude(password_hash), max_depth = 2, reverse)]
//! #[rename(display_name, from = "first_name")]
//! #[when(completed_at, predicate = "status == Status::Completed")]
//! pub struct PersonView;
//! ```
//!
//! The struct body stays empty — members are derived from the source type,
//! never declared on the target.

use darling::{FromMeta, util::PathList};
use proc_macro2::Span;
use syn::{Ident, ItemStruct, Visibility};

use super::{
    default_max_depth, default_true,
    member::{
        ConditionalDirective, EnumReprDirective, RenameDirective, parse_conditional,
        parse_enum_repr, parse_rename,
    },
};
use crate::plan::OutputKind;

/// Options of `#[facet(..)]`, parsed by darling.
#[derive(Debug, FromMeta)]
pub struct FacetArgs {
    /// Source type name.
    pub source: String,

    /// Members to keep; mutually exclusive with `exclude`.
    #[darling(default)]
    pub include: Option<PathList>,

    /// Members to drop; mutually exclusive with `include`.
    #[darling(default)]
    pub exclude: Option<PathList>,

    /// Nested-expansion depth limit; `0` means unlimited up to the
    /// absolute ceiling.
    #[darling(default = "default_max_depth")]
    pub max_depth: usize,

    /// Track reference identity at run time to break object cycles.
    #[darling(default = "default_true")]
    pub preserve_references: bool,

    /// Opt non-`pub` source fields into extraction.
    #[darling(default)]
    pub include_fields: bool,

    /// Generate `into_source`.
    #[darling(default)]
    pub reverse: bool,

    /// Output kind of the emitted type.
    #[darling(default)]
    pub kind: OutputKind,
}

/// One parsed `#[facet(..)]` declaration with its member directives.
#[derive(Debug)]
pub struct FacetDecl {
    /// Declared facet name.
    pub name: Ident,
    /// Declared visibility, propagated to the emitted type.
    pub vis: Visibility,
    /// Facet-level options.
    pub args: FacetArgs,
    /// `#[rename(..)]` directives.
    pub renames: Vec<RenameDirective>,
    /// `#[when(..)]` directives.
    pub conditionals: Vec<ConditionalDirective>,
    /// `#[enum_repr(..)]` directives.
    pub enum_reprs: Vec<EnumReprDirective>,
    /// Declaration span.
    pub span: Span,
}

impl FacetDecl {
    /// Parse a facet declaration from its unit struct.
    ///
    /// # Errors
    ///
    /// Non-unit struct bodies, a missing or malformed `#[facet(..)]`
    /// attribute, and malformed member directives.
    pub fn from_item(item: &ItemStruct) -> darling::Result<Self> {
        if !matches!(item.fields, syn::Fields::Unit) {
            return Err(darling::Error::custom(
                "facet declarations take no fields; members come from the source type",
            )
            .with_span(&item.ident));
        }

        let attr = item
            .attrs
            .iter()
            .find(|attr| attr.path().is_ident("facet"))
            .ok_or_else(|| darling::Error::custom("missing #[facet(..)]"))?;
        let meta = darling::ast::NestedMeta::parse_meta_list(
            attr.meta.require_list().map_err(darling::Error::from)?.tokens.clone(),
        )?;
        let args = FacetArgs::from_list(&meta)?;

        let mut renames = Vec::new();
        let mut conditionals = Vec::new();
        let mut enum_reprs = Vec::new();
        for attr in &item.attrs {
            if attr.path().is_ident("rename") {
                renames.push(parse_rename(attr).map_err(darling::Error::from)?);
            } else if attr.path().is_ident("when") {
                conditionals.push(parse_conditional(attr).map_err(darling::Error::from)?);
            } else if attr.path().is_ident("enum_repr") {
                enum_reprs.push(parse_enum_repr(attr).map_err(darling::Error::from)?);
            }
        }

        Ok(Self {
            name: item.ident.clone(),
            vis: item.vis.clone(),
            args,
            renames,
            conditionals,
            enum_reprs,
            span: item.ident.span(),
        })
    }

    /// Facet name as a string.
    #[must_use]
    pub fn name_str(&self) -> String {
        self.name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    #[test]
    fn parses_full_option_set() {
        let item: ItemStruct = parse_quote! {
            #[facet(
                source = "Person",
                exclude(password_hash, internal_notes),
                max_depth = 2,
                preserve_references = false,
                include_fields,
                reverse,
                kind = "struct"
            )]
            pub struct PersonView;
        };

        let decl = FacetDecl::from_item(&item).unwrap();
        assert_eq!(decl.args.source, "Person");
        assert_eq!(decl.args.max_depth, 2);
        assert!(!decl.args.preserve_references);
        assert!(decl.args.include_fields);
        assert!(decl.args.reverse);
        assert_eq!(decl.args.kind, OutputKind::Struct);
        let excluded = decl.args.exclude.as_ref().unwrap();
        assert_eq!(excluded.len(), 2);
    }

    #[test]
    fn defaults_match_directive_schema() {
        let item: ItemStruct = parse_quote! {
            #[facet(source = "Person")]
            pub struct PersonView;
        };

        let decl = FacetDecl::from_item(&item).unwrap();
        assert_eq!(decl.args.max_depth, 3);
        assert!(decl.args.preserve_references);
        assert!(!decl.args.reverse);
        assert_eq!(decl.args.kind, OutputKind::Record);
    }

    #[test]
    fn collects_member_directives() {
        let item: ItemStruct = parse_quote! {
            #[facet(source = "Person")]
            #[rename(display_name, from = "first_name")]
            #[when(completed_at, predicate = "status == Status::Completed")]
            #[enum_repr(status, repr = "string")]
            pub struct PersonView;
        };

        let decl = FacetDecl::from_item(&item).unwrap();
        assert_eq!(decl.renames.len(), 1);
        assert_eq!(decl.conditionals.len(), 1);
        assert_eq!(decl.enum_reprs.len(), 1);
    }

    #[test]
    fn rejects_struct_with_fields() {
        let item: ItemStruct = parse_quote! {
            #[facet(source = "Person")]
            pub struct PersonView {
                pub extra: u32,
            }
        };

        assert!(FacetDecl::from_item(&item).is_err());
    }
}
