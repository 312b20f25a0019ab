// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Flatten-level directive parsing.
//!
//! ```rust,ignore
//! #[flatten(source = "Person", max_depth = 3, naming = "leaf_only", exclude("address.zip"))]
//! pub struct PersonFlat;
//! ```

use darling::FromMeta;
use proc_macro2::Span;
use syn::{Ident, ItemStruct, Visibility};

use super::{StringList, default_max_depth};
use crate::plan::NamingStrategy;

/// Options of `#[flatten(..)]`, parsed by darling.
#[derive(Debug, FromMeta)]
pub struct FlattenArgs {
    /// Source type name.
    pub source: String,

    /// Flattening depth limit; `0` means unlimited up to the absolute
    /// ceiling.
    #[darling(default = "default_max_depth")]
    pub max_depth: usize,

    /// Leaf naming strategy.
    #[darling(default)]
    pub naming: NamingStrategy,

    /// Dotted paths excluding a leaf or a whole branch subtree.
    #[darling(default)]
    pub exclude: StringList,

    /// Opt non-`pub` source fields into traversal.
    #[darling(default)]
    pub include_fields: bool,
}

/// One parsed `#[flatten(..)]` declaration.
#[derive(Debug)]
pub struct FlattenDecl {
    /// Declared flat type name.
    pub name: Ident,
    /// Declared visibility.
    pub vis: Visibility,
    /// Options.
    pub args: FlattenArgs,
    /// Declaration span.
    pub span: Span,
}

impl FlattenDecl {
    /// Parse a flatten declaration from its unit struct.
    ///
    /// # Errors
    ///
    /// Non-unit struct bodies and malformed `#[flatten(..)]` options.
    pub fn from_item(item: &ItemStruct) -> darling::Result<Self> {
        if !matches!(item.fields, syn::Fields::Unit) {
            return Err(darling::Error::custom(
                "flatten declarations take no fields; leaves come from the source type",
            )
            .with_span(&item.ident));
        }

        let attr = item
            .attrs
            .iter()
            .find(|attr| attr.path().is_ident("flatten"))
            .ok_or_else(|| darling::Error::custom("missing #[flatten(..)]"))?;
        let meta = darling::ast::NestedMeta::parse_meta_list(
            attr.meta.require_list().map_err(darling::Error::from)?.tokens.clone(),
        )?;
        let args = FlattenArgs::from_list(&meta)?;

        Ok(Self {
            name: item.ident.clone(),
            vis: item.vis.clone(),
            args,
            span: item.ident.span(),
        })
    }

    /// Flat type name as a string.
    #[must_use]
    pub fn name_str(&self) -> String {
        self.name.to_string()
    }
}
