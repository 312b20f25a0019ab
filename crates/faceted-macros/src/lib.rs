// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! # faceted-macros
//!
//! Procedural front end for the `faceted` schema-projection compiler.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use faceted_macros::facets;
//!
//! facets! {
//!     pub struct Person {
//!         pub first_name: String,
//!         pub last_name: String,
//!         pub status: Status,
//!         pub completed_at: Option<String>,
//!     }
//!
//!     #[derive(Clone, PartialEq)]
//!     pub enum Status {
//!         Pending,
//!         Completed,
//!     }
//!
//!     #[facet(source = "Person", exclude(last_name), reverse)]
//!     #[rename(name, from = "first_name")]
//!     #[when(completed_at, predicate = "status == Status::Completed")]
//!     pub struct PersonView;
//!
//!     #[flatten(source = "Person")]
//!     pub struct PersonFlat;
//! }
//! ```
//!
//! Generates `PersonView` / `PersonFlat` with, per facet: the member
//! declarations, `from_source` / `from_source_guarded` eager constructors,
//! a `projection()` expression-form transform for query planners, and
//! `into_source` when `reverse` is set.
//!
//! All facet definitions of one `facets!` block share a registry, so a
//! member whose type has its own facet declared anywhere in the block is
//! emitted as that nested facet.
//!
//! Generated types derive `serde::Serialize` / `serde::Deserialize` and
//! reference `faceted_core`; consumers need both crates as dependencies.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, quote, quote_spanned};
use syn::{
    Ident, Item, ItemStruct,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Declare source types and facet/flatten definitions in one compilation
/// unit.
///
/// See the [crate documentation](crate) for the directive schema.
#[proc_macro]
pub fn facets(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as FacetsInput);
    expand(input.items).into()
}

struct FacetsInput {
    items: Vec<Item>,
}

impl Parse for FacetsInput {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let mut items = Vec::new();
        while !input.is_empty() {
            items.push(input.parse()?);
        }
        Ok(Self { items })
    }
}

fn expand(items: Vec<Item>) -> TokenStream2 {
    let (unit, passthrough) = match faceted_compiler::parse::partition(items) {
        Ok(split) => split,
        Err(err) => return err.write_errors(),
    };

    // Source types are re-emitted with their `#[extends(..)]` chains
    // materialized into real fields; enums and passthrough items go out
    // untouched.
    let sources = materialize_sources(&unit.sources);
    let enums = unit.enums.iter().map(ToTokens::to_token_stream);
    let passthrough = passthrough.iter().map(ToTokens::to_token_stream);

    let output = faceted_compiler::compile(&unit);
    let generated = output.units.iter().map(|unit| unit.tokens.clone());
    let errors = output
        .diagnostics
        .items()
        .iter()
        .filter(|diagnostic| diagnostic.severity == faceted_compiler::Severity::Error)
        .map(|diagnostic| {
            let message = format!(
                "{} [{}]: {}",
                diagnostic.location, diagnostic.code, diagnostic.message
            );
            match diagnostic.span {
                Some(span) => quote_spanned!(span=> ::core::compile_error!(#message);),
                None => quote!(::core::compile_error!(#message);),
            }
        });

    quote! {
        #(#sources)*
        #(#enums)*
        #(#passthrough)*
        #(#generated)*
        #(#errors)*
    }
}

/// Rewrite source structs so `#[extends(Base)]` chains become real
/// fields: base members first, a derived member shadowing its base
/// counterpart at the base position.
fn materialize_sources(sources: &[ItemStruct]) -> Vec<TokenStream2> {
    sources
        .iter()
        .map(|item| {
            let mut flat = item.clone();
            flat.attrs.retain(|attr| !attr.path().is_ident("extends"));

            if let syn::Fields::Named(named) = &mut flat.fields {
                let mut fields: Vec<syn::Field> = Vec::new();
                for ancestor in chain(sources, item) {
                    if let syn::Fields::Named(ancestor_fields) = &ancestor.fields {
                        for field in &ancestor_fields.named {
                            if let Some(existing) = fields
                                .iter_mut()
                                .find(|existing| existing.ident == field.ident)
                            {
                                *existing = field.clone();
                            } else {
                                fields.push(field.clone());
                            }
                        }
                    }
                }
                named.named = fields.into_iter().collect();
            }

            flat.to_token_stream()
        })
        .collect()
}

/// Base-to-derived `#[extends(..)]` chain of `item`, cycle-safe.
fn chain<'a>(sources: &'a [ItemStruct], item: &'a ItemStruct) -> Vec<&'a ItemStruct> {
    let mut chain = vec![item];
    let mut seen = vec![item.ident.to_string()];
    let mut current = item;
    while let Some(base) = extends_base(current) {
        let Some(next) = sources.iter().find(|candidate| candidate.ident == base) else {
            break;
        };
        if seen.contains(&next.ident.to_string()) {
            break;
        }
        seen.push(next.ident.to_string());
        chain.push(next);
        current = next;
    }
    chain.reverse();
    chain
}

fn extends_base(item: &ItemStruct) -> Option<Ident> {
    item.attrs
        .iter()
        .find(|attr| attr.path().is_ident("extends"))
        .and_then(|attr| attr.parse_args::<Ident>().ok())
}
