// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Directive parsing.
//!
//! This is the thin authoring surface of the compiler: a compilation unit
//! is a list of `syn::Item`s where plain structs and enums declare source
//! types, `#[facet(..)]` unit structs declare facet definitions, and
//! `#[flatten(..)]` unit structs declare flatten definitions. Everything
//! here parses syntax into directive values; no resolution happens yet.

mod facet;
mod flatten;
mod member;

use darling::FromMeta;
use syn::Item;

pub use self::{
    facet::{FacetArgs, FacetDecl},
    flatten::{FlattenArgs, FlattenDecl},
    member::{ConditionalDirective, EnumReprDirective, RenameDirective},
};

/// Default `max_depth` shared by facet and flatten directives.
pub(crate) fn default_max_depth() -> usize {
    3
}

pub(crate) fn default_true() -> bool {
    true
}

/// A list of string literals, parsed from `key("a", "b")`.
///
/// Counterpart of `darling::util::PathList` for dotted-path values, which
/// are not valid `syn::Path`s.
#[derive(Debug, Clone, Default)]
pub struct StringList(pub Vec<String>);

impl FromMeta for StringList {
    fn from_list(items: &[darling::ast::NestedMeta]) -> darling::Result<Self> {
        items
            .iter()
            .map(|item| match item {
                darling::ast::NestedMeta::Lit(syn::Lit::Str(lit)) => Ok(lit.value()),
                _ => Err(darling::Error::custom("expected a string literal")),
            })
            .collect::<darling::Result<Vec<_>>>()
            .map(Self)
    }
}

/// A compilation unit split into source items and parsed declarations.
#[derive(Debug, Default)]
pub struct CompilationUnit {
    /// Source structs (everything without a facet/flatten attribute).
    pub sources: Vec<syn::ItemStruct>,
    /// Source enums.
    pub enums: Vec<syn::ItemEnum>,
    /// Parsed facet declarations.
    pub facets: Vec<FacetDecl>,
    /// Parsed flatten declarations.
    pub flattens: Vec<FlattenDecl>,
}

/// Split items into a [`CompilationUnit`] plus passthrough items the
/// compiler does not interpret (impls, uses, functions).
///
/// # Errors
///
/// Accumulates every directive syntax error across the unit into one
/// `darling::Error`, mirroring how darling reports attribute problems.
pub fn partition(items: Vec<Item>) -> darling::Result<(CompilationUnit, Vec<Item>)> {
    let mut unit = CompilationUnit::default();
    let mut passthrough = Vec::new();
    let mut errors = Vec::new();

    for item in items {
        match item {
            Item::Struct(item) if has_attr(&item, "facet") => {
                match FacetDecl::from_item(&item) {
                    Ok(decl) => unit.facets.push(decl),
                    Err(err) => errors.push(err),
                }
            }
            Item::Struct(item) if has_attr(&item, "flatten") => {
                match FlattenDecl::from_item(&item) {
                    Ok(decl) => unit.flattens.push(decl),
                    Err(err) => errors.push(err),
                }
            }
            Item::Struct(item) => unit.sources.push(item),
            Item::Enum(item) => unit.enums.push(item),
            other => passthrough.push(other),
        }
    }

    if errors.is_empty() {
        Ok((unit, passthrough))
    } else {
        Err(darling::Error::multiple(errors))
    }
}

fn has_attr(item: &syn::ItemStruct, name: &str) -> bool {
    item.attrs.iter().any(|attr| attr.path().is_ident(name))
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    #[test]
    fn partition_classifies_items() {
        let items: Vec<Item> = vec![
            parse_quote! {
                pub struct Person {
                    pub name: String,
                }
            },
            parse_quote! {
                pub enum Status {
                    Active,
                }
            },
            parse_quote! {
                #[facet(source = "Person")]
                pub struct PersonView;
            },
            parse_quote! {
                #[flatten(source = "Person")]
                pub struct PersonFlat;
            },
            parse_quote! {
                fn unrelated() {}
            },
        ];

        let (unit, passthrough) = partition(items).unwrap();
        assert_eq!(unit.sources.len(), 1);
        assert_eq!(unit.enums.len(), 1);
        assert_eq!(unit.facets.len(), 1);
        assert_eq!(unit.flattens.len(), 1);
        assert_eq!(passthrough.len(), 1);
    }

    #[test]
    fn partition_accumulates_directive_errors() {
        let items: Vec<Item> = vec![
            parse_quote! {
                #[facet]
                pub struct Broken;
            },
            parse_quote! {
                #[facet(source = "Person", max_depth = "three")]
                pub struct AlsoBroken;
            },
        ];

        assert!(partition(items).is_err());
    }
}
