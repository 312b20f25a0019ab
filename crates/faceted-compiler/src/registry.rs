// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! The facet registry.
//!
//! Built once per compilation pass from every facet declaration before any
//! resolver runs, then handed around by shared reference and never mutated.
//! Nesting references can point at definitions declared anywhere in the
//! unit, which is why the registry must exist before per-definition
//! resolution starts.

use std::collections::BTreeMap;

use crate::{diagnostics::Diagnostics, parse::FacetDecl, schema::SourceSchema};

/// Read-only mapping from source type name to the facet that projects it.
#[derive(Debug, Default)]
pub struct FacetRegistry {
    by_source: BTreeMap<String, String>,
}

impl FacetRegistry {
    /// Build the registry from all declarations of a unit.
    ///
    /// Declarations whose source type the schema does not know are left
    /// out — they fail extraction on their own. When several facets share
    /// one source type the first declared wins for nested resolution and
    /// an informational diagnostic records the tie.
    #[must_use]
    pub fn build(
        decls: &[FacetDecl],
        schema: &SourceSchema,
        diags: &mut Diagnostics,
    ) -> Self {
        let mut by_source = BTreeMap::new();
        for decl in decls {
            if schema.get(&decl.args.source).is_none() {
                continue;
            }
            match by_source.entry(decl.args.source.clone()) {
                std::collections::btree_map::Entry::Vacant(entry) => {
                    entry.insert(decl.name_str());
                }
                std::collections::btree_map::Entry::Occupied(entry) => {
                    diags.info(
                        "FCT004",
                        decl.name_str(),
                        format!(
                            "`{}` already projects `{}`; it stays the nested facet for that type",
                            entry.get(),
                            decl.args.source
                        ),
                        Some(decl.span),
                    );
                }
            }
        }
        Self { by_source }
    }

    /// Facet registered for a source type, if any.
    #[must_use]
    pub fn facet_for(&self, source: &str) -> Option<&str> {
        self.by_source.get(source).map(String::as_str)
    }

    /// Number of registered source types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_source.len()
    }

    /// `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;
    use crate::parse::FacetDecl;

    fn decl(item: syn::ItemStruct) -> FacetDecl {
        FacetDecl::from_item(&item).unwrap()
    }

    #[test]
    fn first_declaration_wins_per_source() {
        let person: syn::ItemStruct = parse_quote! {
            pub struct Person {
                pub name: String,
            }
        };
        let schema = SourceSchema::build(&[person], &[]);
        let decls = vec![
            decl(parse_quote! {
                #[facet(source = "Person")]
                pub struct PersonView;
            }),
            decl(parse_quote! {
                #[facet(source = "Person")]
                pub struct PersonSummary;
            }),
        ];

        let mut diags = Diagnostics::new();
        let registry = FacetRegistry::build(&decls, &schema, &mut diags);

        assert_eq!(registry.facet_for("Person"), Some("PersonView"));
        assert_eq!(registry.len(), 1);
        assert!(diags.items().iter().any(|item| item.code == "FCT004"));
        assert!(!diags.has_errors());
    }

    #[test]
    fn unknown_sources_stay_unregistered() {
        let schema = SourceSchema::build(&[], &[]);
        let decls = vec![decl(parse_quote! {
            #[facet(source = "Ghost")]
            pub struct GhostView;
        })];

        let mut diags = Diagnostics::new();
        let registry = FacetRegistry::build(&decls, &schema, &mut diags);
        assert!(registry.is_empty());
    }
}
