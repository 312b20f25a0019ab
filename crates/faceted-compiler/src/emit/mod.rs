// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! The dual emitter.
//!
//! One resolved [`FacetDef`] becomes one [`GeneratedUnit`] containing the
//! type declaration, the eager constructors ([`eager`]), the
//! expression-form transform ([`expr`]), and the reverse transform
//! ([`reverse`]) when enabled. Both transform paths are derived from the
//! same member plan — their member-for-member agreement is the central
//! correctness property of the compiler.

mod eager;
mod expr;
mod reverse;

use std::collections::BTreeMap;

use convert_case::{Case, Casing};
use proc_macro2::TokenStream;
use quote::quote;

use crate::{
    diagnostics::Diagnostics,
    plan::{FacetDef, OutputKind},
    schema::SourceSchema,
};

/// One emitted facet: tokens for the macro path, text for build pipelines.
#[derive(Debug)]
pub struct GeneratedUnit {
    /// Facet type name.
    pub facet: String,
    /// The full generated item set.
    pub tokens: TokenStream,
}

impl GeneratedUnit {
    /// Render the unit as opaque text for file-based consumers.
    #[must_use]
    pub fn render(&self) -> String {
        self.tokens.to_string()
    }

    /// Snake-case file stem for writing the unit to disk
    /// (`PersonView` → `person_view`).
    #[must_use]
    pub fn file_stem(&self) -> String {
        self.facet.to_case(Case::Snake)
    }
}

/// Emit one facet definition.
///
/// `all` maps every resolved facet of the unit by name; the expression
/// emitter needs it to inline nested facets and the reverse emitter to
/// check that nested facets are themselves reversible.
#[must_use]
pub fn generate(
    def: &FacetDef,
    all: &BTreeMap<String, FacetDef>,
    schema: &SourceSchema,
    diags: &mut Diagnostics,
) -> GeneratedUnit {
    let declaration = declaration(def);
    let eager = eager::generate(def, schema);
    let projection = expr::generate(def, all, schema);
    let reverse = reverse::generate(def, all, schema, diags);

    let name = &def.name;
    let tokens = quote! {
        #declaration

        impl #name {
            #eager
            #projection
            #reverse
        }
    };

    GeneratedUnit {
        facet: def.name_str(),
        tokens,
    }
}

/// Emit the facet type declaration; output kinds are matched exhaustively.
fn declaration(def: &FacetDef) -> TokenStream {
    let vis = &def.vis;
    let name = &def.name;
    let doc = format!("Facet of `{}`.", def.source);

    let derives = match def.output_kind {
        OutputKind::Struct => quote! {
            #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
        },
        OutputKind::Record | OutputKind::Tuple => quote! {
            #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        },
    };

    match def.output_kind {
        OutputKind::Struct | OutputKind::Record => {
            let fields = def.members.iter().map(|member| {
                let ident = ident(&member.name);
                let ty = &member.emitted_ty;
                let docs = member.docs.iter().map(|line| quote!(#[doc = #line]));
                quote! {
                    #(#docs)*
                    pub #ident: #ty
                }
            });
            quote! {
                #[doc = #doc]
                #derives
                #vis struct #name {
                    #(#fields),*
                }
            }
        }
        OutputKind::Tuple => {
            let fields = def.members.iter().map(|member| {
                let ty = &member.emitted_ty;
                let docs = member.docs.iter().map(|line| quote!(#[doc = #line]));
                quote! {
                    #(#docs)*
                    pub #ty
                }
            });
            quote! {
                #[doc = #doc]
                #derives
                #vis struct #name(#(#fields),*);
            }
        }
    }
}

/// Member identifier at call-site hygiene.
pub(crate) fn ident(name: &str) -> syn::Ident {
    syn::Ident::new(name, proc_macro2::Span::call_site())
}

/// `self.<member>` access for the facet side, positional for tuples.
pub(crate) fn facet_access(def: &FacetDef, index: usize) -> TokenStream {
    match def.output_kind {
        OutputKind::Struct | OutputKind::Record => {
            let name = ident(&def.members[index].name);
            quote!(self.#name)
        }
        OutputKind::Tuple => {
            let index = syn::Index::from(index);
            quote!(self.#index)
        }
    }
}

/// Wrap member value expressions into a constructor body.
pub(crate) fn constructor_body(def: &FacetDef, values: &[TokenStream]) -> TokenStream {
    match def.output_kind {
        OutputKind::Struct | OutputKind::Record => {
            let assigns = def.members.iter().zip(values).map(|(member, value)| {
                let name = ident(&member.name);
                quote!(#name: #value)
            });
            quote!(Self { #(#assigns),* })
        }
        OutputKind::Tuple => quote!(Self(#(#values),*)),
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;
    use crate::{parse::FacetDecl, registry::FacetRegistry};

    fn resolved_def(item: syn::ItemStruct) -> (FacetDef, SourceSchema) {
        let person: syn::ItemStruct = parse_quote! {
            pub struct Person {
                /// Given name.
                pub first_name: String,
                pub age: u32,
            }
        };
        let schema = SourceSchema::build(&[person], &[]);
        let decl = FacetDecl::from_item(&item).unwrap();
        let mut diags = Diagnostics::new();
        let registry = FacetRegistry::build(std::slice::from_ref(&decl), &schema, &mut diags);
        let def = crate::resolve_facet(&decl, &schema, &registry, &mut diags).unwrap();
        (def, schema)
    }

    #[test]
    fn record_kind_derives_partial_eq() {
        let (def, schema) = resolved_def(parse_quote! {
            #[facet(source = "Person")]
            pub struct PersonView;
        });
        let mut diags = Diagnostics::new();
        let unit = generate(&def, &BTreeMap::new(), &schema, &mut diags);
        let text = unit.render();

        assert!(text.contains("struct PersonView"));
        assert!(text.contains("PartialEq"));
        assert!(text.contains("pub first_name : String"));
        assert!(text.contains("Given name."));
    }

    #[test]
    fn struct_kind_omits_partial_eq() {
        let (def, schema) = resolved_def(parse_quote! {
            #[facet(source = "Person", kind = "struct")]
            pub struct PersonView;
        });
        let mut diags = Diagnostics::new();
        let unit = generate(&def, &BTreeMap::new(), &schema, &mut diags);

        assert!(!unit.render().contains("PartialEq"));
    }

    #[test]
    fn tuple_kind_emits_positional_fields() {
        let (def, schema) = resolved_def(parse_quote! {
            #[facet(source = "Person", kind = "tuple")]
            pub struct PersonTuple;
        });
        let mut diags = Diagnostics::new();
        let unit = generate(&def, &BTreeMap::new(), &schema, &mut diags);
        let text = unit.render();

        assert!(text.contains("struct PersonTuple ("));
        assert!(text.contains("Self ("));
    }

    #[test]
    fn file_stem_is_snake_case() {
        let unit = GeneratedUnit {
            facet: "PersonAddressView".into(),
            tokens: TokenStream::new(),
        };
        assert_eq!(unit.file_stem(), "person_address_view");
    }
}
