// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Reverse transform emission.
//!
//! `into_source` rebuilds the source type from a facet. Every source
//! member must be constructed: reversible facet members copy back, encoded
//! enums parse back (the one fallible spot — an out-of-range value is a
//! [`ReverseError`], not a panic), nested facets recurse into their own
//! reverse transforms, and everything else is synthesized with
//! `Default::default()`. Path and expression members are not reversible by
//! construction.

use std::collections::BTreeMap;

use proc_macro2::TokenStream;
use quote::quote;

use crate::{
    diagnostics::Diagnostics,
    plan::{Accessor, EnumRepr, FacetDef, MemberDescriptor},
    schema::{CollectionKind, EnumDef, PointerKind, SourceSchema, TypeShape},
};

use super::ident;

/// Emit `into_source` for one definition, when enabled.
#[must_use]
pub fn generate(
    def: &FacetDef,
    all: &BTreeMap<String, FacetDef>,
    schema: &SourceSchema,
    diags: &mut Diagnostics,
) -> TokenStream {
    if !def.generate_reverse || def.is_flatten {
        return TokenStream::new();
    }

    let source_ty = ident(&def.source);
    let mut assigns = Vec::new();
    for (source_member, _) in schema.effective_members(&def.source) {
        let target = ident(&source_member.name);
        let value = member_value(def, all, schema, &source_member, diags);
        assigns.push(quote!(#target: #value));
    }

    let doc = format!("Reverse transform back into a `{}`.", def.source);
    let synthesized: Vec<&str> = def
        .excluded_required
        .iter()
        .map(|member| member.name.as_str())
        .collect();
    let synth_doc = if synthesized.is_empty() {
        TokenStream::new()
    } else {
        let line = format!(
            "Members synthesized with defaults: `{}`.",
            synthesized.join("`, `")
        );
        quote!(#[doc = ""] #[doc = #line])
    };

    quote! {
        #[doc = #doc]
        ///
        /// # Errors
        ///
        /// Fails when an encoded enum member holds an out-of-range value.
        #synth_doc
        pub fn into_source(&self) -> Result<#source_ty, ::faceted_core::ReverseError> {
            Ok(#source_ty {
                #(#assigns),*
            })
        }
    }
}

/// Value expression rebuilding one source member.
fn member_value(
    def: &FacetDef,
    all: &BTreeMap<String, FacetDef>,
    schema: &SourceSchema,
    source_member: &crate::schema::SourceMember,
    diags: &mut Diagnostics,
) -> TokenStream {
    let facet_member = def.members.iter().enumerate().find(|(_, member)| {
        member.reversible
            && matches!(&member.accessor, Accessor::Member(name) if name == &source_member.name)
    });
    let Some((index, member)) = facet_member else {
        return quote!(Default::default());
    };
    let access = super::facet_access(def, index);

    if let Some(repr) = member.enum_repr {
        return match schema.enum_def(&member.shape.base) {
            Some(enum_def) => enum_parse(enum_def, repr, &access, member.shape.nullable),
            None => quote!(Default::default()),
        };
    }

    if let Some(nested) = &member.nested {
        let reversible_nested = all
            .get(&nested.facet)
            .is_some_and(|nested_def| nested_def.generate_reverse && !nested_def.is_flatten);
        if !reversible_nested {
            diags.warning(
                "FCT013",
                format!("{}.{}", def.name_str(), member.name),
                format!(
                    "nested facet `{}` has no reverse transform; `{}` is synthesized",
                    nested.facet, source_member.name
                ),
                Some(def.span),
            );
            return quote!(Default::default());
        }
        return nested_value(member, &access, &member.shape);
    }

    if member.guarded {
        // Facet stores Option<T> over a non-nullable source member.
        return quote!(#access.clone().unwrap_or_default());
    }
    quote!(#access.clone())
}

/// Parse an encoded enum member back to its variants.
fn enum_parse(
    def: &EnumDef,
    repr: EnumRepr,
    access: &TokenStream,
    nullable: bool,
) -> TokenStream {
    let enum_ty = ident(&def.name);
    let ty_name = &def.name;

    let body = |scrutinee: TokenStream| -> TokenStream {
        match repr {
            EnumRepr::Str => {
                let arms = def.variants.iter().map(|variant| {
                    let text = &variant.name;
                    let variant = ident(&variant.name);
                    quote!(#text => #enum_ty::#variant)
                });
                quote! {
                    match #scrutinee.as_str() {
                        #(#arms,)*
                        other => {
                            return Err(::faceted_core::ReverseError::enum_value(#ty_name, other));
                        }
                    }
                }
            }
            EnumRepr::Int => {
                let arms = def.variants.iter().zip(def.discriminants()).map(
                    |(variant, discriminant)| {
                        let discriminant = i32::try_from(discriminant).unwrap_or_default();
                        let variant = ident(&variant.name);
                        quote!(#discriminant => #enum_ty::#variant)
                    },
                );
                quote! {
                    match #scrutinee {
                        #(#arms,)*
                        other => {
                            return Err(::faceted_core::ReverseError::enum_value(#ty_name, other));
                        }
                    }
                }
            }
        }
    };

    if nullable {
        let parsed = body(quote!(value));
        quote! {
            match #access.as_ref() {
                Some(value) => Some(#parsed),
                None => None,
            }
        }
    } else {
        body(quote!(#access))
    }
}

/// Rebuild a nested source member through the nested facet's reverse.
fn nested_value(
    member: &MemberDescriptor,
    access: &TokenStream,
    shape: &TypeShape,
) -> TokenStream {
    let rebuilt = wrap_pointer(quote!(value.into_source()?), shape);

    if let Some(collection) = shape.collection {
        let collect_ty = match collection {
            CollectionKind::Vec => quote!(::std::vec::Vec<_>),
            CollectionKind::BoxedSlice => quote!(::std::boxed::Box<[_]>),
        };
        let mapped = wrap_pointer(quote!(value.into_source()?), shape);
        let collected = quote! {
            items
                .iter()
                .map(|value| Ok(#mapped))
                .collect::<Result<#collect_ty, ::faceted_core::ReverseError>>()?
        };
        return if shape.nullable {
            quote! {
                match #access.as_ref() {
                    Some(items) => Some(#collected),
                    None => None,
                }
            }
        } else {
            quote! {
                {
                    let items = &#access;
                    #collected
                }
            }
        };
    }

    if shape.nullable {
        quote! {
            match #access.as_ref() {
                Some(value) => Some(#rebuilt),
                None => None,
            }
        }
    } else {
        // Source member is non-nullable but the facet stores an Option
        // (truncation needs a null state); fall back to a default when the
        // facet holds nothing.
        quote! {
            match #access.as_ref() {
                Some(value) => #rebuilt,
                None => Default::default(),
            }
        }
    }
}

fn wrap_pointer(inner: TokenStream, shape: &TypeShape) -> TokenStream {
    let inner = if shape.cell {
        quote!(::core::cell::RefCell::new(#inner))
    } else {
        inner
    };
    match shape.pointer {
        Some(PointerKind::Box) => quote!(::std::boxed::Box::new(#inner)),
        Some(PointerKind::Rc) => quote!(::std::rc::Rc::new(#inner)),
        Some(PointerKind::Arc) => quote!(::std::sync::Arc::new(#inner)),
        None => inner,
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;
    use crate::{parse::FacetDecl, registry::FacetRegistry};

    fn resolved(item: syn::ItemStruct, extra: Vec<syn::ItemStruct>) -> (FacetDef, SourceSchema) {
        let status: syn::ItemEnum = parse_quote! {
            pub enum Status {
                Pending,
                Completed,
            }
        };
        let person: syn::ItemStruct = parse_quote! {
            pub struct Person {
                pub first_name: String,
                pub last_name: String,
                pub status: Status,
            }
        };
        let mut sources = vec![person];
        sources.extend(extra);
        let schema = SourceSchema::build(&sources, &[status]);
        let decl = FacetDecl::from_item(&item).unwrap();
        let mut diags = Diagnostics::new();
        let registry = FacetRegistry::build(std::slice::from_ref(&decl), &schema, &mut diags);
        let def = crate::resolve_facet(&decl, &schema, &registry, &mut diags).unwrap();
        (def, schema)
    }

    #[test]
    fn reverse_copies_renamed_members_back() {
        let (def, schema) = resolved(
            parse_quote! {
                #[facet(source = "Person", reverse)]
                #[rename(name, from = "first_name")]
                pub struct PersonView;
            },
            vec![],
        );
        let mut diags = Diagnostics::new();
        let text = generate(&def, &BTreeMap::new(), &schema, &mut diags).to_string();

        assert!(text.contains("into_source"));
        assert!(text.contains("first_name : self . name . clone ()"));
    }

    #[test]
    fn excluded_members_fall_back_to_default() {
        let (def, schema) = resolved(
            parse_quote! {
                #[facet(source = "Person", exclude(last_name), reverse)]
                pub struct PersonView;
            },
            vec![],
        );
        let mut diags = Diagnostics::new();
        let text = generate(&def, &BTreeMap::new(), &schema, &mut diags).to_string();

        assert!(text.contains("last_name : Default :: default ()"));
        assert!(text.contains("Members synthesized with defaults"));
    }

    #[test]
    fn encoded_enum_parses_with_error_arm() {
        let (def, schema) = resolved(
            parse_quote! {
                #[facet(source = "Person", reverse)]
                #[enum_repr(status, repr = "string")]
                pub struct PersonView;
            },
            vec![],
        );
        let mut diags = Diagnostics::new();
        let text = generate(&def, &BTreeMap::new(), &schema, &mut diags).to_string();

        assert!(text.contains("ReverseError :: enum_value"));
        assert!(text.contains("\"Pending\" => Status :: Pending"));
    }

    #[test]
    fn reverse_is_omitted_unless_requested() {
        let (def, schema) = resolved(
            parse_quote! {
                #[facet(source = "Person")]
                pub struct PersonView;
            },
            vec![],
        );
        let mut diags = Diagnostics::new();
        assert!(generate(&def, &BTreeMap::new(), &schema, &mut diags).is_empty());
    }
}
