// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Eager transform emission.
//!
//! Every facet gets a public entry constructor and an internal guarded
//! constructor:
//!
//! ```rust,ignore
//! pub fn from_source(source: &Person) -> Self
//! pub fn from_source_guarded(source: &Person, depth: usize, visited: &mut VisitedSet) -> Self
//! ```
//!
//! The entry constructor allocates a fresh visited set, marks the root as
//! in progress when `preserve_references` is on, and delegates. Before the
//! guarded constructor expands a nested member it increments the depth and
//! checks it against the definition's effective limit, then checks
//! reference identity; either guard failing lands in `None` (collections:
//! the element is skipped). Guards never raise.
//!
//! Flatten definitions have no nested members and therefore only the entry
//! constructor.

use proc_macro2::TokenStream;
use quote::quote;

use super::ident;
use crate::{
    plan::{Accessor, EnumRepr, FacetDef, MemberDescriptor, PathStep},
    rewrite,
    schema::{EnumDef, SourceSchema, TypeShape},
};

/// Emit the eager constructors for one definition.
#[must_use]
pub fn generate(def: &FacetDef, schema: &SourceSchema) -> TokenStream {
    let source_ty = ident(&def.source);
    let entry_doc = format!("Eagerly transform a `{}` into this facet.", def.source);

    if def.is_flatten {
        let values: Vec<TokenStream> = def
            .members
            .iter()
            .map(|member| member_value(member, def, schema))
            .collect();
        let body = super::constructor_body(def, &values);
        return quote! {
            #[doc = #entry_doc]
            pub fn from_source(source: &#source_ty) -> Self {
                #body
            }
        };
    }

    let values: Vec<TokenStream> = def
        .members
        .iter()
        .map(|member| member_value(member, def, schema))
        .collect();
    let body = super::constructor_body(def, &values);

    let mark_root = if def.preserve_references {
        quote! { visited.enter(source); }
    } else {
        TokenStream::new()
    };

    quote! {
        #[doc = #entry_doc]
        pub fn from_source(source: &#source_ty) -> Self {
            let mut visited = ::faceted_core::VisitedSet::new();
            #mark_root
            Self::from_source_guarded(source, 0, &mut visited)
        }

        /// Internal constructor carrying the recursion state.
        #[doc(hidden)]
        #[allow(unused_variables)]
        pub fn from_source_guarded(
            source: &#source_ty,
            depth: usize,
            visited: &mut ::faceted_core::VisitedSet,
        ) -> Self {
            #body
        }
    }
}

/// Value expression for one member, conditions applied last.
fn member_value(member: &MemberDescriptor, def: &FacetDef, schema: &SourceSchema) -> TokenStream {
    let value = match &member.accessor {
        Accessor::Expression(raw) => {
            let value = expression_value(raw);
            if member.guarded {
                // A nullable-forced computed member wraps its value.
                quote!(Some(#value))
            } else {
                value
            }
        }
        Accessor::Path(steps) => {
            let chain_guarded = steps[..steps.len() - 1].iter().any(|step| step.nullable);
            let value = path_value(steps, &member.shape);
            if member.guarded && !chain_guarded && !member.shape.nullable {
                // Nullable-forced path over an all-plain chain.
                quote!(Some(#value))
            } else {
                value
            }
        }
        Accessor::Member(source_name) => {
            let name = ident(source_name);
            if let Some(repr) = member.enum_repr {
                enum_value(&name, &member.shape, repr, schema)
            } else if member.nested.is_some() {
                nested_value(member, &name, def)
            } else if member.guarded {
                // Forced-nullable plain copy.
                quote!(Some(source.#name.clone()))
            } else {
                quote!(source.#name.clone())
            }
        }
    };

    if member.conditions.is_empty() {
        return value;
    }

    let combined = member
        .conditions
        .iter()
        .map(|condition| {
            let rewritten = rewrite::rewrite(condition, "source");
            match syn::parse_str::<syn::Expr>(&rewritten) {
                Ok(expr) => quote!((#expr)),
                // Unparseable predicates were already reported; emit an
                // always-false guard so the member falls back to its
                // default.
                Err(_) => quote!((false)),
            }
        })
        .reduce(|acc, predicate| quote!(#acc && #predicate))
        .unwrap_or_else(|| quote!(true));
    let default = default_value(member);
    quote! {
        if #combined { #value } else { #default }
    }
}

fn default_value(member: &MemberDescriptor) -> TokenStream {
    member
        .default_literal
        .as_deref()
        .and_then(|literal| syn::parse_str::<syn::Expr>(literal).ok())
        .map_or_else(|| quote!(Default::default()), |expr| quote!(#expr))
}

fn expression_value(raw: &str) -> TokenStream {
    let rewritten = rewrite::rewrite(raw, "source");
    match syn::parse_str::<syn::Expr>(&rewritten) {
        Ok(expr) => quote!(#expr),
        // Reported as FCT015 during resolution.
        Err(_) => quote!(Default::default()),
    }
}

/// Null-guarded dotted access: `source.a.as_ref().map(|value| value.b.clone())`.
fn path_value(steps: &[PathStep], leaf: &TypeShape) -> TokenStream {
    let (intermediates, leaf_step) = steps.split_at(steps.len() - 1);
    let leaf_name = ident(&leaf_step[0].name);

    let mut chain = quote!(source);
    let mut guarded = false;
    for step in intermediates {
        let name = ident(&step.name);
        chain = match (guarded, step.nullable) {
            (false, false) => quote!(#chain.#name),
            (false, true) => {
                guarded = true;
                quote!(#chain.#name.as_ref())
            }
            (true, false) => quote!(#chain.map(|value| &value.#name)),
            (true, true) => quote!(#chain.and_then(|value| value.#name.as_ref())),
        };
    }

    match (guarded, leaf.nullable) {
        (false, _) => quote!(#chain.#leaf_name.clone()),
        (true, false) => quote!(#chain.map(|value| value.#leaf_name.clone())),
        // Leaf is itself an Option; flatten the two levels.
        (true, true) => quote!(#chain.and_then(|value| value.#leaf_name.clone())),
    }
}

/// Enum representation conversion.
fn enum_value(
    name: &syn::Ident,
    shape: &TypeShape,
    repr: EnumRepr,
    schema: &SourceSchema,
) -> TokenStream {
    let Some(def) = schema.enum_def(&shape.base) else {
        return quote!(Default::default());
    };
    let conversion = |value: TokenStream| -> TokenStream {
        match repr {
            EnumRepr::Str => str_match(def, &value),
            EnumRepr::Int => quote!(#value.clone() as i32),
        }
    };

    if shape.nullable {
        let converted = conversion(quote!(value));
        quote!(source.#name.as_ref().map(|value| #converted))
    } else {
        conversion(quote!(source.#name))
    }
}

fn str_match(def: &EnumDef, value: &TokenStream) -> TokenStream {
    let enum_ty = ident(&def.name);
    let arms = def.variants.iter().map(|variant| {
        let variant_ident = ident(&variant.name);
        let text = &variant.name;
        quote!(#enum_ty::#variant_ident => #text.to_string())
    });
    quote! {
        match #value { #(#arms),* }
    }
}

/// Nested facet expansion with depth and identity guards.
fn nested_value(member: &MemberDescriptor, name: &syn::Ident, def: &FacetDef) -> TokenStream {
    let nested = member
        .nested
        .as_ref()
        .map(|nested| ident(&nested.facet))
        .unwrap_or_else(|| ident("unreachable"));
    let effective = def.effective_depth();
    let deref = target_binding(&member.shape, quote!(inner));

    if member.shape.collection.is_some() {
        let guard = if def.preserve_references {
            quote! {
                if !visited.enter(target) {
                    return None;
                }
                let nested = #nested::from_source_guarded(target, depth + 1, visited);
                visited.leave(target);
                Some(nested)
            }
        } else {
            quote!(Some(#nested::from_source_guarded(target, depth + 1, visited)))
        };
        let per_item = quote! {
            |inner| {
                #deref
                if depth + 1 > #effective {
                    return None;
                }
                #guard
            }
        };
        return if member.shape.nullable {
            quote! {
                source.#name.as_ref().map(|items| items.iter().filter_map(#per_item).collect())
            }
        } else {
            quote! {
                source.#name.iter().filter_map(#per_item).collect()
            }
        };
    }

    let wrap = if member.shape.pointer.is_some() {
        quote!(Some(Box::new(nested)))
    } else {
        quote!(Some(nested))
    };
    let expand = if def.preserve_references {
        quote! {
            if visited.enter(target) {
                let nested = #nested::from_source_guarded(target, depth + 1, visited);
                visited.leave(target);
                #wrap
            } else {
                None
            }
        }
    } else {
        quote! {
            {
                let nested = #nested::from_source_guarded(target, depth + 1, visited);
                #wrap
            }
        }
    };

    if member.shape.nullable {
        quote! {
            match source.#name.as_ref() {
                Some(inner) => {
                    #deref
                    if depth + 1 > #effective {
                        None
                    } else {
                        #expand
                    }
                }
                None => None,
            }
        }
    } else {
        quote! {
            {
                let inner = &source.#name;
                #deref
                if depth + 1 > #effective {
                    None
                } else {
                    #expand
                }
            }
        }
    }
}

/// Bind `target: &SourceTy` from a possibly pointer/cell-wrapped reference.
fn target_binding(shape: &TypeShape, inner: TokenStream) -> TokenStream {
    let base = &shape.base_ty;
    match (shape.pointer.is_some(), shape.cell) {
        (_, true) => quote! {
            let borrowed = #inner.borrow();
            let target: &#base = &borrowed;
        },
        (true, false) => quote! {
            let target: &#base = &**#inner;
        },
        (false, false) => quote! {
            let target: &#base = #inner;
        },
    }
}
