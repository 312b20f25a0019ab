// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Nested-graph resolution.
//!
//! Third resolver stage: any member whose base type (collection element
//! type for collections) matches a registered facet gets its emitted type
//! rewritten to that facet and is flagged for recursive expansion. The
//! resolution itself is purely structural — cycle and depth safety are the
//! emitters' concern, because the two emission paths break cycles at
//! different times.
//!
//! Emitted-type rules:
//!
//! | Source member | Facet member |
//! |---------------|--------------|
//! | `Nested` / `Option<Nested>` | `Option<NestedView>` |
//! | `Option<Box<Nested>>` (any pointer) | `Option<Box<NestedView>>` |
//! | `Vec<Nested>` (any element wrapper) | `Vec<NestedView>` |
//! | `Option<Vec<Nested>>` | `Option<Vec<NestedView>>` |
//!
//! Non-collection nested members are always nullable on the facet: depth
//! and cycle truncation need a null state to land in. Pointer-wrapped
//! sources keep a `Box` so recursive facet types stay sized; the eager
//! transform copies, so shared-ownership wrappers have nothing left to
//! share.

use syn::Type;

use crate::{
    plan::{Accessor, MemberDescriptor, NestedFacet},
    registry::FacetRegistry,
    schema::CollectionKind,
};

/// Match members against the registry and rewrite their emitted types.
pub fn resolve(members: &mut [MemberDescriptor], registry: &FacetRegistry) {
    for member in members.iter_mut() {
        // Path extractions and expression members never nest, and an
        // enum-repr member already has its encoded type.
        if !matches!(member.accessor, Accessor::Member(_)) || member.enum_repr.is_some() {
            continue;
        }
        let Some(facet) = registry.facet_for(&member.shape.base) else {
            continue;
        };

        member.nested = Some(NestedFacet {
            facet: facet.to_string(),
            source: member.shape.base.clone(),
        });
        member.is_value_type = false;
        member.emitted_ty = nested_ty(member, facet);
    }
}

fn nested_ty(member: &MemberDescriptor, facet: &str) -> Type {
    let facet: Type =
        syn::parse_str(facet).unwrap_or_else(|_| member.shape.base_ty.clone());

    match member.shape.collection {
        Some(CollectionKind::Vec) => {
            if member.shape.nullable {
                syn::parse_quote!(Option<Vec<#facet>>)
            } else {
                syn::parse_quote!(Vec<#facet>)
            }
        }
        Some(CollectionKind::BoxedSlice) => {
            if member.shape.nullable {
                syn::parse_quote!(Option<Box<[#facet]>>)
            } else {
                syn::parse_quote!(Box<[#facet]>)
            }
        }
        None => {
            if member.shape.pointer.is_some() {
                syn::parse_quote!(Option<Box<#facet>>)
            } else {
                syn::parse_quote!(Option<#facet>)
            }
        }
    }
}
