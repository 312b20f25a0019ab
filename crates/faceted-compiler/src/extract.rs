// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Member extraction.
//!
//! First resolver stage: turns a facet declaration's source type into an
//! ordered [`MemberDescriptor`] list. The full `#[extends(..)]` chain is
//! walked exactly once, base-to-derived, de-duplicating by name so a
//! derived member always shadows its base counterpart. Members the
//! include/exclude sets drop are remembered separately when the source
//! cannot be rebuilt without them.

use crate::{
    diagnostics::Diagnostics,
    parse::FacetDecl,
    plan::{ExcludedRequired, MemberDescriptor},
    schema::{MemberKind, SourceSchema},
};

/// Extracted member plan plus the bookkeeping reverse transforms need.
#[derive(Debug)]
pub struct Extraction {
    /// Selected members in declaration order.
    pub members: Vec<MemberDescriptor>,
    /// Source members the facet dropped but the source type requires.
    pub excluded_required: Vec<ExcludedRequired>,
}

/// Extract the member list for one facet declaration.
///
/// Returns `None` after recording diagnostics when the declaration cannot
/// produce a plan (unknown source, include+exclude, unknown names).
pub fn extract(
    schema: &SourceSchema,
    decl: &FacetDecl,
    diags: &mut Diagnostics,
) -> Option<Extraction> {
    let facet_name = decl.name_str();

    let Some(_) = schema.get(&decl.args.source) else {
        diags.error(
            "FCT001",
            facet_name,
            format!("unknown source type `{}`", decl.args.source),
            Some(decl.span),
        );
        return None;
    };

    if decl.args.include.is_some() && decl.args.exclude.is_some() {
        diags.error(
            "FCT003",
            facet_name,
            "`include` and `exclude` are mutually exclusive",
            Some(decl.span),
        );
        return None;
    }

    // The inheritance chain is walked once; a derived member replaces a
    // base member of the same name at its original position.
    let all = schema.effective_members(&decl.args.source);

    let include = name_list(decl.args.include.as_ref());
    let exclude = name_list(decl.args.exclude.as_ref());
    let mut bad_names = false;
    for name in include.iter().chain(exclude.iter()) {
        if !all.iter().any(|(member, _)| &member.name == name) {
            diags.error(
                "FCT002",
                format!("{}.{name}", decl.name_str()),
                format!("`{name}` is not a member of `{}`", decl.args.source),
                Some(decl.span),
            );
            bad_names = true;
        }
    }
    if bad_names {
        return None;
    }

    let mut members = Vec::new();
    let mut excluded_required = Vec::new();
    for (member, inherited) in all {
        let visible = member.kind == MemberKind::Property || decl.args.include_fields;
        let selected = visible
            && match (&decl.args.include, &decl.args.exclude) {
                (Some(_), _) => include.contains(&member.name),
                (_, Some(_)) => !exclude.contains(&member.name),
                _ => true,
            };

        if selected {
            let is_value_type = schema.is_value_type(&member.shape.base);
            members.push(MemberDescriptor::direct(
                member.name.clone(),
                member.shape.clone(),
                member.kind,
                inherited,
                is_value_type,
                member.docs.clone(),
            ));
        } else if !member.shape.nullable {
            // The reverse transform must still construct this member.
            excluded_required.push(ExcludedRequired {
                name: member.name.clone(),
                ty: member.shape.ty.clone(),
            });
        }
    }

    Some(Extraction {
        members,
        excluded_required,
    })
}

fn name_list(paths: Option<&darling::util::PathList>) -> Vec<String> {
    paths
        .map(|list| {
            list.iter()
                .filter_map(|path| path.get_ident().map(ToString::to_string))
                .collect()
        })
        .unwrap_or_default()
}
