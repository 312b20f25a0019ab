// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Directive resolution.
//!
//! Second resolver stage: merges per-member directives onto the extracted
//! member list. A rename's `from` string is classified into exactly one of
//! three shapes — bare identifier (simple rename), dotted path (nested
//! extraction), or expression (token-rewritten at emission). Resolution is
//! order-independent and idempotent: the same inputs always produce the
//! same plan.
//!
//! Precedence note: a member that is both excluded and the target of a
//! rename is re-included — the rename wins — with an FCT010 warning, so
//! the permissive behavior stays visible in diagnostics.

use syn::Type;

use crate::{
    diagnostics::Diagnostics,
    extract::Extraction,
    parse::{FacetDecl, RenameDirective},
    plan::{Accessor, EnumRepr, MemberDescriptor, PathStep},
    schema::{MemberKind, SourceSchema, TypeShape},
};

/// Classification of a rename `from` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameSource {
    /// Bare identifier: simple rename of one source member.
    Simple(String),
    /// Dotted path: nested-path extraction bypassing member matching.
    Path(Vec<String>),
    /// Anything else: routed through the token rewriter at emission.
    Expression,
}

/// Classify a rename source string by pattern, not by parsing.
#[must_use]
pub fn classify(from: &str) -> RenameSource {
    let trimmed = from.trim();
    if is_ident(trimmed) {
        return RenameSource::Simple(trimmed.to_string());
    }
    let segments: Vec<&str> = trimmed.split('.').collect();
    if segments.len() > 1 && segments.iter().all(|segment| is_ident(segment)) {
        return RenameSource::Path(segments.iter().map(ToString::to_string).collect());
    }
    RenameSource::Expression
}

fn is_ident(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Apply every member directive of `decl` to the extracted plan.
pub fn apply(
    extraction: &mut Extraction,
    decl: &FacetDecl,
    schema: &SourceSchema,
    diags: &mut Diagnostics,
) {
    let facet = decl.name_str();

    let mut renamed_sources: Vec<&str> = Vec::new();
    for rename in &decl.renames {
        if renamed_sources.contains(&rename.from.as_str()) {
            diags.error(
                "FCT012",
                format!("{facet}.{}", rename.target),
                format!("`{}` already has a rename directive", rename.from),
                Some(rename.span),
            );
            continue;
        }
        renamed_sources.push(rename.from.as_str());
        apply_rename(extraction, rename, decl, schema, diags);
    }

    // Duplicate emitted names are a configuration error regardless of how
    // they came about.
    let mut seen: Vec<&str> = Vec::new();
    for member in &extraction.members {
        if seen.contains(&member.name.as_str()) {
            diags.error(
                "FCT012",
                format!("{facet}.{}", member.name),
                format!("duplicate facet member `{}`", member.name),
                Some(decl.span),
            );
        }
        seen.push(member.name.as_str());
    }

    for when in &decl.conditionals {
        let name = when.member.to_string();
        if syn::parse_str::<syn::Expr>(&when.predicate).is_err() {
            diags.error(
                "FCT015",
                format!("{facet}.{name}"),
                format!("predicate `{}` is not a parseable expression", when.predicate),
                Some(when.span),
            );
            continue;
        }
        if let Some(default) = &when.default
            && syn::parse_str::<syn::Expr>(default).is_err()
        {
            diags.error(
                "FCT015",
                format!("{facet}.{name}"),
                format!("default `{default}` is not a parseable expression"),
                Some(when.span),
            );
            continue;
        }
        let Some(member) = extraction
            .members
            .iter_mut()
            .find(|member| member.name == name)
        else {
            diags.error(
                "FCT008",
                format!("{facet}.{name}"),
                format!("conditional targets unknown member `{name}`"),
                Some(when.span),
            );
            continue;
        };
        member.conditions.push(when.predicate.clone());
        if member.default_literal.is_none() {
            member.default_literal = when.default.clone();
        }
        member.include_in_projection &= when.project;
    }

    for repr in &decl.enum_reprs {
        let name = repr.member.to_string();
        let Some(member) = extraction
            .members
            .iter_mut()
            .find(|member| member.name == name)
        else {
            diags.error(
                "FCT009",
                format!("{facet}.{name}"),
                format!("enum_repr targets unknown member `{name}`"),
                Some(repr.span),
            );
            continue;
        };
        apply_enum_repr(member, repr.repr, &facet, schema, diags, repr.span);
    }
}

fn apply_rename(
    extraction: &mut Extraction,
    rename: &RenameDirective,
    decl: &FacetDecl,
    schema: &SourceSchema,
    diags: &mut Diagnostics,
) {
    let facet = decl.name_str();
    let target = rename.target.to_string();

    match classify(&rename.from) {
        RenameSource::Simple(source_name) => {
            let position = extraction
                .members
                .iter()
                .position(|member| member.name == source_name);

            let position = match position {
                Some(position) => position,
                None => {
                    // The member may have been excluded; rename wins.
                    let Some(readded) = readd_excluded(extraction, &source_name, decl, schema)
                    else {
                        diags.error(
                            "FCT007",
                            format!("{facet}.{target}"),
                            format!(
                                "rename source `{source_name}` is not a member of `{}`",
                                decl.args.source
                            ),
                            Some(rename.span),
                        );
                        return;
                    };
                    diags.warning(
                        "FCT010",
                        format!("{facet}.{target}"),
                        format!("`{source_name}` was excluded but renamed; the rename wins"),
                        Some(rename.span),
                    );
                    readded
                }
            };

            let member = &mut extraction.members[position];
            member.name = target;
            member.accessor = Accessor::Member(source_name);
            member.reversible = rename.reversible;
            member.include_in_projection = rename.project;
            if rename.nullable {
                force_nullable(member);
            }
        }
        RenameSource::Path(segments) => {
            let Some(descriptor) =
                resolve_path(&target, &segments, decl, schema, diags, rename)
            else {
                return;
            };
            extraction.members.push(descriptor);
        }
        RenameSource::Expression => {
            let Some(ty) = rename.ty.clone() else {
                diags.error(
                    "FCT006",
                    format!("{facet}.{target}"),
                    "expression renames need an explicit `ty = \"..\"`",
                    Some(rename.span),
                );
                return;
            };
            if syn::parse_str::<syn::Expr>(&rename.from).is_err() {
                diags.error(
                    "FCT015",
                    format!("{facet}.{target}"),
                    format!("`{}` is not a parseable expression", rename.from),
                    Some(rename.span),
                );
                return;
            }
            let shape = TypeShape::of(&ty);
            let mut member = MemberDescriptor::direct(
                target,
                shape,
                MemberKind::Property,
                false,
                false,
                Vec::new(),
            );
            member.emitted_ty = ty;
            member.accessor = Accessor::Expression(rename.from.clone());
            member.reversible = false;
            member.include_in_projection = rename.project;
            if rename.nullable {
                force_nullable(&mut member);
            }
            extraction.members.push(member);
        }
    }
}

/// Re-add an excluded source member so a rename can claim it. Returns its
/// position in the member list.
fn readd_excluded(
    extraction: &mut Extraction,
    source_name: &str,
    decl: &FacetDecl,
    schema: &SourceSchema,
) -> Option<usize> {
    let (member, inherited) = schema
        .effective_members(&decl.args.source)
        .into_iter()
        .find(|(member, _)| member.name == source_name)?;

    extraction
        .excluded_required
        .retain(|required| required.name != source_name);

    let is_value_type = schema.is_value_type(&member.shape.base);
    extraction.members.push(MemberDescriptor::direct(
        member.name.clone(),
        member.shape.clone(),
        member.kind,
        inherited,
        is_value_type,
        member.docs.clone(),
    ));
    Some(extraction.members.len() - 1)
}

/// Resolve a dotted rename path against the schema.
fn resolve_path(
    target: &str,
    segments: &[String],
    decl: &FacetDecl,
    schema: &SourceSchema,
    diags: &mut Diagnostics,
    rename: &RenameDirective,
) -> Option<MemberDescriptor> {
    let facet = decl.name_str();
    let location = format!("{facet}.{target}");
    let mut current = decl.args.source.clone();
    let mut steps = Vec::new();
    let mut leaf_shape: Option<TypeShape> = None;

    for (index, segment) in segments.iter().enumerate() {
        let last = index + 1 == segments.len();
        let member = schema
            .effective_members(&current)
            .into_iter()
            .find(|(member, _)| &member.name == segment)
            .map(|(member, _)| member);
        let Some(member) = member else {
            diags.error(
                "FCT011",
                location,
                format!("path segment `{segment}` is not a member of `{current}`"),
                Some(rename.span),
            );
            return None;
        };
        if member.shape.cell {
            diags.warning(
                "FCT014",
                location.clone(),
                format!("path segment `{segment}` crosses a RefCell; not supported"),
                Some(rename.span),
            );
            return None;
        }
        if !last && member.shape.collection.is_some() {
            diags.error(
                "FCT011",
                location,
                format!("path segment `{segment}` is a collection; paths cannot cross it"),
                Some(rename.span),
            );
            return None;
        }

        steps.push(PathStep {
            name: segment.clone(),
            nullable: member.shape.nullable,
            pointer: member.shape.pointer,
        });
        if last {
            leaf_shape = Some(member.shape.clone());
        } else {
            current = member.shape.base.clone();
        }
    }

    let leaf = leaf_shape?;
    let guarded = steps[..steps.len() - 1].iter().any(|step| step.nullable);
    let emitted_ty = crate::plan::guarded_emitted_ty(&leaf, guarded || rename.nullable);
    let is_value_type = schema.is_value_type(&leaf.base);

    let mut member = MemberDescriptor::direct(
        target,
        leaf,
        MemberKind::Property,
        false,
        is_value_type,
        Vec::new(),
    );
    member.emitted_ty = emitted_ty;
    member.accessor = Accessor::Path(steps);
    member.reversible = false;
    member.include_in_projection = rename.project;
    member.guarded = guarded || rename.nullable;
    Some(member)
}

fn force_nullable(member: &mut MemberDescriptor) {
    if !member.shape.nullable && !member.guarded {
        let ty = &member.emitted_ty;
        member.emitted_ty = syn::parse_quote!(Option<#ty>);
        member.guarded = true;
    }
}

fn apply_enum_repr(
    member: &mut MemberDescriptor,
    repr: EnumRepr,
    facet: &str,
    schema: &SourceSchema,
    diags: &mut Diagnostics,
    span: proc_macro2::Span,
) {
    let location = format!("{facet}.{}", member.name);
    if !matches!(member.accessor, Accessor::Member(_)) || member.shape.collection.is_some() {
        diags.error(
            "FCT009",
            location,
            "enum_repr only applies to directly copied scalar members",
            Some(span),
        );
        return;
    }
    let Some(def) = schema.enum_def(&member.shape.base) else {
        diags.error(
            "FCT009",
            location,
            format!("`{}` is not a declared enum", member.shape.base),
            Some(span),
        );
        return;
    };
    if !def.is_unit_only() {
        diags.error(
            "FCT009",
            location,
            format!("`{}` has payload variants; enum_repr needs a unit-only enum", def.name),
            Some(span),
        );
        return;
    }

    member.enum_repr = Some(repr);
    let encoded: Type = match repr {
        EnumRepr::Str => syn::parse_quote!(String),
        EnumRepr::Int => syn::parse_quote!(i32),
    };
    member.emitted_ty = if member.shape.nullable {
        syn::parse_quote!(Option<#encoded>)
    } else {
        encoded
    };
}
