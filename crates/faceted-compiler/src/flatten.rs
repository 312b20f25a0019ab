// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Deep property flattening.
//!
//! A separate, registry-independent traversal: starting from the source
//! type, every member is either a leaf (copied as-is) or a branch to
//! recurse into. Collections are never recursed into and produce no output
//! at all. Recursion stops at the configured `max_depth` (default 3) and is
//! always hard-capped at the absolute ceiling, whatever the configuration
//! says.
//!
//! Leaf vs. branch:
//!
//! - leaf — primitive, `String`, enum, well-known temporal/identifier
//!   type, unknown (undeclared) type, or a small plain value aggregate (a
//!   declared struct of at most two primitive members, the Point shape)
//! - branch — any other declared struct; pointer-wrapped structs are
//!   reference-like and always branch
//!
//! `RefCell` members cannot be reached through a flattening access chain
//! and are skipped with a warning.

use crate::{
    diagnostics::Diagnostics,
    parse::FlattenDecl,
    plan::{
        Accessor, FacetDef, MemberDescriptor, NamingStrategy, PathStep, guarded_emitted_ty,
    },
    schema::{SourceSchema, TypeShape},
};

/// Resolve one flatten declaration into an emission-ready definition.
///
/// Returns `None` after recording diagnostics when the source type is
/// unknown.
pub fn resolve(
    schema: &SourceSchema,
    decl: &FlattenDecl,
    diags: &mut Diagnostics,
) -> Option<FacetDef> {
    let flat_name = decl.name_str();

    if schema.get(&decl.args.source).is_none() {
        diags.error(
            "FCT001",
            flat_name,
            format!("unknown source type `{}`", decl.args.source),
            Some(decl.span),
        );
        return None;
    }

    if decl.args.max_depth > faceted_core::DEPTH_CEILING {
        diags.warning(
            "FCT005",
            flat_name.clone(),
            format!(
                "max_depth {} exceeds the ceiling of {}; clamped",
                decl.args.max_depth,
                faceted_core::DEPTH_CEILING
            ),
            Some(decl.span),
        );
    }

    let mut walker = Walker {
        schema,
        decl,
        diags,
        effective_depth: faceted_core::effective_depth(decl.args.max_depth),
        leaves: Vec::new(),
        matched_exclusions: vec![false; decl.args.exclude.0.len()],
    };
    walker.walk(&decl.args.source, &mut Vec::new());

    for (index, matched) in walker.matched_exclusions.iter().enumerate() {
        if !matched {
            walker.diags.warning(
                "FCT016",
                flat_name.clone(),
                format!(
                    "exclusion `{}` matched nothing",
                    decl.args.exclude.0[index]
                ),
                Some(decl.span),
            );
        }
    }

    let members = name_leaves(walker.leaves, decl.args.naming);

    Some(FacetDef {
        name: decl.name.clone(),
        vis: decl.vis.clone(),
        source: decl.args.source.clone(),
        output_kind: crate::plan::OutputKind::Record,
        members,
        max_depth: decl.args.max_depth,
        preserve_references: false,
        generate_reverse: false,
        excluded_required: Vec::new(),
        is_flatten: true,
        span: decl.span,
    })
}

/// A collected leaf before naming.
struct Leaf {
    steps: Vec<PathStep>,
    shape: TypeShape,
    docs: Vec<String>,
    is_value_type: bool,
}

struct Walker<'a> {
    schema: &'a SourceSchema,
    decl: &'a FlattenDecl,
    diags: &'a mut Diagnostics,
    effective_depth: usize,
    leaves: Vec<Leaf>,
    matched_exclusions: Vec<bool>,
}

impl Walker<'_> {
    fn walk(&mut self, type_name: &str, path: &mut Vec<PathStep>) {
        for (member, _) in self.schema.effective_members(type_name) {
            if member.kind == crate::schema::MemberKind::Field && !self.decl.args.include_fields
            {
                continue;
            }
            if self.excluded(path, &member.name) {
                continue;
            }
            // Collections are never flattened and produce nothing.
            if member.shape.collection.is_some() {
                continue;
            }

            let full_len = path.len() + 1;
            if self.is_leaf(&member.shape) {
                if full_len > self.effective_depth {
                    continue;
                }
                let mut steps = path.clone();
                steps.push(PathStep {
                    name: member.name.clone(),
                    nullable: member.shape.nullable,
                    pointer: member.shape.pointer,
                });
                self.leaves.push(Leaf {
                    steps,
                    is_value_type: self.schema.is_value_type(&member.shape.base),
                    shape: member.shape.clone(),
                    docs: member.docs.clone(),
                });
            } else {
                if member.shape.cell {
                    self.diags.warning(
                        "FCT014",
                        format!("{}.{}", self.decl.name_str(), member.name),
                        "RefCell members cannot be flattened",
                        Some(self.decl.span),
                    );
                    continue;
                }
                if full_len >= self.effective_depth {
                    continue;
                }
                path.push(PathStep {
                    name: member.name.clone(),
                    nullable: member.shape.nullable,
                    pointer: member.shape.pointer,
                });
                let base = member.shape.base.clone();
                self.walk(&base, path);
                path.pop();
            }
        }
    }

    fn is_leaf(&self, shape: &TypeShape) -> bool {
        if self.schema.is_value_type(&shape.base) {
            return true;
        }
        if self.schema.get(&shape.base).is_none() {
            // Undeclared types cannot be traversed, only copied.
            return true;
        }
        // A declared struct is copied whole only when it is a small plain
        // value aggregate (at most two primitive members, no wrappers) —
        // the Point/Range shape. Anything else recurses; pointer-wrapped
        // structs are reference-like and always recurse.
        if shape.pointer.is_some() || shape.cell {
            return false;
        }
        let members = self.schema.effective_members(&shape.base);
        members.len() <= 2
            && members.iter().all(|(member, _)| {
                member.shape.is_plain() && self.schema.is_primitive(&member.shape.base)
            })
    }

    fn excluded(&mut self, path: &[PathStep], member: &str) -> bool {
        let dotted = path
            .iter()
            .map(|step| step.name.as_str())
            .chain(std::iter::once(member))
            .collect::<Vec<_>>()
            .join(".");
        let mut hit = false;
        for (index, exclusion) in self.decl.args.exclude.0.iter().enumerate() {
            if exclusion == &dotted {
                self.matched_exclusions[index] = true;
                hit = true;
            }
        }
        hit
    }
}

/// Apply the naming strategy and build the final member list.
fn name_leaves(leaves: Vec<Leaf>, naming: NamingStrategy) -> Vec<MemberDescriptor> {
    let mut names: Vec<String> = Vec::with_capacity(leaves.len());
    for leaf in &leaves {
        let name = match naming {
            NamingStrategy::Prefix => leaf
                .steps
                .iter()
                .map(|step| step.name.as_str())
                .collect::<Vec<_>>()
                .join("_"),
            NamingStrategy::LeafOnly => {
                leaf.steps.last().map(|step| step.name.clone()).unwrap_or_default()
            }
        };
        names.push(name);
    }

    // Collision pass: numeric suffixes in first-seen traversal order.
    let mut counts: std::collections::BTreeMap<String, usize> = std::collections::BTreeMap::new();
    for name in names.iter_mut() {
        let seen = counts.entry(name.clone()).or_insert(0);
        *seen += 1;
        if *seen > 1 {
            *name = format!("{name}{seen}");
        }
    }

    leaves
        .into_iter()
        .zip(names)
        .map(|(leaf, name)| {
            let guarded = leaf.steps[..leaf.steps.len() - 1]
                .iter()
                .any(|step| step.nullable);
            let mut member = MemberDescriptor::direct(
                name,
                leaf.shape.clone(),
                crate::schema::MemberKind::Property,
                false,
                leaf.is_value_type,
                leaf.docs,
            );
            member.emitted_ty = guarded_emitted_ty(&leaf.shape, guarded);
            member.accessor = Accessor::Path(leaf.steps);
            member.guarded = guarded;
            member.reversible = false;
            member
        })
        .collect()
}
