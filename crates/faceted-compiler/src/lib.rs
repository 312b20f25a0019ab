// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! # faceted-compiler
//!
//! A declarative schema-projection compiler: given the shape of a source
//! type and a set of directives (keep, rename, conditionally include,
//! flatten), it derives a facet type and emits two equivalent transforms —
//! an eager copying constructor and a query-translatable expression form.
//!
//! # Pipeline
//!
//! Data flows strictly downstream through one synchronous pass:
//!
//! | Stage | Module | Responsibility |
//! |-------|--------|----------------|
//! | 1 | [`schema`] | introspect source structs/enums into member lists |
//! | 2 | [`registry`] | map source types to their facets, once, up front |
//! | 3 | [`extract`] | ordered member extraction with include/exclude |
//! | 4 | [`directive`] | renames, conditionals, enum representations |
//! | 5 | [`nested`] | match member types against the registry |
//! | 5 | [`flatten`] | registry-independent deep flattening |
//! | 6 | [`emit`] | dual emission: eager + expression (+ reverse) |
//! | — | [`rewrite`] | requalify directive snippets for both emitters |
//! | — | [`diagnostics`] | structured configuration errors, never panics |
//!
//! Definitions are independent of each other except for the read-only
//! registry, so a definition with configuration errors is skipped while
//! the rest of the unit still generates.
//!
//! # Example
//!
//! ```rust,ignore
//! let items: Vec<syn::Item> = vec![
//!     syn::parse_quote! {
//!         pub struct Person {
//!             pub first_name: String,
//!             pub last_name: String,
//!         }
//!     },
//!     syn::parse_quote! {
//!         #[facet(source = "Person", exclude(last_name))]
//!         pub struct PersonView;
//!     },
//! ];
//! let (unit, _) = faceted_compiler::parse::partition(items)?;
//! let output = faceted_compiler::compile(&unit);
//! for unit in &output.units {
//!     println!("{}", unit.render());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diagnostics;
pub mod directive;
pub mod emit;
pub mod extract;
pub mod flatten;
pub mod nested;
pub mod parse;
pub mod plan;
pub mod registry;
pub mod rewrite;
pub mod schema;

use std::collections::BTreeMap;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use emit::GeneratedUnit;
pub use parse::CompilationUnit;
pub use plan::FacetDef;
pub use registry::FacetRegistry;
pub use schema::SourceSchema;

/// Result of compiling one unit: generated text units plus diagnostics.
#[derive(Debug)]
pub struct CompileOutput {
    /// One unit per successfully resolved definition, in declaration
    /// order.
    pub units: Vec<GeneratedUnit>,
    /// Everything the resolvers and emitters reported.
    pub diagnostics: Diagnostics,
}

/// Compile a full unit: build the registry, resolve every definition,
/// emit the survivors.
#[must_use]
pub fn compile(unit: &CompilationUnit) -> CompileOutput {
    let mut diags = Diagnostics::new();
    let schema = SourceSchema::build(&unit.sources, &unit.enums);
    let registry = FacetRegistry::build(&unit.facets, &schema, &mut diags);
    tracing::debug!(
        sources = unit.sources.len(),
        facets = unit.facets.len(),
        flattens = unit.flattens.len(),
        "compiling unit"
    );

    let mut order: Vec<String> = Vec::new();
    let mut resolved: BTreeMap<String, FacetDef> = BTreeMap::new();
    for decl in &unit.facets {
        if let Some(def) = resolve_facet(decl, &schema, &registry, &mut diags) {
            order.push(def.name_str());
            resolved.insert(def.name_str(), def);
        }
    }
    for decl in &unit.flattens {
        if let Some(def) = flatten::resolve(&schema, decl, &mut diags) {
            if diags.has_errors_at(&def.name_str()) {
                continue;
            }
            order.push(def.name_str());
            resolved.insert(def.name_str(), def);
        }
    }

    // A skipped definition takes everything that nests it down too; keep
    // removing until the survivor set is closed under nesting.
    loop {
        let dangling = resolved.values().find_map(|def| {
            def.members.iter().find_map(|member| {
                member
                    .nested
                    .as_ref()
                    .filter(|nested| !resolved.contains_key(&nested.facet))
                    .map(|nested| (def.name_str(), member.name.clone(), nested.facet.clone()))
            })
        });
        let Some((facet, member, missing)) = dangling else {
            break;
        };
        diags.error(
            "FCT017",
            format!("{facet}.{member}"),
            format!("nested facet `{missing}` was not generated"),
            None,
        );
        resolved.remove(&facet);
    }

    let units = order
        .iter()
        .filter_map(|name| resolved.get(name))
        .map(|def| emit::generate(def, &resolved, &schema, &mut diags))
        .collect();

    CompileOutput {
        units,
        diagnostics: diags,
    }
}

/// Resolve one facet declaration through extraction, directives, and
/// nested matching.
///
/// Returns `None` when the declaration accumulated error diagnostics.
#[must_use]
pub fn resolve_facet(
    decl: &parse::FacetDecl,
    schema: &SourceSchema,
    registry: &FacetRegistry,
    diags: &mut Diagnostics,
) -> Option<FacetDef> {
    if decl.args.max_depth > faceted_core::DEPTH_CEILING {
        diags.warning(
            "FCT005",
            decl.name_str(),
            format!(
                "max_depth {} exceeds the ceiling of {}; clamped",
                decl.args.max_depth,
                faceted_core::DEPTH_CEILING
            ),
            Some(decl.span),
        );
    }

    let mut extraction = extract::extract(schema, decl, diags)?;
    directive::apply(&mut extraction, decl, schema, diags);
    nested::resolve(&mut extraction.members, registry);
    if diags.has_errors_at(&decl.name_str()) {
        return None;
    }

    Some(FacetDef {
        name: decl.name.clone(),
        vis: decl.vis.clone(),
        source: decl.args.source.clone(),
        output_kind: decl.args.kind,
        members: extraction.members,
        max_depth: decl.args.max_depth,
        preserve_references: decl.args.preserve_references,
        generate_reverse: decl.args.reverse,
        excluded_required: extraction.excluded_required,
        is_flatten: false,
        span: decl.span,
    })
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    fn compile_items(items: Vec<syn::Item>) -> CompileOutput {
        let (unit, _) = parse::partition(items).unwrap();
        compile(&unit)
    }

    #[test]
    fn compiles_nested_facets_across_declaration_order() {
        let output = compile_items(vec![
            // The nested facet is declared after the one referencing it;
            // the registry makes the order irrelevant.
            parse_quote! {
                #[facet(source = "Person")]
                pub struct PersonView;
            },
            parse_quote! {
                pub struct Person {
                    pub name: String,
                    pub address: Option<Address>,
                }
            },
            parse_quote! {
                pub struct Address {
                    pub street: String,
                }
            },
            parse_quote! {
                #[facet(source = "Address")]
                pub struct AddressView;
            },
        ]);

        assert!(!output.diagnostics.has_errors());
        assert_eq!(output.units.len(), 2);
        let person = &output.units[0];
        assert_eq!(person.facet, "PersonView");
        assert!(person.render().contains("Option < AddressView >"));
    }

    #[test]
    fn failed_definition_skips_only_itself() {
        let output = compile_items(vec![
            parse_quote! {
                pub struct Person {
                    pub name: String,
                }
            },
            parse_quote! {
                #[facet(source = "Ghost")]
                pub struct GhostView;
            },
            parse_quote! {
                #[facet(source = "Person")]
                pub struct PersonView;
            },
        ]);

        assert!(output.diagnostics.has_errors());
        assert_eq!(output.units.len(), 1);
        assert_eq!(output.units[0].facet, "PersonView");
    }

    #[test]
    fn dangling_nested_reference_cascades() {
        let output = compile_items(vec![
            parse_quote! {
                pub struct Person {
                    pub address: Option<Address>,
                    pub name: String,
                }
            },
            parse_quote! {
                pub struct Address {
                    pub street: String,
                }
            },
            // AddressView fails (unknown member), so PersonView cannot
            // reference it and is skipped as well.
            parse_quote! {
                #[facet(source = "Address", exclude(country))]
                pub struct AddressView;
            },
            parse_quote! {
                #[facet(source = "Person")]
                pub struct PersonView;
            },
        ]);

        assert!(output.units.is_empty());
        assert!(
            output
                .diagnostics
                .items()
                .iter()
                .any(|item| item.code == "FCT017")
        );
    }

    #[test]
    fn flatten_definitions_emit_alongside_facets() {
        let output = compile_items(vec![
            parse_quote! {
                pub struct Address {
                    pub street: String,
                    pub city: String,
                    pub zip: Option<String>,
                }
            },
            parse_quote! {
                pub struct Person {
                    pub first_name: String,
                    pub address: Option<Address>,
                }
            },
            parse_quote! {
                #[flatten(source = "Person")]
                pub struct PersonFlat;
            },
        ]);

        assert!(!output.diagnostics.has_errors());
        assert_eq!(output.units.len(), 1);
        let text = output.units[0].render();
        assert!(text.contains("address_street"));
        assert!(text.contains("projection"));
        // Flatten definitions have no guarded constructor.
        assert!(!text.contains("from_source_guarded"));
    }

    #[test]
    fn max_depth_above_ceiling_warns_and_clamps() {
        let output = compile_items(vec![
            parse_quote! {
                pub struct Node {
                    pub next: Option<Box<Node>>,
                    pub label: String,
                }
            },
            parse_quote! {
                #[facet(source = "Node", max_depth = 99)]
                pub struct NodeView;
            },
        ]);

        assert!(!output.diagnostics.has_errors());
        assert!(
            output
                .diagnostics
                .items()
                .iter()
                .any(|item| item.code == "FCT005")
        );
        assert!(output.units[0].render().contains("depth + 1 > 10usize"));
    }
}
