// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Expression-form emission.
//!
//! Emits `fn projection() -> faceted_core::Projection`: the same member
//! plan as the eager path, expressed as a single side-effect-free
//! expression tree. There is no runtime state here, so cycle safety is
//! purely compile-time: while a nested facet's members are being inlined
//! its name sits in an in-progress set, and a member that would re-enter
//! it becomes an opaque [`Expr::Call`] node instead — still within the
//! restricted grammar, but no longer infinitely expandable. The depth
//! ceiling truncates to a null literal.

use std::collections::BTreeMap;

use faceted_core::expr::{BinaryOp, Binding, Expr, Literal};
use proc_macro2::TokenStream;
use quote::quote;

use crate::{
    plan::{Accessor, EnumRepr, FacetDef, MemberDescriptor, PathStep},
    rewrite,
    schema::{EnumDef, SourceSchema},
};

/// Emit the expression-form transform for one definition.
#[must_use]
pub fn generate(
    def: &FacetDef,
    all: &BTreeMap<String, FacetDef>,
    schema: &SourceSchema,
) -> TokenStream {
    let mut in_progress = vec![def.name_str()];
    let bindings = bindings_for(def, all, schema, &mut in_progress, 0, &Expr::Source);

    let facet = def.name_str();
    let source = &def.source;
    let binding_tokens: Vec<TokenStream> = bindings.iter().map(binding_tokens).collect();

    quote! {
        /// Expression-form transform for query planners.
        ///
        /// Semantically equivalent to [`Self::from_source`] wherever no
        /// depth or cycle truncation applies.
        pub fn projection() -> ::faceted_core::expr::Projection {
            ::faceted_core::expr::Projection::new(
                #facet,
                #source,
                ::std::vec![#(#binding_tokens),*],
            )
        }
    }
}

/// Build the bindings of `def` with member paths anchored at `root`.
fn bindings_for(
    def: &FacetDef,
    all: &BTreeMap<String, FacetDef>,
    schema: &SourceSchema,
    in_progress: &mut Vec<String>,
    depth: usize,
    root: &Expr,
) -> Vec<Binding> {
    def.members
        .iter()
        .filter(|member| member.include_in_projection)
        .map(|member| {
            let value = member_expr(member, def, all, schema, in_progress, depth, root);
            Binding::new(member.name.clone(), conditioned(member, value, root))
        })
        .collect()
}

fn member_expr(
    member: &MemberDescriptor,
    def: &FacetDef,
    all: &BTreeMap<String, FacetDef>,
    schema: &SourceSchema,
    in_progress: &mut Vec<String>,
    depth: usize,
    root: &Expr,
) -> Expr {
    match &member.accessor {
        Accessor::Expression(raw) => {
            let rewritten = rewrite::rewrite(raw, "source");
            match rewrite::lift(&rewritten, "source") {
                Some(lifted) => lifted.rebase(root),
                None => Expr::raw(rewritten),
            }
        }
        Accessor::Path(steps) => path_expr(steps, root),
        Accessor::Member(source_name) => {
            let base = root.clone().member(source_name);
            if let Some(repr) = member.enum_repr {
                return match schema.enum_def(&member.shape.base) {
                    Some(enum_def) => {
                        enum_chain(enum_def, repr, &base, member.shape.nullable)
                    }
                    None => Expr::null(),
                };
            }
            let Some(nested) = &member.nested else {
                return base;
            };

            // Depth truncation happens at generation time; there is no
            // depth counter in the emitted expression.
            if depth + 1 > def.effective_depth() {
                return Expr::null();
            }

            let collection = member.shape.collection.is_some();
            if in_progress.contains(&nested.facet) || !all.contains_key(&nested.facet) {
                // Compile-time cycle break: opaque call instead of inlining.
                return if collection {
                    Expr::map(base, Expr::call(nested.facet.clone(), Expr::Element))
                } else {
                    Expr::call(nested.facet.clone(), base)
                };
            }

            let nested_def = &all[&nested.facet];
            in_progress.push(nested.facet.clone());
            let inlined = if collection {
                let element_bindings =
                    bindings_for(nested_def, all, schema, in_progress, depth + 1, &Expr::Element);
                Expr::map(
                    base,
                    Expr::construct(nested.facet.clone(), element_bindings),
                )
            } else {
                let nested_bindings =
                    bindings_for(nested_def, all, schema, in_progress, depth + 1, &base);
                let construct = Expr::construct(nested.facet.clone(), nested_bindings);
                if member.shape.nullable {
                    Expr::cond(Expr::not_null(base), construct, Expr::null())
                } else {
                    construct
                }
            };
            in_progress.pop();
            inlined
        }
    }
}

/// Null-guarded dotted path: every nullable intermediate step guards the
/// tail with an explicit conditional so planners see the null handling.
fn path_expr(steps: &[PathStep], root: &Expr) -> Expr {
    let mut chain = root.clone();
    let mut guards: Vec<Expr> = Vec::new();
    for (index, step) in steps.iter().enumerate() {
        chain = chain.member(&step.name);
        if step.nullable && index + 1 < steps.len() {
            guards.push(chain.clone());
        }
    }

    guards.into_iter().rev().fold(chain, |value, guard| {
        Expr::cond(Expr::not_null(guard), value, Expr::null())
    })
}

/// Encode an enum member as a comparison chain over its variants.
fn enum_chain(def: &EnumDef, repr: EnumRepr, path: &Expr, nullable: bool) -> Expr {
    let encoded: Vec<Expr> = match repr {
        EnumRepr::Str => def
            .variants
            .iter()
            .map(|variant| Expr::str(variant.name.clone()))
            .collect(),
        EnumRepr::Int => def
            .discriminants()
            .into_iter()
            .map(Expr::int)
            .collect(),
    };
    if encoded.is_empty() {
        return Expr::null();
    }

    let mut chain = encoded[encoded.len() - 1].clone();
    for (variant, value) in def.variants.iter().zip(&encoded).rev().skip(1) {
        let variant_path = format!("{}::{}", def.name, variant.name);
        chain = Expr::cond(
            Expr::binary(BinaryOp::Eq, path.clone(), Expr::enum_variant(variant_path)),
            value.clone(),
            chain,
        );
    }

    if nullable {
        Expr::cond(Expr::not_null(path.clone()), chain, Expr::null())
    } else {
        chain
    }
}

/// Wrap a member value into its conditional, when directives attached one.
fn conditioned(member: &MemberDescriptor, value: Expr, root: &Expr) -> Expr {
    if member.conditions.is_empty() {
        return value;
    }

    let test = member
        .conditions
        .iter()
        .map(|condition| {
            let rewritten = rewrite::rewrite(condition, "source");
            match rewrite::lift(&rewritten, "source") {
                Some(lifted) => lifted.rebase(root),
                None => Expr::raw(rewritten),
            }
        })
        .reduce(|acc, predicate| Expr::binary(BinaryOp::And, acc, predicate))
        .unwrap_or_else(|| Expr::bool(true));

    Expr::cond(test, value, default_expr(member))
}

fn default_expr(member: &MemberDescriptor) -> Expr {
    match member.default_literal.as_deref() {
        None => Expr::null(),
        Some(text) => classify_literal(text),
    }
}

/// Minimal literal classification for condition defaults.
fn classify_literal(text: &str) -> Expr {
    let text = text.trim();
    match text {
        "None" => return Expr::null(),
        "true" => return Expr::bool(true),
        "false" => return Expr::bool(false),
        _ => {}
    }
    if let Ok(value) = text.parse::<i64>() {
        return Expr::int(value);
    }
    if let Ok(value) = text.parse::<f64>() {
        return Expr::float(value);
    }
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return Expr::str(&text[1..text.len() - 1]);
    }
    if text.contains("::")
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
    {
        return Expr::enum_variant(text);
    }
    Expr::raw(text)
}

/// Serialize an expression into builder calls on `faceted_core::expr`.
fn expr_tokens(expr: &Expr) -> TokenStream {
    let root = quote!(::faceted_core::expr::Expr);
    match expr {
        Expr::Source => quote!(#root::source()),
        Expr::Element => quote!(#root::element()),
        Expr::Member { base, name } => {
            let base = expr_tokens(base);
            quote!(#base.member(#name))
        }
        Expr::Literal(literal) => literal_tokens(literal),
        Expr::Binary { op, lhs, rhs } => {
            let op = op_tokens(*op);
            let lhs = expr_tokens(lhs);
            let rhs = expr_tokens(rhs);
            quote!(#root::binary(#op, #lhs, #rhs))
        }
        Expr::Not(operand) => {
            let operand = expr_tokens(operand);
            quote!(#root::not(#operand))
        }
        Expr::NotNull(operand) => {
            let operand = expr_tokens(operand);
            quote!(#root::not_null(#operand))
        }
        Expr::Cond {
            test,
            then,
            otherwise,
        } => {
            let test = expr_tokens(test);
            let then = expr_tokens(then);
            let otherwise = expr_tokens(otherwise);
            quote!(#root::cond(#test, #then, #otherwise))
        }
        Expr::Construct { facet, bindings } => {
            let bindings: Vec<TokenStream> = bindings.iter().map(binding_tokens).collect();
            quote!(#root::construct(#facet, ::std::vec![#(#bindings),*]))
        }
        Expr::Map { source, element } => {
            let source = expr_tokens(source);
            let element = expr_tokens(element);
            quote!(#root::map(#source, #element))
        }
        Expr::Call { facet, arg } => {
            let arg = expr_tokens(arg);
            quote!(#root::call(#facet, #arg))
        }
        Expr::Raw(text) => quote!(#root::raw(#text)),
    }
}

fn binding_tokens(binding: &Binding) -> TokenStream {
    let member = &binding.member;
    let expr = expr_tokens(&binding.expr);
    quote!(::faceted_core::expr::Binding::new(#member, #expr))
}

fn literal_tokens(literal: &Literal) -> TokenStream {
    let root = quote!(::faceted_core::expr::Expr);
    match literal {
        Literal::Null => quote!(#root::null()),
        Literal::Bool(value) => quote!(#root::bool(#value)),
        Literal::Int(value) => quote!(#root::int(#value)),
        Literal::Float(value) => quote!(#root::float(#value)),
        Literal::Str(value) => quote!(#root::str(#value)),
        Literal::EnumVariant(path) => quote!(#root::enum_variant(#path)),
    }
}

fn op_tokens(op: BinaryOp) -> TokenStream {
    let name = match op {
        BinaryOp::Eq => "Eq",
        BinaryOp::Ne => "Ne",
        BinaryOp::Lt => "Lt",
        BinaryOp::Le => "Le",
        BinaryOp::Gt => "Gt",
        BinaryOp::Ge => "Ge",
        BinaryOp::And => "And",
        BinaryOp::Or => "Or",
        BinaryOp::Add => "Add",
        BinaryOp::Sub => "Sub",
        BinaryOp::Mul => "Mul",
        BinaryOp::Div => "Div",
    };
    let ident = super::ident(name);
    quote!(::faceted_core::expr::BinaryOp::#ident)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_expr_guards_nullable_intermediates() {
        let steps = vec![
            PathStep {
                name: "address".into(),
                nullable: true,
                pointer: None,
            },
            PathStep {
                name: "street".into(),
                nullable: false,
                pointer: None,
            },
        ];
        let expr = path_expr(&steps, &Expr::Source);

        assert_eq!(
            expr,
            Expr::cond(
                Expr::not_null(Expr::source().member("address")),
                Expr::source().member("address").member("street"),
                Expr::null(),
            )
        );
    }

    #[test]
    fn classify_literal_covers_core_shapes() {
        assert_eq!(classify_literal("None"), Expr::null());
        assert_eq!(classify_literal("true"), Expr::bool(true));
        assert_eq!(classify_literal("42"), Expr::int(42));
        assert_eq!(classify_literal("2.5"), Expr::float(2.5));
        assert_eq!(classify_literal("\"n/a\""), Expr::str("n/a"));
        assert_eq!(
            classify_literal("Status::Pending"),
            Expr::enum_variant("Status::Pending")
        );
        assert_eq!(
            classify_literal("Vec::new()"),
            Expr::raw("Vec::new()")
        );
    }

    #[test]
    fn serializer_round_trips_through_builder_calls() {
        let expr = Expr::cond(
            Expr::binary(
                BinaryOp::Eq,
                Expr::source().member("status"),
                Expr::enum_variant("Status::Completed"),
            ),
            Expr::source().member("completed_at"),
            Expr::null(),
        );
        let text = expr_tokens(&expr).to_string();

        assert!(text.contains("cond"));
        assert!(text.contains("binary"));
        assert!(text.contains("BinaryOp :: Eq"));
        assert!(text.contains("\"Status::Completed\""));
    }
}
