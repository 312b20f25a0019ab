// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Per-member directive parsing.
//!
//! Member directives start with the target member name, followed by named
//! options:
//!
//! | Directive | Form |
//! |-----------|------|
//! | rename | `#[rename(name, from = "...", ty = "...", reversible = false, project = false, nullable)]` |
//! | conditional | `#[when(member, predicate = "...", default = "...", project = false)]` |
//! | enum repr | `#[enum_repr(member, repr = "string")]` |

use proc_macro2::Span;
use syn::{
    Attribute, Ident, LitBool, LitStr, Token, Type,
    parse::ParseStream,
};

use crate::plan::EnumRepr;

/// Parsed `#[rename(..)]`.
#[derive(Debug)]
pub struct RenameDirective {
    /// Target member name on the facet.
    pub target: Ident,
    /// Raw source text: a bare member, a dotted path, or an expression.
    pub from: String,
    /// Explicit emitted type; required when `from` is an expression.
    pub ty: Option<Type>,
    /// Participates in the reverse transform (bare renames only).
    pub reversible: bool,
    /// Participates in the expression-form transform.
    pub project: bool,
    /// Force `Option` wrapping of the emitted type.
    pub nullable: bool,
    /// Directive span.
    pub span: Span,
}

/// Parsed `#[when(..)]`.
#[derive(Debug)]
pub struct ConditionalDirective {
    /// Target member name.
    pub member: Ident,
    /// Raw predicate text.
    pub predicate: String,
    /// Literal used when the predicate is false.
    pub default: Option<String>,
    /// Participates in the expression-form transform.
    pub project: bool,
    /// Directive span.
    pub span: Span,
}

/// Parsed `#[enum_repr(..)]`.
#[derive(Debug)]
pub struct EnumReprDirective {
    /// Target member name.
    pub member: Ident,
    /// Chosen encoding.
    pub repr: EnumRepr,
    /// Directive span.
    pub span: Span,
}

/// Parse `#[rename(name, from = "..", ..)]`.
pub fn parse_rename(attr: &Attribute) -> syn::Result<RenameDirective> {
    attr.parse_args_with(|input: ParseStream<'_>| {
        let target: Ident = input.parse()?;
        let span = target.span();
        let mut from = None;
        let mut ty = None;
        let mut reversible = true;
        let mut project = true;
        let mut nullable = false;

        while input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            let key: Ident = input.parse()?;
            match key.to_string().as_str() {
                "from" => from = Some(string_value(input)?),
                "ty" => {
                    input.parse::<Token![=]>()?;
                    let lit: LitStr = input.parse()?;
                    ty = Some(lit.parse::<Type>()?);
                }
                "reversible" => reversible = flag_value(input)?,
                "project" => project = flag_value(input)?,
                "nullable" => nullable = true,
                _ => {
                    return Err(syn::Error::new(
                        key.span(),
                        "unknown rename option; expected from/ty/reversible/project/nullable",
                    ));
                }
            }
        }

        let Some(from) = from else {
            return Err(syn::Error::new(span, "rename requires `from = \"..\"`"));
        };

        Ok(RenameDirective {
            target,
            from,
            ty,
            reversible,
            project,
            nullable,
            span,
        })
    })
}

/// Parse `#[when(member, predicate = "..", ..)]`.
pub fn parse_conditional(attr: &Attribute) -> syn::Result<ConditionalDirective> {
    attr.parse_args_with(|input: ParseStream<'_>| {
        let member: Ident = input.parse()?;
        let span = member.span();
        let mut predicate = None;
        let mut default = None;
        let mut project = true;

        while input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            let key: Ident = input.parse()?;
            match key.to_string().as_str() {
                "predicate" => predicate = Some(string_value(input)?),
                "default" => default = Some(string_value(input)?),
                "project" => project = flag_value(input)?,
                _ => {
                    return Err(syn::Error::new(
                        key.span(),
                        "unknown when option; expected predicate/default/project",
                    ));
                }
            }
        }

        let Some(predicate) = predicate else {
            return Err(syn::Error::new(span, "when requires `predicate = \"..\"`"));
        };

        Ok(ConditionalDirective {
            member,
            predicate,
            default,
            project,
            span,
        })
    })
}

/// Parse `#[enum_repr(member, repr = "string" | "int")]`.
pub fn parse_enum_repr(attr: &Attribute) -> syn::Result<EnumReprDirective> {
    attr.parse_args_with(|input: ParseStream<'_>| {
        let member: Ident = input.parse()?;
        let span = member.span();
        let mut repr = None;

        while input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            let key: Ident = input.parse()?;
            match key.to_string().as_str() {
                "repr" => {
                    let value = string_value(input)?;
                    repr = Some(match value.as_str() {
                        "string" => EnumRepr::Str,
                        "int" => EnumRepr::Int,
                        _ => {
                            return Err(syn::Error::new(
                                key.span(),
                                "repr must be \"string\" or \"int\"",
                            ));
                        }
                    });
                }
                _ => {
                    return Err(syn::Error::new(key.span(), "unknown enum_repr option"));
                }
            }
        }

        let Some(repr) = repr else {
            return Err(syn::Error::new(span, "enum_repr requires `repr = \"..\"`"));
        };

        Ok(EnumReprDirective { member, repr, span })
    })
}

fn string_value(input: ParseStream<'_>) -> syn::Result<String> {
    input.parse::<Token![=]>()?;
    let lit: LitStr = input.parse()?;
    Ok(lit.value())
}

/// A flag option: bare means `true`, `= false` overrides.
fn flag_value(input: ParseStream<'_>) -> syn::Result<bool> {
    if input.peek(Token![=]) {
        input.parse::<Token![=]>()?;
        let lit: LitBool = input.parse()?;
        Ok(lit.value)
    } else {
        Ok(true)
    }
}
