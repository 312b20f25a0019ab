// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! The restricted projection-expression grammar.
//!
//! An expression-form transform is a [`Projection`]: one binding per facet
//! member, each a side-effect-free [`Expr`] over the source instance. The
//! grammar is deliberately closed — member access, literals, comparisons,
//! boolean and arithmetic operators, conditionals, object construction,
//! collection mapping, and opaque nested-facet calls. There are no method
//! calls and nothing can fail at evaluation time except typed
//! [`crate::EvalError`]s, which is what makes the form translatable by
//! query planners.
//!
//! Snippets a directive supplied that do not fit the grammar survive as
//! [`Expr::Raw`] nodes carrying the rewritten text; planners may reject
//! them. This is a known limitation, not an extension point.

use std::fmt;

/// The expression-form transform of one facet definition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Projection {
    /// Facet type name (`"PersonView"`).
    pub facet: String,
    /// Source type name (`"Person"`).
    pub source: String,
    /// One binding per emitted member, in declaration order.
    pub bindings: Vec<Binding>,
}

impl Projection {
    /// Build a projection from parts.
    #[must_use]
    pub fn new(
        facet: impl Into<String>,
        source: impl Into<String>,
        bindings: Vec<Binding>,
    ) -> Self {
        Self {
            facet: facet.into(),
            source: source.into(),
            bindings,
        }
    }

    /// Find a binding by member name.
    #[must_use]
    pub fn binding(&self, member: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.member == member)
    }
}

/// One `member = expr` pair inside a [`Projection`] or [`Expr::Construct`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Binding {
    /// Target member name on the facet.
    pub member: String,
    /// Value expression over the source.
    pub expr: Expr,
}

impl Binding {
    /// Build a binding.
    #[must_use]
    pub fn new(member: impl Into<String>, expr: Expr) -> Self {
        Self {
            member: member.into(),
            expr,
        }
    }
}

/// Literal operand.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Literal {
    /// `None` / absent.
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    Str(String),
    /// Qualified unit-enum variant (`"Status::Completed"`).
    EnumVariant(String),
}

/// Binary operator set of the restricted grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

impl BinaryOp {
    /// Operator token as written in a directive snippet.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }
}

/// A node of the restricted expression grammar.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr {
    /// The source instance of the projection.
    Source,
    /// The current element inside the nearest enclosing [`Expr::Map`].
    Element,
    /// Member access `base.name`; a `Null` base propagates `Null`.
    Member {
        /// Receiver expression.
        base: Box<Expr>,
        /// Member name.
        name: String,
    },
    /// Literal operand.
    Literal(Literal),
    /// Binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// Logical negation.
    Not(Box<Expr>),
    /// Null test; evaluates to `true` when the operand is not `Null`.
    NotNull(Box<Expr>),
    /// `test ? then : otherwise`.
    Cond {
        /// Boolean test.
        test: Box<Expr>,
        /// Value when the test holds.
        then: Box<Expr>,
        /// Value when it does not.
        otherwise: Box<Expr>,
    },
    /// Inline facet construction from bindings.
    Construct {
        /// Facet type name.
        facet: String,
        /// Member bindings, evaluated against the enclosing root.
        bindings: Vec<Binding>,
    },
    /// Collection projection: evaluate `element` once per item of `source`.
    Map {
        /// Collection-valued expression.
        source: Box<Expr>,
        /// Per-item expression; [`Expr::Element`] refers to the item.
        element: Box<Expr>,
    },
    /// Opaque call into another facet's own projection.
    ///
    /// Emitted instead of inlining when the callee is already being
    /// expanded on the compile-time stack; this is how type-level cycles
    /// stay finite in expression form.
    Call {
        /// Callee facet name.
        facet: String,
        /// Source argument for the callee.
        arg: Box<Expr>,
    },
    /// Rewritten directive text that did not fit the grammar.
    Raw(String),
}

impl Expr {
    /// The source instance.
    #[must_use]
    pub fn source() -> Self {
        Self::Source
    }

    /// The current collection element.
    #[must_use]
    pub fn element() -> Self {
        Self::Element
    }

    /// Member access on `self`.
    #[must_use]
    pub fn member(self, name: impl Into<String>) -> Self {
        Self::Member {
            base: Box::new(self),
            name: name.into(),
        }
    }

    /// `None` literal.
    #[must_use]
    pub fn null() -> Self {
        Self::Literal(Literal::Null)
    }

    /// Boolean literal.
    #[must_use]
    pub fn bool(value: bool) -> Self {
        Self::Literal(Literal::Bool(value))
    }

    /// Integer literal.
    #[must_use]
    pub fn int(value: i64) -> Self {
        Self::Literal(Literal::Int(value))
    }

    /// Float literal.
    #[must_use]
    pub fn float(value: f64) -> Self {
        Self::Literal(Literal::Float(value))
    }

    /// String literal.
    #[must_use]
    pub fn str(value: impl Into<String>) -> Self {
        Self::Literal(Literal::Str(value.into()))
    }

    /// Qualified enum-variant literal.
    #[must_use]
    pub fn enum_variant(path: impl Into<String>) -> Self {
        Self::Literal(Literal::EnumVariant(path.into()))
    }

    /// Binary operation.
    #[must_use]
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Logical negation.
    #[must_use]
    pub fn not(operand: Expr) -> Self {
        Self::Not(Box::new(operand))
    }

    /// Non-null test.
    #[must_use]
    pub fn not_null(operand: Expr) -> Self {
        Self::NotNull(Box::new(operand))
    }

    /// Conditional.
    #[must_use]
    pub fn cond(test: Expr, then: Expr, otherwise: Expr) -> Self {
        Self::Cond {
            test: Box::new(test),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    /// Inline construction.
    #[must_use]
    pub fn construct(facet: impl Into<String>, bindings: Vec<Binding>) -> Self {
        Self::Construct {
            facet: facet.into(),
            bindings,
        }
    }

    /// Collection projection.
    #[must_use]
    pub fn map(source: Expr, element: Expr) -> Self {
        Self::Map {
            source: Box::new(source),
            element: Box::new(element),
        }
    }

    /// Opaque nested-facet call.
    #[must_use]
    pub fn call(facet: impl Into<String>, arg: Expr) -> Self {
        Self::Call {
            facet: facet.into(),
            arg: Box::new(arg),
        }
    }

    /// Opaque rewritten text.
    #[must_use]
    pub fn raw(text: impl Into<String>) -> Self {
        Self::Raw(text.into())
    }

    /// Replace every [`Expr::Source`] node with `base`.
    ///
    /// Used when a nested facet's bindings are inlined into a parent
    /// projection: the nested expressions were built against their own
    /// source root and must be re-anchored at the member path (or at
    /// [`Expr::Element`]) that reaches the nested instance.
    #[must_use]
    pub fn rebase(&self, base: &Expr) -> Self {
        match self {
            Self::Source => base.clone(),
            Self::Element => Self::Element,
            Self::Member { base: b, name } => Self::Member {
                base: Box::new(b.rebase(base)),
                name: name.clone(),
            },
            Self::Literal(lit) => Self::Literal(lit.clone()),
            Self::Binary { op, lhs, rhs } => Self::Binary {
                op: *op,
                lhs: Box::new(lhs.rebase(base)),
                rhs: Box::new(rhs.rebase(base)),
            },
            Self::Not(operand) => Self::Not(Box::new(operand.rebase(base))),
            Self::NotNull(operand) => Self::NotNull(Box::new(operand.rebase(base))),
            Self::Cond {
                test,
                then,
                otherwise,
            } => Self::Cond {
                test: Box::new(test.rebase(base)),
                then: Box::new(then.rebase(base)),
                otherwise: Box::new(otherwise.rebase(base)),
            },
            Self::Construct { facet, bindings } => Self::Construct {
                facet: facet.clone(),
                bindings: bindings
                    .iter()
                    .map(|b| Binding::new(b.member.clone(), b.expr.rebase(base)))
                    .collect(),
            },
            Self::Map { source, element } => Self::Map {
                source: Box::new(source.rebase(base)),
                element: Box::new(element.rebase(base)),
            },
            Self::Call { facet, arg } => Self::Call {
                facet: facet.clone(),
                arg: Box::new(arg.rebase(base)),
            },
            Self::Raw(text) => Self::Raw(text.clone()),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v:?}"),
            Self::EnumVariant(path) => write!(f, "{path}"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "$source"),
            Self::Element => write!(f, "$it"),
            Self::Member { base, name } => write!(f, "{base}.{name}"),
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::Binary { op, lhs, rhs } => {
                write!(f, "({lhs} {} {rhs})", op.symbol())
            }
            Self::Not(operand) => write!(f, "!({operand})"),
            Self::NotNull(operand) => write!(f, "({operand} is not null)"),
            Self::Cond {
                test,
                then,
                otherwise,
            } => write!(f, "({test} ? {then} : {otherwise})"),
            Self::Construct { facet, bindings } => {
                write!(f, "{facet} {{ ")?;
                for (index, binding) in bindings.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", binding.member, binding.expr)?;
                }
                write!(f, " }}")
            }
            Self::Map { source, element } => write!(f, "{source}.map({element})"),
            Self::Call { facet, arg } => write!(f, "{facet}::projection({arg})"),
            Self::Raw(text) => write!(f, "raw({text})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_chain_displays_as_path() {
        let expr = Expr::source().member("address").member("street");
        assert_eq!(expr.to_string(), "$source.address.street");
    }

    #[test]
    fn rebase_replaces_source_anchor() {
        let nested = Expr::source().member("street");
        let rebased = nested.rebase(&Expr::source().member("address"));
        assert_eq!(rebased, Expr::source().member("address").member("street"));
    }

    #[test]
    fn rebase_reaches_into_construct_bindings() {
        let construct = Expr::construct(
            "AddressView",
            vec![Binding::new("street", Expr::source().member("street"))],
        );
        let rebased = construct.rebase(&Expr::element());

        match rebased {
            Expr::Construct { bindings, .. } => {
                assert_eq!(bindings[0].expr, Expr::element().member("street"));
            }
            other => panic!("expected construct, got {other:?}"),
        }
    }

    #[test]
    fn display_renders_conditionals() {
        let expr = Expr::cond(
            Expr::binary(
                BinaryOp::Eq,
                Expr::source().member("status"),
                Expr::enum_variant("Status::Completed"),
            ),
            Expr::source().member("completed_at"),
            Expr::null(),
        );
        assert_eq!(
            expr.to_string(),
            "(($source.status == Status::Completed) ? $source.completed_at : null)"
        );
    }
}
