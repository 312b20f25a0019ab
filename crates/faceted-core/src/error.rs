// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Runtime error types for generated transforms and the evaluator.

use thiserror::Error;

/// Errors raised by reverse transforms (`into_source`).
///
/// Forward transforms and expression-form transforms never fail; the reverse
/// direction is fallible only where a facet stores a lossy encoding of a
/// source member, today exclusively enum representations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReverseError {
    /// An encoded enum value had no matching variant.
    #[error("value `{value}` is not a variant of `{ty}`")]
    Enum {
        /// Enum type name.
        ty: String,
        /// Offending encoded value.
        value: String,
    },
}

impl ReverseError {
    /// Build a [`ReverseError::Enum`].
    #[must_use]
    pub fn enum_value(ty: impl Into<String>, value: impl std::fmt::Display) -> Self {
        Self::Enum {
            ty: ty.into(),
            value: value.to_string(),
        }
    }
}

/// Errors raised by [`crate::eval::Evaluator`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// An object had no member of the requested name.
    #[error("member `{member}` not found on value")]
    MissingMember {
        /// Requested member name.
        member: String,
    },
    /// Operand types did not fit the operator.
    #[error("operator `{op}` cannot be applied to {detail}")]
    TypeMismatch {
        /// Operator symbol.
        op: &'static str,
        /// Human-readable operand description.
        detail: String,
    },
    /// `Element` was evaluated outside a `Map`.
    #[error("collection element referenced outside a map")]
    ElementOutsideMap,
    /// A `Call` named a projection the evaluator does not know.
    #[error("projection `{facet}` is not registered")]
    UnknownProjection {
        /// Callee facet name.
        facet: String,
    },
    /// Nested `Call` evaluation exceeded [`crate::DEPTH_CEILING`].
    #[error("projection call depth exceeded the ceiling of {ceiling}")]
    DepthExceeded {
        /// The ceiling that was hit.
        ceiling: usize,
    },
    /// A `Raw` node cannot be interpreted.
    #[error("opaque expression fragment cannot be evaluated: {text}")]
    Opaque {
        /// The raw fragment text.
        text: String,
    },
}
