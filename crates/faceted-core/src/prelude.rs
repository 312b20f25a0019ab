// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Convenient re-exports for consumers of generated facets.
//!
//! ```rust,ignore
//! use faceted_core::prelude::*;
//!
//! let view = PersonView::from_source(&person);
//! let plan = PersonView::projection();
//! ```

pub use crate::{
    DEPTH_CEILING, EvalError, ReverseError, VisitedSet, effective_depth,
    eval::Evaluator,
    expr::{BinaryOp, Binding, Expr, Literal, Projection},
    value::Value,
};
