// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Structured configuration diagnostics.
//!
//! The compiler never raises mid-pass: resolvers and emitters report
//! configuration problems here and skip the affected definition, letting the
//! rest of the compilation unit generate. The front end decides how to
//! surface the sink — the proc macro turns error-severity entries into
//! `compile_error!` tokens at the recorded span.
//!
//! # Codes
//!
//! | Code | Severity | Meaning |
//! |--------|----------|---------|
//! | FCT001 | error | unknown source type |
//! | FCT002 | error | include/exclude names a member not on the source |
//! | FCT003 | error | both `include` and `exclude` supplied |
//! | FCT004 | info | several facets share one source; first wins for nesting |
//! | FCT005 | warning | `max_depth` above the ceiling, clamped |
//! | FCT006 | error | expression rename without an explicit `ty` |
//! | FCT007 | error | rename `from` member not found on the source |
//! | FCT008 | error | conditional on an unknown member |
//! | FCT009 | error | `enum_repr` on a non-enum or non-unit enum member |
//! | FCT010 | warning | renamed member was also excluded; rename wins |
//! | FCT011 | error | dotted rename path does not resolve |
//! | FCT012 | error | directive produces a duplicate member name |
//! | FCT013 | warning | nested facet lacks a reverse transform |
//! | FCT014 | warning | member shape unsupported for this resolver |
//! | FCT015 | error | directive snippet is not a parseable expression |
//! | FCT016 | warning | flatten exclusion path matched nothing |
//! | FCT017 | error | nested facet was skipped; dependents skipped too |

use proc_macro2::Span;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Configuration error; the definition is skipped.
    Error,
    /// Suspicious but generable.
    Warning,
    /// Informational.
    Info,
}

/// One structured diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Stable code (`FCT001`…).
    pub code: &'static str,
    /// Severity.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Dotted location, e.g. `PersonView.completed_at`.
    pub location: String,
    /// Span for editor surfacing, when one is known.
    pub span: Option<Span>,
}

/// Accumulating diagnostics sink for one compilation pass.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error.
    pub fn error(
        &mut self,
        code: &'static str,
        location: impl Into<String>,
        message: impl Into<String>,
        span: Option<Span>,
    ) {
        self.push(code, Severity::Error, location, message, span);
    }

    /// Record a warning.
    pub fn warning(
        &mut self,
        code: &'static str,
        location: impl Into<String>,
        message: impl Into<String>,
        span: Option<Span>,
    ) {
        self.push(code, Severity::Warning, location, message, span);
    }

    /// Record an informational entry.
    pub fn info(
        &mut self,
        code: &'static str,
        location: impl Into<String>,
        message: impl Into<String>,
        span: Option<Span>,
    ) {
        self.push(code, Severity::Info, location, message, span);
    }

    fn push(
        &mut self,
        code: &'static str,
        severity: Severity,
        location: impl Into<String>,
        message: impl Into<String>,
        span: Option<Span>,
    ) {
        self.items.push(Diagnostic {
            code,
            severity,
            message: message.into(),
            location: location.into(),
            span,
        });
    }

    /// All recorded diagnostics, in emission order.
    #[must_use]
    pub fn items(&self) -> &[Diagnostic] {
        &self.items
    }

    /// `true` when at least one error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.items
            .iter()
            .any(|item| item.severity == Severity::Error)
    }

    /// Errors recorded against a definition, by exact name or a dotted
    /// member location under it.
    ///
    /// Used to decide whether a definition accumulated errors during
    /// resolution and must be skipped at emission.
    #[must_use]
    pub fn has_errors_at(&self, definition: &str) -> bool {
        self.items.iter().any(|item| {
            item.severity == Severity::Error
                && (item.location == definition
                    || item
                        .location
                        .strip_prefix(definition)
                        .is_some_and(|rest| rest.starts_with('.')))
        })
    }
}
