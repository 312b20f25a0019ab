// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! The token rewriter.
//!
//! Directive snippets (`status == Status::Completed`, `age * 2`) name
//! source members as free identifiers. [`rewrite`] requalifies them against
//! the source variable in a single left-to-right scan with a small state
//! machine — no parsing, no validation. The identical rewritten text feeds
//! both emitters, which is what keeps the eager and expression forms in
//! agreement.
//!
//! An identifier is left untouched when it is:
//!
//! - inside a string or char literal
//! - a keyword or literal token (`true`, `None`, `Some`, `if`, …)
//! - immediately preceded by `.` (already member-accessed)
//! - immediately followed by `::` (a path or type qualifier)
//! - a call or macro invocation (`len(`, `format!(`)
//! - numeric (starts with a digit)
//!
//! [`lift`] is the follow-on pattern classifier: rewritten snippets of the
//! restricted shape (member paths, literals, comparison/boolean/arithmetic
//! operators, no parentheses) become structured [`Expr`] trees for the
//! expression form; everything else stays an opaque raw node.

use faceted_core::expr::{BinaryOp, Expr};

const KEYWORDS: &[&str] = &[
    "true", "false", "None", "Some", "Ok", "Err", "self", "Self", "if", "else", "match", "as",
    "in", "let", "fn", "move", "return",
];

/// Requalify free identifiers in `snippet` against `source_var`.
#[must_use]
pub fn rewrite(snippet: &str, source_var: &str) -> String {
    let chars: Vec<char> = snippet.chars().collect();
    let mut out = String::with_capacity(snippet.len() + 16);
    let mut prev: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '"' || c == '\'' {
            i = copy_literal(&chars, i, &mut out);
            prev = Some(c);
            continue;
        }
        if c.is_ascii_alphanumeric() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let token: String = chars[start..i].iter().collect();
            if qualifies(&token, source_var, prev, &chars, i) {
                out.push_str(source_var);
                out.push('.');
            }
            out.push_str(&token);
            prev = chars.get(i - 1).copied();
            continue;
        }
        out.push(c);
        if !c.is_whitespace() {
            prev = Some(c);
        }
        i += 1;
    }

    out
}

/// Copy a string/char literal verbatim, honoring backslash escapes.
fn copy_literal(chars: &[char], mut i: usize, out: &mut String) -> usize {
    let quote = chars[i];
    out.push(quote);
    i += 1;
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        i += 1;
        if c == '\\' && i < chars.len() {
            out.push(chars[i]);
            i += 1;
        } else if c == quote {
            break;
        }
    }
    i
}

fn qualifies(
    token: &str,
    source_var: &str,
    prev: Option<char>,
    chars: &[char],
    after: usize,
) -> bool {
    if token.starts_with(|c: char| c.is_ascii_digit()) {
        return false;
    }
    if KEYWORDS.contains(&token) || token == source_var {
        return false;
    }
    if prev == Some('.') {
        return false;
    }

    let mut j = after;
    while j < chars.len() && chars[j].is_whitespace() {
        j += 1;
    }
    let next = chars.get(j).copied();
    let next2 = chars.get(j + 1).copied();
    // Path qualifier (`Status::Completed`).
    if next == Some(':') && next2 == Some(':') {
        return false;
    }
    // Call (`len(..)`) or macro (`format!(..)`); `!=` is an operator, not
    // a macro bang.
    if next == Some('(') {
        return false;
    }
    if next == Some('!') && matches!(next2, Some('(' | '[' | '{')) {
        return false;
    }
    true
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Member(Vec<String>),
    TypePath(String),
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
    Op(BinaryOp),
    Not,
}

/// Lift a rewritten snippet into the restricted expression grammar.
///
/// Returns `None` when the snippet does not fit — the caller falls back to
/// an opaque [`Expr::Raw`] node. Deliberately minimal: a pattern
/// classifier, not an expression parser.
#[must_use]
pub fn lift(rewritten: &str, source_var: &str) -> Option<Expr> {
    let tokens = tokenize(rewritten, source_var)?;
    let mut parser = Lifter {
        tokens,
        position: 0,
    };
    let expr = parser.or_expr()?;
    if parser.position == parser.tokens.len() {
        Some(expr)
    } else {
        None
    }
}

fn tokenize(text: &str, source_var: &str) -> Option<Vec<Tok>> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_alphabetic() || c == '_' {
            let (token, next) = ident_token(&chars, i, source_var)?;
            tokens.push(token);
            i = next;
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.' || chars[i] == '_')
            {
                i += 1;
            }
            // A trailing suffix (`1u32`) is outside the lift grammar.
            if i < chars.len() && chars[i].is_ascii_alphabetic() {
                return None;
            }
            let text: String = chars[start..i].iter().filter(|c| **c != '_').collect();
            if text.contains('.') {
                tokens.push(Tok::Float(text.parse().ok()?));
            } else {
                tokens.push(Tok::Int(text.parse().ok()?));
            }
        } else if c == '"' {
            let mut value = String::new();
            i += 1;
            loop {
                let c = *chars.get(i)?;
                i += 1;
                if c == '\\' {
                    value.push(*chars.get(i)?);
                    i += 1;
                } else if c == '"' {
                    break;
                } else {
                    value.push(c);
                }
            }
            tokens.push(Tok::Str(value));
        } else {
            let next = chars.get(i + 1).copied();
            let (token, width) = match (c, next) {
                ('=', Some('=')) => (Tok::Op(BinaryOp::Eq), 2),
                ('!', Some('=')) => (Tok::Op(BinaryOp::Ne), 2),
                ('<', Some('=')) => (Tok::Op(BinaryOp::Le), 2),
                ('>', Some('=')) => (Tok::Op(BinaryOp::Ge), 2),
                ('&', Some('&')) => (Tok::Op(BinaryOp::And), 2),
                ('|', Some('|')) => (Tok::Op(BinaryOp::Or), 2),
                ('<', _) => (Tok::Op(BinaryOp::Lt), 1),
                ('>', _) => (Tok::Op(BinaryOp::Gt), 1),
                ('+', _) => (Tok::Op(BinaryOp::Add), 1),
                ('-', _) => (Tok::Op(BinaryOp::Sub), 1),
                ('*', _) => (Tok::Op(BinaryOp::Mul), 1),
                ('/', _) => (Tok::Op(BinaryOp::Div), 1),
                ('!', _) => (Tok::Not, 1),
                _ => return None,
            };
            tokens.push(token);
            i += width;
        }
    }

    Some(tokens)
}

/// Scan an identifier-led token: a member path rooted at the source
/// variable, a qualified type path, or a literal word.
fn ident_token(chars: &[char], mut i: usize, source_var: &str) -> Option<(Tok, usize)> {
    let mut segments = vec![String::new()];
    let mut qualified = false;

    loop {
        while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
            segments.last_mut()?.push(chars[i]);
            i += 1;
        }
        if i + 1 < chars.len() && chars[i] == ':' && chars[i + 1] == ':' {
            qualified = true;
            segments.push(String::new());
            i += 2;
        } else if !qualified && i < chars.len() && chars[i] == '.' {
            segments.push(String::new());
            i += 1;
        } else {
            break;
        }
    }

    if segments.iter().any(String::is_empty) {
        return None;
    }

    let token = if qualified {
        Tok::TypePath(segments.join("::"))
    } else if segments.len() == 1 {
        match segments[0].as_str() {
            "true" => Tok::Bool(true),
            "false" => Tok::Bool(false),
            "None" => Tok::Null,
            _ => return None,
        }
    } else if segments[0] == source_var {
        Tok::Member(segments[1..].to_vec())
    } else {
        return None;
    };
    Some((token, i))
}

struct Lifter {
    tokens: Vec<Tok>,
    position: usize,
}

impl Lifter {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.position)
    }

    fn take_op(&mut self, accept: &[BinaryOp]) -> Option<BinaryOp> {
        if let Some(Tok::Op(op)) = self.peek()
            && accept.contains(op)
        {
            let op = *op;
            self.position += 1;
            return Some(op);
        }
        None
    }

    fn or_expr(&mut self) -> Option<Expr> {
        let mut lhs = self.and_expr()?;
        while self.take_op(&[BinaryOp::Or]).is_some() {
            let rhs = self.and_expr()?;
            lhs = Expr::binary(BinaryOp::Or, lhs, rhs);
        }
        Some(lhs)
    }

    fn and_expr(&mut self) -> Option<Expr> {
        let mut lhs = self.cmp_expr()?;
        while self.take_op(&[BinaryOp::And]).is_some() {
            let rhs = self.cmp_expr()?;
            lhs = Expr::binary(BinaryOp::And, lhs, rhs);
        }
        Some(lhs)
    }

    fn cmp_expr(&mut self) -> Option<Expr> {
        let lhs = self.add_expr()?;
        if let Some(op) = self.take_op(&[
            BinaryOp::Eq,
            BinaryOp::Ne,
            BinaryOp::Lt,
            BinaryOp::Le,
            BinaryOp::Gt,
            BinaryOp::Ge,
        ]) {
            let rhs = self.add_expr()?;
            return Some(Expr::binary(op, lhs, rhs));
        }
        Some(lhs)
    }

    fn add_expr(&mut self) -> Option<Expr> {
        let mut lhs = self.mul_expr()?;
        while let Some(op) = self.take_op(&[BinaryOp::Add, BinaryOp::Sub]) {
            let rhs = self.mul_expr()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Some(lhs)
    }

    fn mul_expr(&mut self) -> Option<Expr> {
        let mut lhs = self.unary_expr()?;
        while let Some(op) = self.take_op(&[BinaryOp::Mul, BinaryOp::Div]) {
            let rhs = self.unary_expr()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Some(lhs)
    }

    fn unary_expr(&mut self) -> Option<Expr> {
        if matches!(self.peek(), Some(Tok::Not)) {
            self.position += 1;
            return Some(Expr::not(self.unary_expr()?));
        }
        self.operand()
    }

    fn operand(&mut self) -> Option<Expr> {
        let token = self.peek()?.clone();
        self.position += 1;
        Some(match token {
            Tok::Member(segments) => segments
                .iter()
                .fold(Expr::source(), |expr, segment| expr.member(segment)),
            Tok::TypePath(path) => Expr::enum_variant(path),
            Tok::Int(value) => Expr::int(value),
            Tok::Float(value) => Expr::float(value),
            Tok::Str(value) => Expr::str(value),
            Tok::Bool(value) => Expr::bool(value),
            Tok::Null => Expr::null(),
            Tok::Op(_) | Tok::Not => return None,
        })
    }
}
