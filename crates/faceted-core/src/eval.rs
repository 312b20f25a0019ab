// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! In-memory interpretation of expression-form transforms.
//!
//! The [`Evaluator`] applies a [`Projection`] to a [`Value`] tree and yields
//! the projected [`Value`]. It exists for two consumers: query planners that
//! want a local fallback when a projection cannot be pushed down, and tests
//! that check the expression form against the eager transform member for
//! member.
//!
//! Evaluation is total over the grammar except for [`Expr::Raw`] fragments,
//! which fail with [`EvalError::Opaque`] by design.

use std::collections::BTreeMap;

use crate::{
    DEPTH_CEILING, EvalError,
    expr::{BinaryOp, Expr, Literal, Projection},
    value::Value,
};

/// Applies projections to dynamic values.
///
/// Nested [`Expr::Call`] nodes resolve against the projections registered
/// here; register every facet of a compilation unit before evaluating one
/// that references the others.
#[derive(Debug, Default)]
pub struct Evaluator {
    projections: BTreeMap<String, Projection>,
}

impl Evaluator {
    /// Create an evaluator with no registered projections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a projection under its facet name.
    pub fn register(&mut self, projection: Projection) {
        self.projections
            .insert(projection.facet.clone(), projection);
    }

    /// Apply the registered projection `facet` to `source`.
    ///
    /// # Errors
    ///
    /// [`EvalError::UnknownProjection`] when `facet` was never registered,
    /// otherwise whatever evaluating its bindings raises.
    pub fn project(&self, facet: &str, source: &Value) -> Result<Value, EvalError> {
        let projection =
            self.projections
                .get(facet)
                .ok_or_else(|| EvalError::UnknownProjection {
                    facet: facet.to_string(),
                })?;
        self.apply(projection, source, 0)
    }

    /// Evaluate a single expression against `source`.
    ///
    /// # Errors
    ///
    /// Propagates any [`EvalError`] the expression raises.
    pub fn eval(&self, expr: &Expr, source: &Value) -> Result<Value, EvalError> {
        self.eval_at(expr, source, None, 0)
    }

    fn apply(
        &self,
        projection: &Projection,
        source: &Value,
        depth: usize,
    ) -> Result<Value, EvalError> {
        let mut members = BTreeMap::new();
        for binding in &projection.bindings {
            let value = self.eval_at(&binding.expr, source, None, depth)?;
            members.insert(binding.member.clone(), value);
        }
        Ok(Value::Object(members))
    }

    fn eval_at(
        &self,
        expr: &Expr,
        root: &Value,
        element: Option<&Value>,
        depth: usize,
    ) -> Result<Value, EvalError> {
        match expr {
            Expr::Source => Ok(root.clone()),
            Expr::Element => element.cloned().ok_or(EvalError::ElementOutsideMap),
            Expr::Member { base, name } => {
                let base = self.eval_at(base, root, element, depth)?;
                match base {
                    Value::Null => Ok(Value::Null),
                    Value::Object(members) => members
                        .get(name)
                        .cloned()
                        .ok_or_else(|| EvalError::MissingMember {
                            member: name.clone(),
                        }),
                    other => Err(EvalError::TypeMismatch {
                        op: ".",
                        detail: format!("non-object value {other:?}"),
                    }),
                }
            }
            Expr::Literal(literal) => Ok(literal_value(literal)),
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.eval_at(lhs, root, element, depth)?;
                // Short-circuit before touching the right operand.
                if let Some(short) = short_circuit(*op, &lhs) {
                    return Ok(short);
                }
                let rhs = self.eval_at(rhs, root, element, depth)?;
                binary(*op, lhs, rhs)
            }
            Expr::Not(operand) => match self.eval_at(operand, root, element, depth)? {
                Value::Bool(value) => Ok(Value::Bool(!value)),
                other => Err(EvalError::TypeMismatch {
                    op: "!",
                    detail: format!("{other:?}"),
                }),
            },
            Expr::NotNull(operand) => {
                let value = self.eval_at(operand, root, element, depth)?;
                Ok(Value::Bool(!value.is_null()))
            }
            Expr::Cond {
                test,
                then,
                otherwise,
            } => match self.eval_at(test, root, element, depth)? {
                Value::Bool(true) => self.eval_at(then, root, element, depth),
                Value::Bool(false) => self.eval_at(otherwise, root, element, depth),
                other => Err(EvalError::TypeMismatch {
                    op: "?:",
                    detail: format!("non-boolean test {other:?}"),
                }),
            },
            Expr::Construct { bindings, .. } => {
                let mut members = BTreeMap::new();
                for binding in bindings {
                    let value = self.eval_at(&binding.expr, root, element, depth)?;
                    members.insert(binding.member.clone(), value);
                }
                Ok(Value::Object(members))
            }
            Expr::Map {
                source,
                element: per_item,
            } => match self.eval_at(source, root, element, depth)? {
                Value::Null => Ok(Value::Null),
                Value::List(items) => {
                    let mut projected = Vec::with_capacity(items.len());
                    for item in &items {
                        projected.push(self.eval_at(per_item, root, Some(item), depth)?);
                    }
                    Ok(Value::List(projected))
                }
                other => Err(EvalError::TypeMismatch {
                    op: "map",
                    detail: format!("non-collection value {other:?}"),
                }),
            },
            Expr::Call { facet, arg } => {
                let arg = self.eval_at(arg, root, element, depth)?;
                if arg.is_null() {
                    return Ok(Value::Null);
                }
                if depth + 1 > DEPTH_CEILING {
                    return Err(EvalError::DepthExceeded {
                        ceiling: DEPTH_CEILING,
                    });
                }
                let projection =
                    self.projections
                        .get(facet)
                        .ok_or_else(|| EvalError::UnknownProjection {
                            facet: facet.clone(),
                        })?;
                self.apply(projection, &arg, depth + 1)
            }
            Expr::Raw(text) => Err(EvalError::Opaque { text: text.clone() }),
        }
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Null => Value::Null,
        Literal::Bool(value) => Value::Bool(*value),
        Literal::Int(value) => Value::Int(*value),
        Literal::Float(value) => Value::Float(*value),
        Literal::Str(value) => Value::Str(value.clone()),
        Literal::EnumVariant(path) => Value::Enum(path.clone()),
    }
}

fn short_circuit(op: BinaryOp, lhs: &Value) -> Option<Value> {
    match (op, lhs) {
        (BinaryOp::And, Value::Bool(false)) => Some(Value::Bool(false)),
        (BinaryOp::Or, Value::Bool(true)) => Some(Value::Bool(true)),
        _ => None,
    }
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    use BinaryOp::{Add, And, Div, Eq, Ge, Gt, Le, Lt, Mul, Ne, Or, Sub};

    match op {
        Eq => Ok(Value::Bool(lhs == rhs)),
        Ne => Ok(Value::Bool(lhs != rhs)),
        And | Or => match (lhs, rhs) {
            (Value::Bool(l), Value::Bool(r)) => Ok(Value::Bool(if op == And {
                l && r
            } else {
                l || r
            })),
            (l, r) => Err(mismatch(op, &l, &r)),
        },
        Lt | Le | Gt | Ge => compare(op, lhs, rhs),
        Add | Sub | Mul | Div => arithmetic(op, lhs, rhs),
    }
}

fn compare(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    let ordering = match (&lhs, &rhs) {
        (Value::Int(l), Value::Int(r)) => l.partial_cmp(r),
        (Value::Float(l), Value::Float(r)) => l.partial_cmp(r),
        (Value::Str(l), Value::Str(r)) => l.partial_cmp(r),
        _ => None,
    };
    let Some(ordering) = ordering else {
        return Err(mismatch(op, &lhs, &rhs));
    };
    let holds = match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Le => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::Ge => ordering.is_ge(),
        _ => unreachable!("compare called with non-ordering operator"),
    };
    Ok(Value::Bool(holds))
}

fn arithmetic(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    match (op, lhs, rhs) {
        (BinaryOp::Add, Value::Str(l), Value::Str(r)) => Ok(Value::Str(l + &r)),
        (op, Value::Int(l), Value::Int(r)) => Ok(Value::Int(match op {
            BinaryOp::Add => l + r,
            BinaryOp::Sub => l - r,
            BinaryOp::Mul => l * r,
            BinaryOp::Div => l / r,
            _ => unreachable!("arithmetic called with non-arithmetic operator"),
        })),
        (op, Value::Float(l), Value::Float(r)) => Ok(Value::Float(match op {
            BinaryOp::Add => l + r,
            BinaryOp::Sub => l - r,
            BinaryOp::Mul => l * r,
            BinaryOp::Div => l / r,
            _ => unreachable!("arithmetic called with non-arithmetic operator"),
        })),
        (op, l, r) => Err(mismatch(op, &l, &r)),
    }
}

fn mismatch(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalError {
    EvalError::TypeMismatch {
        op: op.symbol(),
        detail: format!("{lhs:?} and {rhs:?}"),
    }
}
