// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Dynamic value model for in-memory expression evaluation.
//!
//! Query planners translate [`crate::expr::Projection`] trees into their own
//! target language; the [`crate::eval::Evaluator`] instead interprets them
//! directly over this model. [`Value`] is deliberately small: it only needs
//! to mirror the shapes the restricted expression grammar can touch.

use std::collections::BTreeMap;

/// A dynamically typed value.
///
/// `Enum` carries the fully qualified variant path (`"Status::Completed"`)
/// so enum literals in predicates compare without knowing the Rust type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Absent value; the evaluation image of `None`.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer (all Rust integer widths collapse here).
    Int(i64),
    /// Floating point.
    Float(f64),
    /// String.
    Str(String),
    /// Unit enum variant by qualified path.
    Enum(String),
    /// Ordered collection.
    List(Vec<Value>),
    /// Named-member aggregate.
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Build an [`Value::Object`] from `(name, value)` pairs.
    #[must_use]
    pub fn object<I, K, V>(members: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Object(
            members
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }

    /// Build a [`Value::List`].
    #[must_use]
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a [`Value::Enum`] from a qualified variant path.
    #[must_use]
    pub fn enum_variant(path: impl Into<String>) -> Self {
        Self::Enum(path.into())
    }

    /// `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Member lookup on objects; `Null` propagates, everything else is
    /// `None`.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Object(members) => members.get(name),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_builder_and_member_access() {
        let person = Value::object([
            ("first_name", Value::from("Ann")),
            ("age", Value::from(33)),
        ]);

        assert_eq!(person.member("first_name"), Some(&Value::Str("Ann".into())));
        assert_eq!(person.member("missing"), None);
    }

    #[test]
    fn option_conversion_maps_none_to_null() {
        let absent: Option<i64> = None;
        assert_eq!(Value::from(absent), Value::Null);
        assert_eq!(Value::from(Some(4_i64)), Value::Int(4));
    }
}
