//! Equality predicates and attribute-side resolution.
//!
//! Only two predicate shapes exist: attribute = attribute and
//! attribute = literal. Both the estimator (for Join nodes) and the join
//! formation pass locate predicate attributes by membership, so the logic
//! lives here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::Attribute;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    AttributeEquality { left: Attribute, right: Attribute },
    ValueEquality { attribute: Attribute, value: String },
}

impl Predicate {
    pub fn attr_eq(left: impl Into<String>, right: impl Into<String>) -> Self {
        Predicate::AttributeEquality {
            left: Attribute::new(left),
            right: Attribute::new(right),
        }
    }

    pub fn value_eq(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::ValueEquality {
            attribute: Attribute::new(attribute),
            value: value.into(),
        }
    }

    /// The left-hand attribute (the only one for literal equality).
    pub fn left(&self) -> &Attribute {
        match self {
            Predicate::AttributeEquality { left, .. } => left,
            Predicate::ValueEquality { attribute, .. } => attribute,
        }
    }

    pub fn right(&self) -> Option<&Attribute> {
        match self {
            Predicate::AttributeEquality { right, .. } => Some(right),
            Predicate::ValueEquality { .. } => None,
        }
    }

    /// Attributes referenced by the predicate, left first.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        std::iter::once(self.left()).chain(self.right())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::AttributeEquality { left, right } => write!(f, "{}={}", left, right),
            Predicate::ValueEquality { attribute, value } => {
                write!(f, "{}=\"{}\"", attribute, value)
            }
        }
    }
}

/// Which input of a binary operator produces an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Place `name` on exactly one side given its membership in each.
pub fn locate(name: &str, in_left: bool, in_right: bool) -> Result<Side> {
    match (in_left, in_right) {
        (true, false) => Ok(Side::Left),
        (false, true) => Ok(Side::Right),
        (true, true) => Err(Error::AmbiguousAttribute(name.to_string())),
        (false, false) => Err(Error::AttributeNotFound(name.to_string())),
    }
}

/// Resolve an attribute-equality predicate against the two inputs of a
/// binary operator, in either binding. Returns `(left_side, right_side)`
/// for the predicate's `(left, right)` attributes; the two always differ.
///
/// When both attributes live on the same side, the one listed second is
/// reported missing from the other input.
pub fn resolve_equality(
    left: &Attribute,
    right: &Attribute,
    in_left: impl Fn(&str) -> bool,
    in_right: impl Fn(&str) -> bool,
) -> Result<(Side, Side)> {
    let l = locate(&left.name, in_left(&left.name), in_right(&left.name))?;
    let r = locate(&right.name, in_left(&right.name), in_right(&right.name))?;
    if l == r {
        return Err(Error::AttributeNotFound(right.name.clone()));
    }
    Ok((l, r))
}
