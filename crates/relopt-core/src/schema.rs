//! Attribute and relation schemas. Pure data; statistics are carried as
//! plain counts and only interpreted by the planner's estimator.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A named column, optionally carrying an estimated distinct-value count.
///
/// Equality and hashing look at the name only: `persid` with 400 distinct
/// values and a bare `persid` reference from a predicate are the same
/// attribute.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_count: Option<u64>,
}

impl Attribute {
    /// A bare attribute reference with no statistics.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_count: None,
        }
    }

    pub fn with_count(name: impl Into<String>, value_count: u64) -> Self {
        Self {
            name: name.into(),
            value_count: Some(value_count),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Hash for Attribute {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Ordered attributes plus an estimated tuple count.
///
/// Base relations keep names unique (the catalogue enforces it); the output
/// of a Product or Join may list the same name once per side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub attributes: Vec<Attribute>,
    pub tuple_count: u64,
}

impl Relation {
    pub fn new(tuple_count: u64) -> Self {
        Self {
            attributes: Vec::new(),
            tuple_count,
        }
    }

    pub fn with_attributes(tuple_count: u64, attributes: Vec<Attribute>) -> Self {
        Self {
            attributes,
            tuple_count,
        }
    }

    pub fn push(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// First attribute with the given name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }
}
