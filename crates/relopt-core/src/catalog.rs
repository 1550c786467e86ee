//! Base relation statistics, looked up by name.
//!
//! The catalogue is populated before planning and is read-only afterwards.
//! Scan nodes hold an `Arc` to the base relation they read, so estimation
//! never has to go back to the catalogue.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::{Attribute, Relation};

/// A named base relation with its statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseRelation {
    pub name: String,
    pub relation: Relation,
}

/// Read-only lookup of base relations.
pub trait Catalogue {
    fn relation(&self, name: &str) -> Result<Arc<BaseRelation>>;
}

/// In-memory catalogue; relations keep a deterministic (sorted) order.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalogue {
    relations: BTreeMap<String, Arc<BaseRelation>>,
}

impl MemoryCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an empty relation. Redeclaring a name is a schema error.
    pub fn create_relation(&mut self, name: impl Into<String>, tuple_count: u64) -> Result<()> {
        let name = name.into();
        if self.relations.contains_key(&name) {
            return Err(Error::Schema(format!("relation {} declared twice", name)));
        }
        let base = BaseRelation {
            name: name.clone(),
            relation: Relation::new(tuple_count),
        };
        self.relations.insert(name, Arc::new(base));
        Ok(())
    }

    /// Add an attribute with its distinct-value count to a declared relation.
    pub fn create_attribute(
        &mut self,
        relation: &str,
        name: impl Into<String>,
        value_count: u64,
    ) -> Result<()> {
        let name = name.into();
        let entry = self
            .relations
            .get_mut(relation)
            .ok_or_else(|| Error::UnknownRelation(relation.to_string()))?;
        if entry.relation.contains(&name) {
            return Err(Error::Schema(format!(
                "attribute {} declared twice in relation {}",
                name, relation
            )));
        }
        Arc::make_mut(entry)
            .relation
            .push(Attribute::with_count(name, value_count));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.relations.keys().map(String::as_str)
    }
}

impl Catalogue for MemoryCatalogue {
    fn relation(&self, name: &str) -> Result<Arc<BaseRelation>> {
        self.relations
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownRelation(name.to_string()))
    }
}
