//! Convenient re-exports for downstream crates.

pub use crate::catalog::{BaseRelation, Catalogue, MemoryCatalogue};
pub use crate::config::PlannerConfig;
pub use crate::dag::Operator;
pub use crate::error::{Error, Result};
pub use crate::expr::{Predicate, Side};
pub use crate::hash::Hash256;
pub use crate::schema::{Attribute, Relation};
