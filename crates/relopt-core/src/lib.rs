#![forbid(unsafe_code)]
//! relopt-core: shared kernel for the relopt optimizer.
//!
//! This crate contains only *pure* types and small helpers: the operator
//! tree, attribute/relation schemas, predicates, the catalogue interface,
//! planner configuration, and plan fingerprinting. There is **no I/O** and
//! no statistics arithmetic here.
//!
//! Crates that use this:
//! - relopt-planner: estimates plans and rewrites them using these types.
//! - relopt-cli: loads catalogues/queries and prints plans.

pub mod catalog;
pub mod config;
pub mod dag;
pub mod error;
pub mod expr;
pub mod hash;
pub mod prelude;
pub mod schema;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
