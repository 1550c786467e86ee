#![forbid(unsafe_code)]
//! relopt-planner: canonical plan → estimated plan → rewritten plan.
//!
//! Design:
//! - We reuse `relopt-core::dag::Operator` as the only plan representation.
//! - This crate adds:
//!     * the cardinality estimator and a cost summary (`cost`)
//!     * four heuristic rewrite passes and their driver (`rules`)
//!     * a YAML catalogue loader and a small SELECT/FROM/WHERE parser (`dsl`)
//!     * an indented plan printer (`explain`)
//!
//! Rewrite passes only ever ask structural schema questions; estimates are
//! for reporting before and after optimization.

pub mod cost;
pub mod dsl;
pub mod explain;
pub mod rules;

pub use cost::{estimate, estimated, plan_cost, PlanCost};
pub use dsl::query::{parse_query, Query};
pub use dsl::yaml::parse_yaml_catalogue;
pub use dsl::ParseError;
pub use explain::explain;
pub use rules::{optimize, Optimizer, Pass};
