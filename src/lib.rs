#![forbid(unsafe_code)]
//! relopt: cardinality estimation and heuristic rewriting of logical
//! query plans.
//!
//! Re-exports the workspace crates under one name.

pub use relopt_core;
pub use relopt_planner;

pub use relopt_core::prelude::*;
pub use relopt_planner::{
    estimate, estimated, explain, optimize, parse_query, parse_yaml_catalogue, plan_cost,
    Optimizer, Pass, PlanCost,
};
