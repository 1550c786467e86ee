//! Heuristic rewrite passes and the driver that runs them in order.

pub mod join;
pub mod left_deep;
pub mod projection;
pub mod selection;

use std::collections::BTreeSet;

pub use join::form_joins;
pub use left_deep::left_deep;
pub use projection::{initial_need_set, push_projections, push_projections_with};
pub use selection::push_selections;

use relopt_core::config::PlannerConfig;
use relopt_core::dag::Operator;
use relopt_core::error::{Error, Result};

/// One rewrite pass. Passes always run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    LeftDeep,
    PushSelections,
    FormJoins,
    PushProjections,
}

impl Pass {
    pub const ALL: [Pass; 4] = [
        Pass::LeftDeep,
        Pass::PushSelections,
        Pass::FormJoins,
        Pass::PushProjections,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Pass::LeftDeep => "left-deep",
            Pass::PushSelections => "push-selections",
            Pass::FormJoins => "form-joins",
            Pass::PushProjections => "push-projections",
        }
    }

    fn enabled(self, config: &PlannerConfig) -> bool {
        match self {
            Pass::LeftDeep => config.left_deep,
            Pass::PushSelections => config.push_selections,
            Pass::FormJoins => config.form_joins,
            Pass::PushProjections => config.push_projections,
        }
    }
}

/// Runs the enabled passes over a plan.
#[derive(Debug, Clone, Default)]
pub struct Optimizer {
    config: PlannerConfig,
}

impl Optimizer {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Rewrite `plan` into its optimized equivalent. The input is not modified.
    pub fn optimize(&self, plan: &Operator) -> Result<Operator> {
        let mut steps = self.optimize_steps(plan)?;
        Ok(steps.pop().map(|(_, p)| p).unwrap_or_else(|| plan.clone()))
    }

    /// Like [`Optimizer::optimize`], but returns the plan after every
    /// enabled pass.
    pub fn optimize_steps(&self, plan: &Operator) -> Result<Vec<(Pass, Operator)>> {
        // Both are taken from the input tree before any rewriting.
        let needed = initial_need_set(plan);
        let root = plan.reachable_attributes();

        let mut steps: Vec<(Pass, Operator)> = Vec::new();
        let mut current = plan.clone();
        for pass in Pass::ALL {
            if !pass.enabled(&self.config) {
                continue;
            }
            current = match pass {
                Pass::LeftDeep => left_deep(&current),
                Pass::PushSelections => push_selections(&current)?,
                Pass::FormJoins => form_joins(&current)?,
                Pass::PushProjections => push_projections_with(&current, &needed)?,
            };

            #[cfg(feature = "tracing")]
            tracing::debug!(pass = pass.name(), plan = %current, "rewrite pass done");

            if self.config.check_invariants {
                check_invariants(pass, &current, &root)?;
            }
            steps.push((pass, current.clone()));
        }
        Ok(steps)
    }
}

fn check_invariants(pass: Pass, plan: &Operator, root: &BTreeSet<String>) -> Result<()> {
    if pass == Pass::LeftDeep && !plan.is_left_deep() {
        return Err(Error::Invariant(format!(
            "plan is not left-deep after {}",
            pass.name()
        )));
    }
    let after = plan.reachable_attributes();
    if &after != root {
        let lost: Vec<&String> = root.difference(&after).collect();
        let gained: Vec<&String> = after.difference(root).collect();
        return Err(Error::Invariant(format!(
            "{} changed the root attributes (lost {:?}, gained {:?})",
            pass.name(),
            lost,
            gained
        )));
    }
    Ok(())
}

/// Optimize with every pass enabled.
pub fn optimize(plan: &Operator) -> Result<Operator> {
    Optimizer::default().optimize(plan)
}
