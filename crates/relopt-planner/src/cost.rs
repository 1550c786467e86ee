//! Cardinality estimation.
//!
//! One bottom-up walk annotates every node with its output relation: the
//! attributes it produces, each with a distinct-value count, and a tuple
//! count. Selectivity follows the classic uniformity model:
//!
//! - `A = literal` keeps `T / V(A)` tuples and pins `V(A)` to 1.
//! - `A = B` keeps `T / max(V(A), V(B))` tuples; both counts become the min.
//! - a Join is a Select over the Product, computed without building it.
//!
//! All divisions floor. A divisor of zero is an `EmptyDomain` error.

use relopt_core::dag::Operator;
use relopt_core::error::{Error, Result};
use relopt_core::expr::{resolve_equality, Predicate, Side};
use relopt_core::schema::{Attribute, Relation};
use serde::{Deserialize, Serialize};

/// Annotate every node of `plan` with its estimated output.
///
/// The tree is only updated if estimation succeeds for every node.
pub fn estimate(plan: &mut Operator) -> Result<()> {
    let mut work = plan.clone();
    annotate(&mut work)?;
    *plan = work;
    Ok(())
}

/// Owned variant of [`estimate`].
pub fn estimated(mut plan: Operator) -> Result<Operator> {
    annotate(&mut plan)?;
    Ok(plan)
}

fn annotate(op: &mut Operator) -> Result<Relation> {
    use Operator::*;
    let out = match op {
        Scan { relation, .. } => relation.relation.clone(),
        Select {
            input, predicate, ..
        } => {
            let input = annotate(input)?;
            select_output(&input, predicate)?
        }
        Project {
            input, attributes, ..
        } => {
            let input = annotate(input)?;
            project_output(&input, attributes)
        }
        Product { left, right, .. } => {
            let l = annotate(left)?;
            let r = annotate(right)?;
            product_output(&l, &r)
        }
        Join {
            left,
            right,
            predicate,
            ..
        } => {
            let l = annotate(left)?;
            let r = annotate(right)?;
            join_output(&l, &r, predicate)?
        }
    };

    #[cfg(feature = "tracing")]
    tracing::trace!(op = op.name(), tuples = out.tuple_count, "estimated node");

    op.set_output(out.clone());
    Ok(out)
}

/// Distinct-value count of `name` in `rel`; a missing count reads as zero.
fn value_count(rel: &Relation, name: &str) -> Result<u64> {
    rel.attribute(name)
        .map(|a| a.value_count.unwrap_or(0))
        .ok_or_else(|| Error::AttributeNotFound(name.to_string()))
}

/// Copy of `rel`'s attributes with every attribute named in `names` reset to `count`.
fn with_counts(rel: &Relation, names: &[&str], count: u64) -> Vec<Attribute> {
    rel.attributes
        .iter()
        .map(|a| {
            if names.contains(&a.name.as_str()) {
                Attribute::with_count(a.name.clone(), count)
            } else {
                a.clone()
            }
        })
        .collect()
}

fn select_output(input: &Relation, predicate: &Predicate) -> Result<Relation> {
    match predicate {
        Predicate::ValueEquality { attribute, .. } => {
            let v = value_count(input, &attribute.name)?;
            if v == 0 {
                return Err(Error::EmptyDomain(attribute.name.clone()));
            }
            Ok(Relation::with_attributes(
                input.tuple_count / v,
                with_counts(input, &[&attribute.name], 1),
            ))
        }
        Predicate::AttributeEquality { left, right } => {
            let vl = value_count(input, &left.name)?;
            let vr = value_count(input, &right.name)?;
            let max = vl.max(vr);
            if max == 0 {
                return Err(Error::EmptyDomain(left.name.clone()));
            }
            Ok(Relation::with_attributes(
                input.tuple_count / max,
                with_counts(input, &[&left.name, &right.name], vl.min(vr)),
            ))
        }
    }
}

fn project_output(input: &Relation, attributes: &[Attribute]) -> Relation {
    // Attributes the input does not produce are dropped, not rejected.
    let kept = attributes
        .iter()
        .filter_map(|a| input.attribute(&a.name).cloned())
        .collect();
    Relation::with_attributes(input.tuple_count, kept)
}

fn product_output(left: &Relation, right: &Relation) -> Relation {
    let mut attributes = left.attributes.clone();
    attributes.extend(right.attributes.iter().cloned());
    Relation::with_attributes(left.tuple_count.saturating_mul(right.tuple_count), attributes)
}

fn join_output(left: &Relation, right: &Relation, predicate: &Predicate) -> Result<Relation> {
    let (a, b) = match predicate {
        Predicate::AttributeEquality { left, right } => (left, right),
        Predicate::ValueEquality { .. } => {
            return Err(Error::Plan(format!(
                "join predicate {} compares against a literal",
                predicate
            )))
        }
    };

    let (side_a, _) = resolve_equality(a, b, |n| left.contains(n), |n| right.contains(n))?;
    let (in_left, in_right) = match side_a {
        Side::Left => (a, b),
        Side::Right => (b, a),
    };

    let vl = value_count(left, &in_left.name)?;
    let vr = value_count(right, &in_right.name)?;
    let max = vl.max(vr);
    if max == 0 {
        return Err(Error::EmptyDomain(in_left.name.clone()));
    }
    let min = vl.min(vr);

    let cross = u128::from(left.tuple_count) * u128::from(right.tuple_count);
    let tuples = u64::try_from(cross / u128::from(max)).unwrap_or(u64::MAX);

    let mut attributes = with_counts(left, &[&in_left.name], min);
    attributes.extend(with_counts(right, &[&in_right.name], min));
    Ok(Relation::with_attributes(tuples, attributes))
}

/// Summary of an estimated plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanCost {
    /// Sum of every node's estimated output tuples; the figure heuristics
    /// are meant to drive down.
    pub total_tuples: u64,
    /// Estimated tuples produced by the root.
    pub root_tuples: u64,
    pub nodes: usize,
}

/// Summarize an already estimated plan. Fails if any node lacks an output.
pub fn plan_cost(plan: &Operator) -> Result<PlanCost> {
    let mut total = 0u64;
    let mut nodes = 0usize;
    let mut missing: Option<&'static str> = None;
    plan.visit(&mut |op| {
        nodes += 1;
        match op.output() {
            Some(rel) => total = total.saturating_add(rel.tuple_count),
            None => missing = missing.or(Some(op.name())),
        }
    });
    if let Some(kind) = missing {
        return Err(Error::Plan(format!("{} node has no estimate", kind)));
    }
    let root_tuples = plan.output().map(|r| r.tuple_count).unwrap_or_default();
    Ok(PlanCost {
        total_tuples: total,
        root_tuples,
        nodes,
    })
}
