//! Join formation: `Select(a = b, Product(l, r))` → `Join(l, r, a = b)`.

use relopt_core::dag::Operator;
use relopt_core::error::Result;
use relopt_core::expr::{locate, Predicate};

/// Replace every Select-over-Product whose predicate equates an attribute
/// of one input with an attribute of the other by a Join. Literal and
/// one-sided predicates keep their Select.
pub fn form_joins(plan: &Operator) -> Result<Operator> {
    use Operator::*;
    Ok(match plan {
        Select {
            input, predicate, ..
        } => match input.as_ref() {
            Product { left, right, .. } if spans_inputs(predicate, left, right)? => {
                Operator::join(form_joins(left)?, form_joins(right)?, predicate.clone())
            }
            _ => Operator::select(form_joins(input)?, predicate.clone()),
        },
        Project {
            input, attributes, ..
        } => Operator::project(form_joins(input)?, attributes.clone()),
        Product { left, right, .. } => Operator::product(form_joins(left)?, form_joins(right)?),
        Join {
            left,
            right,
            predicate,
            ..
        } => Operator::join(form_joins(left)?, form_joins(right)?, predicate.clone()),
        Scan { .. } => plan.without_estimates(),
    })
}

/// Whether an attribute-equality predicate takes one attribute from each
/// input. An attribute produced by neither input, or by both, is an error.
fn spans_inputs(predicate: &Predicate, left: &Operator, right: &Operator) -> Result<bool> {
    let (a, b) = match predicate {
        Predicate::AttributeEquality { left, right } => (left, right),
        Predicate::ValueEquality { .. } => return Ok(false),
    };
    let side = |name: &str| {
        locate(
            name,
            left.contains_attribute(name),
            right.contains_attribute(name),
        )
    };
    Ok(side(&a.name)? != side(&b.name)?)
}
