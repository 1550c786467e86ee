//! Selection pushdown.
//!
//! Each Select sinks towards the inputs that produce its attributes. At a
//! Product (or Join) the left input is tried first; a predicate that needs
//! both inputs stays above them, which is the shape join formation expects.

use relopt_core::dag::Operator;
use relopt_core::error::{Error, Result};
use relopt_core::expr::{Predicate, Side};

pub fn push_selections(plan: &Operator) -> Result<Operator> {
    use Operator::*;
    Ok(match plan {
        Select {
            input, predicate, ..
        } => {
            let input = push_selections(input)?;
            ensure_reachable(predicate, &input)?;
            place(predicate, input)
        }
        Project {
            input, attributes, ..
        } => Operator::project(push_selections(input)?, attributes.clone()),
        Product { left, right, .. } => {
            Operator::product(push_selections(left)?, push_selections(right)?)
        }
        Join {
            left,
            right,
            predicate,
            ..
        } => Operator::join(
            push_selections(left)?,
            push_selections(right)?,
            predicate.clone(),
        ),
        Scan { .. } => plan.without_estimates(),
    })
}

pub(crate) fn ensure_reachable(predicate: &Predicate, input: &Operator) -> Result<()> {
    match predicate
        .attributes()
        .find(|a| !input.contains_attribute(&a.name))
    {
        Some(missing) => Err(Error::AttributeNotFound(missing.name.clone())),
        None => Ok(()),
    }
}

/// Outcome of trying to move a predicate below the root of a subtree.
enum Placement {
    /// The predicate now sits somewhere inside the returned subtree.
    Sunk(Operator),
    /// The predicate could not move; the subtree is returned without it.
    Stuck(Operator),
}

/// `input` with `predicate` applied as deep as it can go.
fn place(predicate: &Predicate, input: Operator) -> Operator {
    match sink(predicate, input) {
        Placement::Sunk(plan) => plan,
        Placement::Stuck(plan) => Operator::select(plan, predicate.clone()),
    }
}

fn sink(predicate: &Predicate, input: Operator) -> Placement {
    match input {
        Operator::Product { left, right, .. } => match side_for(predicate, &left, &right) {
            Some(Side::Left) => Placement::Sunk(Operator::product(place(predicate, *left), *right)),
            Some(Side::Right) => {
                Placement::Sunk(Operator::product(*left, place(predicate, *right)))
            }
            None => Placement::Stuck(Operator::product(*left, *right)),
        },
        Operator::Join {
            left,
            right,
            predicate: on,
            ..
        } => match side_for(predicate, &left, &right) {
            Some(Side::Left) => {
                Placement::Sunk(Operator::join(place(predicate, *left), *right, on))
            }
            Some(Side::Right) => {
                Placement::Sunk(Operator::join(*left, place(predicate, *right), on))
            }
            None => Placement::Stuck(Operator::join(*left, *right, on)),
        },
        Operator::Project {
            input, attributes, ..
        } => Placement::Sunk(Operator::project(place(predicate, *input), attributes)),
        // Only pass a sibling Select when going further down; otherwise the
        // original order is kept so a second run changes nothing.
        Operator::Select {
            input,
            predicate: sibling,
            ..
        } => match sink(predicate, *input) {
            Placement::Sunk(plan) => Placement::Sunk(Operator::select(plan, sibling)),
            Placement::Stuck(plan) => Placement::Stuck(Operator::select(plan, sibling)),
        },
        scan @ Operator::Scan { .. } => Placement::Stuck(scan),
    }
}

/// The input that alone produces every attribute of `predicate`, left first.
fn side_for(predicate: &Predicate, left: &Operator, right: &Operator) -> Option<Side> {
    if predicate.attributes().all(|a| left.contains_attribute(&a.name)) {
        Some(Side::Left)
    } else if predicate.attributes().all(|a| right.contains_attribute(&a.name)) {
        Some(Side::Right)
    } else {
        None
    }
}
