//! Projection pushdown by attribute liveness.
//!
//! Walking top-down with the set of attribute names still needed above,
//! every Scan and every input of a Product/Join is wrapped in a Project
//! that keeps only what is needed there. Select and Join add their
//! predicate attributes to the set for their inputs.

use std::collections::BTreeSet;

use relopt_core::dag::Operator;
use relopt_core::error::{Error, Result};
use relopt_core::schema::Attribute;

use super::selection::ensure_reachable;

/// Names the plan root must keep exposing: the root Project's list, or
/// else every attribute the tree mentions.
pub fn initial_need_set(plan: &Operator) -> BTreeSet<String> {
    match plan {
        Operator::Project { attributes, .. } => names(attributes),
        _ => plan.referenced_attributes(),
    }
}

/// Projection pushdown seeded from `plan` itself.
pub fn push_projections(plan: &Operator) -> Result<Operator> {
    push_projections_with(plan, &initial_need_set(plan))
}

/// Projection pushdown with an explicit need-set for a non-Project root.
/// A root Project is always seeded from its own attribute list and kept as
/// the top of the result.
pub fn push_projections_with(plan: &Operator, needed: &BTreeSet<String>) -> Result<Operator> {
    match plan {
        Operator::Project {
            input, attributes, ..
        } => {
            // A pushed-down Project over the same names is folded into the
            // root, which keeps its own attribute order.
            let inner = match push(input, &names(attributes))? {
                Operator::Project {
                    input: inner,
                    attributes: pushed,
                    ..
                } if names(&pushed) == names(attributes) => *inner,
                other => other,
            };
            Ok(Operator::project(inner, attributes.clone()))
        }
        _ => push(plan, needed),
    }
}

fn push(plan: &Operator, needed: &BTreeSet<String>) -> Result<Operator> {
    use Operator::*;
    match plan {
        Scan { .. } => Ok(restrict(plan.without_estimates(), needed)),
        Select {
            input, predicate, ..
        } => {
            ensure_reachable(predicate, input)?;
            let mut needed = needed.clone();
            needed.extend(predicate.attributes().map(|a| a.name.clone()));
            Ok(Operator::select(push(input, &needed)?, predicate.clone()))
        }
        Project {
            input, attributes, ..
        } => {
            let kept: Vec<Attribute> = attributes
                .iter()
                .filter(|a| needed.contains(&a.name) && input.contains_attribute(&a.name))
                .map(|a| Attribute::new(a.name.clone()))
                .collect();
            let inner = push(input, &names(&kept))?;
            Ok(restrict_to(inner, kept))
        }
        Product { left, right, .. } => Ok(Operator::product(
            push_side(left, needed)?,
            push_side(right, needed)?,
        )),
        Join {
            left,
            right,
            predicate,
            ..
        } => {
            let mut needed = needed.clone();
            for attr in predicate.attributes() {
                if !left.contains_attribute(&attr.name) && !right.contains_attribute(&attr.name) {
                    return Err(Error::AttributeNotFound(attr.name.clone()));
                }
                needed.insert(attr.name.clone());
            }
            Ok(Operator::join(
                push_side(left, &needed)?,
                push_side(right, &needed)?,
                predicate.clone(),
            ))
        }
    }
}

/// Rewrite one input of a binary operator with the part of `needed` it
/// can produce, and wrap it in a Project of exactly that part.
fn push_side(side: &Operator, needed: &BTreeSet<String>) -> Result<Operator> {
    let part: BTreeSet<String> = needed
        .iter()
        .filter(|n| side.contains_attribute(n))
        .cloned()
        .collect();
    Ok(restrict(push(side, &part)?, &part))
}

/// Project `input` onto `keep`, listed in the input's own schema order.
fn restrict(input: Operator, keep: &BTreeSet<String>) -> Operator {
    let mut seen = BTreeSet::new();
    let attributes = input
        .schema_names()
        .into_iter()
        .filter(|n| keep.contains(n) && seen.insert(n.clone()))
        .map(Attribute::new)
        .collect();
    restrict_to(input, attributes)
}

/// Wrap `input` in a Project, unless it already is one over the same names.
fn restrict_to(input: Operator, attributes: Vec<Attribute>) -> Operator {
    if let Operator::Project {
        attributes: existing,
        ..
    } = &input
    {
        if names(existing) == names(&attributes) {
            return input;
        }
    }
    Operator::project(input, attributes)
}

fn names(attributes: &[Attribute]) -> BTreeSet<String> {
    attributes.iter().map(|a| a.name.clone()).collect()
}
