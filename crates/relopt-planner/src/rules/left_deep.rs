//! Left-deep normalization of Product trees.

use relopt_core::dag::Operator;

/// Rotate every Product so that its right input is never itself a Product.
///
/// `Product(L, Product(A, B))` becomes `Product(Product(L, A), B)`, repeated
/// until the shape is left-deep. Select and Project are rebuilt around their
/// normalized input; Scan and Join keep their shape (estimates dropped).
pub fn left_deep(plan: &Operator) -> Operator {
    use Operator::*;
    match plan {
        Product { left, right, .. } => rotate(left_deep(left), left_deep(right)),
        Select {
            input, predicate, ..
        } => Operator::select(left_deep(input), predicate.clone()),
        Project {
            input, attributes, ..
        } => Operator::project(left_deep(input), attributes.clone()),
        Scan { .. } | Join { .. } => plan.without_estimates(),
    }
}

/// Product of two left-deep trees, itself left-deep.
fn rotate(left: Operator, right: Operator) -> Operator {
    match right {
        Operator::Product {
            left: inner_left,
            right: inner_right,
            ..
        } => rotate(rotate(left, *inner_left), *inner_right),
        right => Operator::product(left, right),
    }
}
