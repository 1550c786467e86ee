//! Indented, one-node-per-line plan printer.
//!
//! ```text
//! Project [persname]  => 1 tuples [persname:1]
//!   Join [persid=manager]  => 1 tuples [...]
//!     Scan Department  => 5 tuples [...]
//! ```
//!
//! The `=> ...` suffix only appears on nodes the estimator has annotated.

use std::fmt::Write;

use relopt_core::dag::Operator;
use relopt_core::schema::{Attribute, Relation};

pub fn explain(plan: &Operator) -> String {
    let mut out = String::new();
    write_node(&mut out, plan, 0);
    out
}

fn write_node(out: &mut String, op: &Operator, depth: usize) {
    let _ = write!(out, "{:width$}{}", "", label(op), width = depth * 2);
    if let Some(rel) = op.output() {
        let _ = write!(out, "  => {}", summary(rel));
    }
    out.push('\n');
    for child in op.children() {
        write_node(out, child, depth + 1);
    }
}

fn label(op: &Operator) -> String {
    use Operator::*;
    match op {
        Scan { relation, .. } => format!("Scan {}", relation.name),
        Select { predicate, .. } => format!("Select [{}]", predicate),
        Project { attributes, .. } => format!("Project [{}]", names(attributes)),
        Product { .. } => "Product".to_string(),
        Join { predicate, .. } => format!("Join [{}]", predicate),
    }
}

fn names(attributes: &[Attribute]) -> String {
    attributes
        .iter()
        .map(Attribute::name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn summary(rel: &Relation) -> String {
    let attrs: Vec<String> = rel
        .attributes
        .iter()
        .map(|a| match a.value_count {
            Some(v) => format!("{}:{}", a.name, v),
            None => a.name.clone(),
        })
        .collect();
    format!("{} tuples [{}]", rel.tuple_count, attrs.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::estimated;
    use relopt_core::catalog::BaseRelation;
    use relopt_core::expr::Predicate;
    use std::sync::Arc;

    #[test]
    fn prints_tree_with_estimates() {
        let scan = Operator::scan(Arc::new(BaseRelation {
            name: "R".into(),
            relation: Relation::with_attributes(
                10,
                vec![Attribute::with_count("a", 5), Attribute::with_count("b", 2)],
            ),
        }));
        let plan = Operator::project(
            Operator::select(scan, Predicate::value_eq("a", "x")),
            vec![Attribute::new("a")],
        );
        assert_eq!(
            explain(&plan),
            "Project [a]\n  Select [a=\"x\"]\n    Scan R\n"
        );
        assert_eq!(
            explain(&estimated(plan).unwrap()),
            "Project [a]  => 2 tuples [a:1]\n  Select [a=\"x\"]  => 2 tuples [a:1, b:2]\n    Scan R  => 10 tuples [a:5, b:2]\n"
        );
    }
}
