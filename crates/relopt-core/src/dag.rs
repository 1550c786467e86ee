//! Logical plan tree.
//!
//! A closed set of relational operators. Children are owned; a Scan shares
//! its base relation with the catalogue. Each node carries an optional
//! output relation written by the estimator. Rewrites never mutate a tree:
//! they build new nodes, which start without an output.
//!
//! Schema questions asked during rewriting ("which attribute names can this
//! subtree produce?") are answered structurally from the tree shape and the
//! Scan leaves, never from `output`, which may be stale or missing.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{BaseRelation, Catalogue};
use crate::error::Result;
use crate::expr::Predicate;
use crate::hash::{hash_serde, Hash256};
use crate::schema::{Attribute, Relation};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Scan {
        relation: Arc<BaseRelation>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<Relation>,
    },
    Select {
        input: Box<Operator>,
        predicate: Predicate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<Relation>,
    },
    Project {
        input: Box<Operator>,
        attributes: Vec<Attribute>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<Relation>,
    },
    Product {
        left: Box<Operator>,
        right: Box<Operator>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<Relation>,
    },
    Join {
        left: Box<Operator>,
        right: Box<Operator>,
        predicate: Predicate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<Relation>,
    },
}

impl Operator {
    pub fn scan(relation: Arc<BaseRelation>) -> Self {
        Operator::Scan {
            relation,
            output: None,
        }
    }

    /// Scan of a catalogue relation, looked up by name.
    pub fn scan_named(catalogue: &dyn Catalogue, name: &str) -> Result<Self> {
        Ok(Self::scan(catalogue.relation(name)?))
    }

    pub fn select(input: Operator, predicate: Predicate) -> Self {
        Operator::Select {
            input: Box::new(input),
            predicate,
            output: None,
        }
    }

    pub fn project(input: Operator, attributes: Vec<Attribute>) -> Self {
        Operator::Project {
            input: Box::new(input),
            attributes,
            output: None,
        }
    }

    pub fn product(left: Operator, right: Operator) -> Self {
        Operator::Product {
            left: Box::new(left),
            right: Box::new(right),
            output: None,
        }
    }

    pub fn join(left: Operator, right: Operator, predicate: Predicate) -> Self {
        Operator::Join {
            left: Box::new(left),
            right: Box::new(right),
            predicate,
            output: None,
        }
    }

    pub fn name(&self) -> &'static str {
        use Operator::*;
        match self {
            Scan { .. } => "Scan",
            Select { .. } => "Select",
            Project { .. } => "Project",
            Product { .. } => "Product",
            Join { .. } => "Join",
        }
    }

    pub fn children(&self) -> Vec<&Operator> {
        use Operator::*;
        match self {
            Scan { .. } => vec![],
            Select { input, .. } | Project { input, .. } => vec![input.as_ref()],
            Product { left, right, .. } | Join { left, right, .. } => {
                vec![left.as_ref(), right.as_ref()]
            }
        }
    }

    /// Estimated output, if the estimator has annotated this node.
    pub fn output(&self) -> Option<&Relation> {
        use Operator::*;
        match self {
            Scan { output, .. }
            | Select { output, .. }
            | Project { output, .. }
            | Product { output, .. }
            | Join { output, .. } => output.as_ref(),
        }
    }

    pub fn set_output(&mut self, relation: Relation) {
        use Operator::*;
        match self {
            Scan { output, .. }
            | Select { output, .. }
            | Project { output, .. }
            | Product { output, .. }
            | Join { output, .. } => *output = Some(relation),
        }
    }

    /// Pre-order traversal.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Operator)) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }

    pub fn node_count(&self) -> usize {
        let mut n = 0;
        self.visit(&mut |_| n += 1);
        n
    }

    /// Number of nodes of the given kind (as returned by [`Operator::name`]).
    pub fn count_of(&self, kind: &str) -> usize {
        let mut n = 0;
        self.visit(&mut |op| {
            if op.name() == kind {
                n += 1;
            }
        });
        n
    }

    /// Attribute names this node produces, in output order, derived from
    /// the tree shape alone. Products and Joins may repeat a name.
    pub fn schema_names(&self) -> Vec<String> {
        use Operator::*;
        match self {
            Scan { relation, .. } => relation.relation.names().map(str::to_string).collect(),
            Select { input, .. } => input.schema_names(),
            Project {
                input, attributes, ..
            } => attributes
                .iter()
                .filter(|a| input.contains_attribute(&a.name))
                .map(|a| a.name.clone())
                .collect(),
            Product { left, right, .. } | Join { left, right, .. } => {
                let mut names = left.schema_names();
                names.extend(right.schema_names());
                names
            }
        }
    }

    /// Set of attribute names reachable at this node.
    pub fn reachable_attributes(&self) -> BTreeSet<String> {
        self.schema_names().into_iter().collect()
    }

    /// Whether `name` is reachable at this node.
    pub fn contains_attribute(&self, name: &str) -> bool {
        use Operator::*;
        match self {
            Scan { relation, .. } => relation.relation.contains(name),
            Select { input, .. } => input.contains_attribute(name),
            Project {
                input, attributes, ..
            } => attributes.iter().any(|a| a.name == name) && input.contains_attribute(name),
            Product { left, right, .. } | Join { left, right, .. } => {
                left.contains_attribute(name) || right.contains_attribute(name)
            }
        }
    }

    /// Every attribute name mentioned anywhere in the tree: Scan schemas,
    /// predicates, and projection lists.
    pub fn referenced_attributes(&self) -> BTreeSet<String> {
        let mut acc = BTreeSet::new();
        self.visit(&mut |op| match op {
            Operator::Scan { relation, .. } => {
                acc.extend(relation.relation.names().map(str::to_string));
            }
            Operator::Select { predicate, .. } | Operator::Join { predicate, .. } => {
                acc.extend(predicate.attributes().map(|a| a.name.clone()));
            }
            Operator::Project { attributes, .. } => {
                acc.extend(attributes.iter().map(|a| a.name.clone()));
            }
            Operator::Product { .. } => {}
        });
        acc
    }

    /// True if no node's right input is a Product.
    pub fn is_left_deep(&self) -> bool {
        let mut ok = true;
        self.visit(&mut |op| {
            if let Operator::Product { right, .. } | Operator::Join { right, .. } = op {
                if matches!(right.as_ref(), Operator::Product { .. }) {
                    ok = false;
                }
            }
        });
        ok
    }

    /// Copy of the tree with every estimated output removed.
    pub fn without_estimates(&self) -> Operator {
        use Operator::*;
        match self {
            Scan { relation, .. } => Operator::scan(relation.clone()),
            Select {
                input, predicate, ..
            } => Operator::select(input.without_estimates(), predicate.clone()),
            Project {
                input, attributes, ..
            } => Operator::project(input.without_estimates(), attributes.clone()),
            Product { left, right, .. } => {
                Operator::product(left.without_estimates(), right.without_estimates())
            }
            Join {
                left,
                right,
                predicate,
                ..
            } => Operator::join(
                left.without_estimates(),
                right.without_estimates(),
                predicate.clone(),
            ),
        }
    }

    /// Stable hash of the plan's structure, ignoring estimates.
    pub fn fingerprint(&self) -> Result<Hash256> {
        hash_serde(&self.without_estimates())
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Operator::*;
        match self {
            Scan { relation, .. } => f.write_str(&relation.name),
            Select {
                input, predicate, ..
            } => write!(f, "SELECT[{}]({})", predicate, input),
            Project {
                input, attributes, ..
            } => {
                let names: Vec<&str> = attributes.iter().map(Attribute::name).collect();
                write!(f, "PROJECT[{}]({})", names.join(","), input)
            }
            Product { left, right, .. } => write!(f, "PRODUCT({},{})", left, right),
            Join {
                left,
                right,
                predicate,
                ..
            } => write!(f, "JOIN[{}]({},{})", predicate, left, right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(name: &str, attrs: &[&str]) -> Operator {
        Operator::scan(Arc::new(BaseRelation {
            name: name.to_string(),
            relation: Relation::with_attributes(
                10,
                attrs.iter().map(|a| Attribute::with_count(*a, 10)).collect(),
            ),
        }))
    }

    #[test]
    fn schema_is_derived_structurally() {
        let plan = Operator::project(
            Operator::product(base("A", &["a", "x"]), base("B", &["b", "x"])),
            vec![Attribute::new("b"), Attribute::new("missing"), Attribute::new("x")],
        );
        assert_eq!(plan.schema_names(), vec!["b", "x"]);
        assert!(plan.contains_attribute("x"));
        assert!(!plan.contains_attribute("a"));
        assert!(!plan.contains_attribute("missing"));
        assert!(plan.output().is_none());
    }

    #[test]
    fn display_and_shape_helpers() {
        let plan = Operator::product(
            base("A", &["a"]),
            Operator::product(base("B", &["b"]), base("C", &["c"])),
        );
        assert_eq!(plan.to_string(), "PRODUCT(A,PRODUCT(B,C))");
        assert!(!plan.is_left_deep());
        assert_eq!(plan.count_of("Product"), 2);
        assert_eq!(plan.node_count(), 5);
    }

    #[test]
    fn fingerprint_ignores_estimates() {
        let plan = base("A", &["a"]);
        let mut annotated = plan.clone();
        annotated.set_output(Relation::new(10));
        assert_ne!(plan, annotated);
        assert_eq!(plan.fingerprint().unwrap(), annotated.fingerprint().unwrap());
    }
}
