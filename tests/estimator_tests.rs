//! Cardinality estimation tests


use relopt_core::dag::Operator;
use relopt_core::error::Error;
use relopt_core::expr::Predicate;
use relopt_planner::{estimate, estimated, plan_cost};
use test_catalog::{attrs, scan, smith_query, table, university};

fn count(op: &Operator, name: &str) -> Option<u64> {
    op.output()
        .and_then(|r| r.attribute(name))
        .and_then(|a| a.value_count)
}

#[test]
fn test_scan_copies_base_relation() {
    let cat = university();
    let plan = estimated(scan(&cat, "Person")).unwrap();
    let out = plan.output().unwrap();
    assert_eq!(out.tuple_count, 400);
    assert_eq!(out.names().collect::<Vec<_>>(), vec!["persid", "persname", "age"]);
    assert_eq!(count(&plan, "persname"), Some(350));
}

#[test]
fn test_literal_selectivity() {
    let cat = university();
    let plan = estimated(Operator::select(
        scan(&cat, "Person"),
        Predicate::value_eq("persid", "x"),
    ))
    .unwrap();
    assert_eq!(plan.output().unwrap().tuple_count, 1);
    assert_eq!(count(&plan, "persid"), Some(1));
    assert_eq!(count(&plan, "age"), Some(47));
}

#[test]
fn test_literal_selectivity_floors() {
    let cat = university();
    let plan = estimated(Operator::select(
        scan(&cat, "Person"),
        Predicate::value_eq("persname", "Smith"),
    ))
    .unwrap();
    // 400 / 350
    assert_eq!(plan.output().unwrap().tuple_count, 1);
}

#[test]
fn test_attribute_equality_selectivity() {
    let plan = estimated(Operator::select(
        table("R", 2000, &[("a", 400), ("b", 47), ("c", 9)]),
        Predicate::attr_eq("a", "b"),
    ))
    .unwrap();
    assert_eq!(plan.output().unwrap().tuple_count, 5);
    assert_eq!(count(&plan, "a"), Some(47));
    assert_eq!(count(&plan, "b"), Some(47));
    assert_eq!(count(&plan, "c"), Some(9));
}

#[test]
fn test_project_keeps_counts_and_drops_unknown() {
    let cat = university();
    let plan = estimated(Operator::project(
        scan(&cat, "Person"),
        attrs(&["age", "nosuch", "persid"]),
    ))
    .unwrap();
    let out = plan.output().unwrap();
    assert_eq!(out.tuple_count, 400);
    assert_eq!(out.names().collect::<Vec<_>>(), vec!["age", "persid"]);
    assert_eq!(count(&plan, "age"), Some(47));
}

#[test]
fn test_product_concatenates_schemas() {
    let cat = university();
    let plan = estimated(Operator::product(
        scan(&cat, "Department"),
        scan(&cat, "Project"),
    ))
    .unwrap();
    let out = plan.output().unwrap();
    assert_eq!(out.tuple_count, 200);
    assert_eq!(
        out.names().collect::<Vec<_>>(),
        vec!["deptid", "manager", "deptname", "projid", "projname", "deptname", "dept"]
    );
}

#[test]
fn test_join_either_binding() {
    let cat = university();
    for pred in [
        Predicate::attr_eq("dept", "deptid"),
        Predicate::attr_eq("deptid", "dept"),
    ] {
        let plan = estimated(Operator::join(
            scan(&cat, "Department"),
            scan(&cat, "Project"),
            pred,
        ))
        .unwrap();
        let out = plan.output().unwrap();
        // 5 * 40 / max(5, 5)
        assert_eq!(out.tuple_count, 40);
        assert_eq!(out.attributes.len(), 7);
    }
}

#[test]
fn test_join_sets_both_matched_counts_to_min() {
    let cat = university();
    let plan = estimated(Operator::join(
        scan(&cat, "Department"),
        scan(&cat, "Person"),
        Predicate::attr_eq("persid", "manager"),
    ))
    .unwrap();
    let out = plan.output().unwrap();
    // 5 * 400 / 400
    assert_eq!(out.tuple_count, 5);
    assert_eq!(count(&plan, "manager"), Some(5));
    assert_eq!(count(&plan, "persid"), Some(5));
    assert_eq!(count(&plan, "persname"), Some(350));
}

#[test]
fn test_join_errors() {
    let cat = university();
    let join = |pred| Operator::join(scan(&cat, "Department"), scan(&cat, "Project"), pred);

    let err = estimated(join(Predicate::attr_eq("deptname", "dept"))).unwrap_err();
    assert!(matches!(err, Error::AmbiguousAttribute(ref n) if n == "deptname"));

    let err = estimated(join(Predicate::attr_eq("persid", "dept"))).unwrap_err();
    assert!(matches!(err, Error::AttributeNotFound(ref n) if n == "persid"));

    // Both attributes belong to Department.
    let err = estimated(join(Predicate::attr_eq("deptid", "manager"))).unwrap_err();
    assert!(matches!(err, Error::AttributeNotFound(ref n) if n == "manager"));
}

#[test]
fn test_select_errors() {
    let err = estimated(Operator::select(
        table("R", 10, &[("a", 0)]),
        Predicate::value_eq("a", "1"),
    ))
    .unwrap_err();
    assert!(matches!(err, Error::EmptyDomain(_)));

    let err = estimated(Operator::select(
        table("R", 10, &[("a", 3)]),
        Predicate::value_eq("b", "1"),
    ))
    .unwrap_err();
    assert!(matches!(err, Error::AttributeNotFound(ref n) if n == "b"));
}

#[test]
fn test_estimate_is_idempotent() {
    let cat = university();
    let mut plan = smith_query(&cat);
    estimate(&mut plan).unwrap();
    let once = plan.clone();
    estimate(&mut plan).unwrap();
    assert_eq!(plan, once);
    assert!(plan.children().iter().all(|c| c.output().is_some()));
}

#[test]
fn test_canonical_cost() {
    let cat = university();
    let plan = estimated(smith_query(&cat)).unwrap();
    let cost = plan_cost(&plan).unwrap();
    assert_eq!(cost.nodes, 8);
    // 80000 / 400 after persid=manager, / 5 after dept=deptid, / 350 after persname
    assert_eq!(cost.root_tuples, 0);
    assert_eq!(cost.total_tuples, 5 + 40 + 400 + 16_000 + 80_000 + 200 + 40);
}
