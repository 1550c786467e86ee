//! Serde and fingerprint tests


use relopt_core::config::PlannerConfig;
use relopt_core::dag::Operator;
use relopt_planner::{estimated, optimize};
use test_catalog::{smith_query, university};

#[test]
fn test_partial_config_falls_back_to_defaults() {
    let cfg: PlannerConfig = serde_json::from_str(r#"{ "form_joins": false }"#).unwrap();
    assert!(!cfg.form_joins);
    assert!(cfg.left_deep && cfg.push_selections && cfg.push_projections);
    assert!(!cfg.check_invariants);
    assert_eq!(cfg.enabled_passes(), 3);
}

#[test]
fn test_estimated_plan_survives_json() {
    let cat = university();
    let plan = estimated(optimize(&smith_query(&cat)).unwrap()).unwrap();
    let json = serde_json::to_string(&plan).unwrap();
    let back: Operator = serde_json::from_str(&json).unwrap();
    assert_eq!(back, plan);
    assert_eq!(
        back.output().map(|r| r.tuple_count),
        plan.output().map(|r| r.tuple_count)
    );
}

#[test]
fn test_fingerprint_tracks_structure_only() {
    let cat = university();
    let canonical = smith_query(&cat);
    let optimized = optimize(&canonical).unwrap();

    let annotated = estimated(optimized.clone()).unwrap();
    assert_eq!(
        annotated.fingerprint().unwrap(),
        optimized.fingerprint().unwrap()
    );
    assert_ne!(
        canonical.fingerprint().unwrap(),
        optimized.fingerprint().unwrap()
    );
    assert_eq!(optimized.fingerprint().unwrap().short().len(), 12);
}
