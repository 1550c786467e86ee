//! Planner configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Rotate Product trees into left-deep form.
    pub left_deep: bool,

    /// Sink Select nodes towards the Scans that produce their attributes.
    pub push_selections: bool,

    /// Turn Select-over-Product into Join where the predicate spans both inputs.
    pub form_joins: bool,

    /// Insert Projects so every subtree exposes only the attributes needed above it.
    pub push_projections: bool,

    /// Verify structural invariants after each pass (left-deep shape, root
    /// attribute set) and fail with `Error::Invariant` on violation.
    pub check_invariants: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            left_deep: true,
            push_selections: true,
            form_joins: true,
            push_projections: true,
            check_invariants: false,
        }
    }
}

impl PlannerConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables (`1/true/yes/on` or `0/false/no/off`):
    /// - `RELOPT_LEFT_DEEP`
    /// - `RELOPT_PUSH_SELECTIONS`
    /// - `RELOPT_FORM_JOINS`
    /// - `RELOPT_PUSH_PROJECTIONS`
    /// - `RELOPT_CHECK_INVARIANTS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PlannerConfig::from_env`] but reading from an arbitrary
    /// key lookup; unparseable values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        let flag = |key: &str, slot: &mut bool| {
            if let Some(v) = lookup(key).as_deref().and_then(parse_flag) {
                *slot = v;
            }
        };

        flag("RELOPT_LEFT_DEEP", &mut cfg.left_deep);
        flag("RELOPT_PUSH_SELECTIONS", &mut cfg.push_selections);
        flag("RELOPT_FORM_JOINS", &mut cfg.form_joins);
        flag("RELOPT_PUSH_PROJECTIONS", &mut cfg.push_projections);
        flag("RELOPT_CHECK_INVARIANTS", &mut cfg.check_invariants);

        cfg
    }

    /// Number of rewrite passes enabled.
    pub fn enabled_passes(&self) -> usize {
        [
            self.left_deep,
            self.push_selections,
            self.form_joins,
            self.push_projections,
        ]
        .iter()
        .filter(|on| **on)
        .count()
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn lookup_overrides_defaults_and_ignores_garbage() {
        let env: HashMap<&str, &str> = [
            ("RELOPT_FORM_JOINS", "off"),
            ("RELOPT_CHECK_INVARIANTS", "YES"),
            ("RELOPT_LEFT_DEEP", "maybe"),
        ]
        .into_iter()
        .collect();

        let cfg = PlannerConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert!(!cfg.form_joins);
        assert!(cfg.check_invariants);
        assert!(cfg.left_deep);
        assert_eq!(cfg.enabled_passes(), 3);
    }
}
