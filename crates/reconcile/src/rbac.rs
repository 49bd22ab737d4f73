//! Comparators for RBAC roles and role bindings.
//!
//! Rule and subject lists are unordered on the backend: two roles with
//! the same rules in a different textual order are the same role. The
//! generic structural diff compares lists positionally, so these kinds
//! normalise their collections to sets first.
//!
//! One deliberate asymmetry against the generic diff: a rule field that
//! is `null`/missing on one side and an explicit (even empty) list on
//! the other IS a difference. Rule identity requires the fields to agree
//! explicitly.

use crate::differ::differs;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Rule {
    verbs: Option<BTreeSet<String>>,
    resources: Option<BTreeSet<String>>,
    resource_names: Option<BTreeSet<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Subject {
    kind: String,
    name: String,
}

fn string_set(value: Option<&Value>) -> Option<BTreeSet<String>> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        ),
        Some(other) => Some(BTreeSet::from([other.to_string()])),
    }
}

fn rule_set(value: Option<&Value>) -> BTreeSet<Rule> {
    value
        .and_then(Value::as_array)
        .map(|rules| {
            rules
                .iter()
                .filter_map(Value::as_object)
                .map(|rule| Rule {
                    verbs: string_set(rule.get("verbs")),
                    resources: string_set(rule.get("resources")),
                    resource_names: string_set(rule.get("resource_names")),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn subject_set(value: Option<&Value>) -> BTreeSet<Subject> {
    value
        .and_then(Value::as_array)
        .map(|subjects| {
            subjects
                .iter()
                .filter_map(Value::as_object)
                .map(|subject| Subject {
                    kind: subject
                        .get("type")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    name: subject
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Comparator for roles and cluster roles: everything but `rules` goes
/// through the generic diff, rules compare as an unordered set.
#[must_use]
pub fn role_differs(current: Option<&Map<String, Value>>, desired: &Map<String, Value>) -> bool {
    let Some(current) = current else {
        return true;
    };
    if differs(Some(current), desired, &["rules"]) {
        return true;
    }
    rule_set(current.get("rules")) != rule_set(desired.get("rules"))
}

/// Comparator for role bindings and cluster role bindings: `role_ref`
/// flows through the generic diff, subjects compare as an unordered set.
#[must_use]
pub fn role_binding_differs(
    current: Option<&Map<String, Value>>,
    desired: &Map<String, Value>,
) -> bool {
    let Some(current) = current else {
        return true;
    };
    if differs(Some(current), desired, &["subjects"]) {
        return true;
    }
    subject_set(current.get("subjects")) != subject_set(desired.get("subjects"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn test_missing_role_differs() {
        assert!(role_differs(None, &obj(json!({"rules": []}))));
    }

    #[test]
    fn test_rule_order_does_not_matter() {
        let current = obj(json!({
            "metadata": {"name": "ops"},
            "rules": [
                {"verbs": ["get", "list"], "resources": ["checks"], "resource_names": null},
                {"verbs": ["*"], "resources": ["entities"], "resource_names": null}
            ]
        }));
        let desired = obj(json!({
            "metadata": {"name": "ops"},
            "rules": [
                {"verbs": ["*"], "resources": ["entities"], "resource_names": null},
                {"verbs": ["list", "get"], "resources": ["checks"], "resource_names": null}
            ]
        }));
        assert!(!role_differs(Some(&current), &desired));
    }

    #[test]
    fn test_changed_verbs_are_detected() {
        let current = obj(json!({
            "rules": [{"verbs": ["get"], "resources": ["checks"], "resource_names": null}]
        }));
        let desired = obj(json!({
            "rules": [{"verbs": ["get", "delete"], "resources": ["checks"], "resource_names": null}]
        }));
        assert!(role_differs(Some(&current), &desired));
    }

    #[test]
    fn test_added_rule_is_detected() {
        let current = obj(json!({
            "rules": [{"verbs": ["get"], "resources": ["checks"]}]
        }));
        let desired = obj(json!({
            "rules": [
                {"verbs": ["get"], "resources": ["checks"]},
                {"verbs": ["get"], "resources": ["entities"]}
            ]
        }));
        assert!(role_differs(Some(&current), &desired));
        // And the reverse: dropping a rule is a difference too.
        assert!(role_differs(Some(&desired), &current));
    }

    #[test]
    fn test_null_field_differs_from_empty_list() {
        let current = obj(json!({
            "rules": [{"verbs": ["get"], "resources": ["checks"], "resource_names": null}]
        }));
        let desired = obj(json!({
            "rules": [{"verbs": ["get"], "resources": ["checks"], "resource_names": []}]
        }));
        assert!(role_differs(Some(&current), &desired));
    }

    #[test]
    fn test_missing_field_equals_null_field() {
        let current = obj(json!({
            "rules": [{"verbs": ["get"], "resources": ["checks"]}]
        }));
        let desired = obj(json!({
            "rules": [{"verbs": ["get"], "resources": ["checks"], "resource_names": null}]
        }));
        assert!(!role_differs(Some(&current), &desired));
    }

    #[test]
    fn test_metadata_changes_still_count() {
        let current = obj(json!({"metadata": {"name": "ops", "labels": {"team": "a"}}, "rules": []}));
        let desired = obj(json!({"metadata": {"name": "ops", "labels": {"team": "b"}}, "rules": []}));
        assert!(role_differs(Some(&current), &desired));
    }

    #[test]
    fn test_subject_order_does_not_matter() {
        let current = obj(json!({
            "role_ref": {"type": "Role", "name": "ops"},
            "subjects": [
                {"type": "User", "name": "alice"},
                {"type": "Group", "name": "admins"}
            ]
        }));
        let desired = obj(json!({
            "role_ref": {"type": "Role", "name": "ops"},
            "subjects": [
                {"type": "Group", "name": "admins"},
                {"type": "User", "name": "alice"}
            ]
        }));
        assert!(!role_binding_differs(Some(&current), &desired));
    }

    #[test]
    fn test_subject_changes_are_detected() {
        let current = obj(json!({
            "role_ref": {"type": "Role", "name": "ops"},
            "subjects": [{"type": "User", "name": "alice"}]
        }));
        let desired = obj(json!({
            "role_ref": {"type": "Role", "name": "ops"},
            "subjects": [{"type": "User", "name": "bob"}]
        }));
        assert!(role_binding_differs(Some(&current), &desired));
    }

    #[test]
    fn test_role_ref_change_is_detected() {
        let current = obj(json!({
            "role_ref": {"type": "Role", "name": "ops"},
            "subjects": [{"type": "User", "name": "alice"}]
        }));
        let desired = obj(json!({
            "role_ref": {"type": "ClusterRole", "name": "ops"},
            "subjects": [{"type": "User", "name": "alice"}]
        }));
        assert!(role_binding_differs(Some(&current), &desired));
    }
}
