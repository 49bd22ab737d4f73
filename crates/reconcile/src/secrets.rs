//! Comparator for kinds that carry a `secrets` list.
//!
//! Checks, handlers and mutators reference secrets as a list of
//! `{name, secret}` pairs whose order the backend does not preserve.

use crate::differ::differs;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

fn secret_set(value: Option<&Value>) -> BTreeSet<(String, String)> {
    value
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_object)
                .map(|entry| {
                    (
                        entry
                            .get("name")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        entry
                            .get("secret")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Comparator for secret-bearing kinds: everything but `secrets` goes
/// through the generic diff, the secrets list compares as an unordered
/// set where a missing list equals an empty one.
#[must_use]
pub fn secrets_differ(current: Option<&Map<String, Value>>, desired: &Map<String, Value>) -> bool {
    let Some(current) = current else {
        return true;
    };
    if differs(Some(current), desired, &["secrets"]) {
        return true;
    }
    secret_set(current.get("secrets")) != secret_set(desired.get("secrets"))
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
    fn test_secret_order_does_not_matter() {
        let current = obj(json!({
            "command": "check-db.sh",
            "secrets": [
                {"name": "PGPASSWORD", "secret": "pg-password"},
                {"name": "PGUSER", "secret": "pg-user"}
            ]
        }));
        let desired = obj(json!({
            "command": "check-db.sh",
            "secrets": [
                {"name": "PGUSER", "secret": "pg-user"},
                {"name": "PGPASSWORD", "secret": "pg-password"}
            ]
        }));
        assert!(!secrets_differ(Some(&current), &desired));
    }

    #[test]
    fn test_added_secret_is_detected() {
        let current = obj(json!({"secrets": [{"name": "A", "secret": "a"}]}));
        let desired = obj(json!({
            "secrets": [{"name": "A", "secret": "a"}, {"name": "B", "secret": "b"}]
        }));
        assert!(secrets_differ(Some(&current), &desired));
    }

    #[test]
    fn test_removing_last_secret_is_detected() {
        let current = obj(json!({"secrets": [{"name": "A", "secret": "a"}]}));
        let desired = obj(json!({"secrets": []}));
        assert!(secrets_differ(Some(&current), &desired));
    }

    #[test]
    fn test_missing_list_equals_empty_list() {
        let current = obj(json!({"command": "true"}));
        let desired = obj(json!({"command": "true", "secrets": []}));
        assert!(!secrets_differ(Some(&current), &desired));
    }

    #[test]
    fn test_other_fields_still_compared() {
        let current = obj(json!({"command": "old", "secrets": []}));
        let desired = obj(json!({"command": "new", "secrets": []}));
        assert!(secrets_differ(Some(&current), &desired));
    }

    #[test]
    fn test_missing_object_differs() {
        assert!(secrets_differ(None, &obj(json!({"secrets": []}))));
    }
}
