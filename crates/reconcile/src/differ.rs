//! Structural comparison between a remote object and a desired payload.
//!
//! The comparison is asymmetric on purpose: it answers "does the remote
//! object already satisfy the desired payload", not "are the documents
//! equal". Keys the server adds on its own (`created_by`, timestamps,
//! defaults) must never force a write, and a desired value of `null`
//! means the caller does not care what the remote side holds.

use serde_json::{Map, Value};
use std::mem;

/// Compare a remote object against a desired payload.
///
/// Returns `true` when a write is needed. Rules, per desired key (keys
/// listed in `ignore` are skipped entirely):
///
/// - a missing remote object always differs;
/// - desired `null` is a wildcard and never differs;
/// - a missing/null remote value matches an effectively empty desired
///   value (`null`, `{}`, `[]`, `""`);
/// - two objects recurse; mismatched value kinds differ;
/// - anything else compares by value equality;
/// - keys only present on the remote side are ignored, and so is
///   `created_by` inside `metadata` when both sides carry a metadata
///   object.
#[must_use]
pub fn differs(
    current: Option<&Map<String, Value>>,
    desired: &Map<String, Value>,
    ignore: &[&str],
) -> bool {
    let Some(current) = current else {
        return true;
    };

    for (key, desired_value) in desired {
        if ignore.contains(&key.as_str()) {
            continue;
        }
        let current_value = current.get(key);

        if key == "metadata" {
            if let (Some(Value::Object(current_meta)), Value::Object(desired_meta)) =
                (current_value, desired_value)
            {
                if differs(Some(current_meta), desired_meta, &["created_by"]) {
                    return true;
                }
                continue;
            }
        }

        if value_differs(key, current_value, desired_value) {
            return true;
        }
    }
    false
}

fn value_differs(key: &str, current: Option<&Value>, desired: &Value) -> bool {
    if desired.is_null() {
        return false;
    }

    match current {
        None | Some(Value::Null) => !effectively_empty(desired),
        Some(current) => match (current, desired) {
            (Value::Object(current_map), Value::Object(desired_map)) => {
                differs(Some(current_map), desired_map, &[])
            }
            (current, desired) if mem::discriminant(current) != mem::discriminant(desired) => {
                log::debug!(
                    "key '{}' changed shape: remote holds {}, payload holds {}",
                    key,
                    kind_name(current),
                    kind_name(desired)
                );
                true
            }
            (current, desired) => current != desired,
        },
    }
}

fn effectively_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
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
    fn test_missing_remote_always_differs() {
        assert!(differs(None, &obj(json!({})), &[]));
        assert!(differs(None, &obj(json!({"a": 1})), &[]));
    }

    #[test]
    fn test_equal_documents_do_not_differ() {
        let current = obj(json!({"command": "echo test", "interval": 60}));
        let desired = obj(json!({"command": "echo test", "interval": 60}));
        assert!(!differs(Some(&current), &desired, &[]));
    }

    #[test]
    fn test_desired_null_is_wildcard() {
        let current = obj(json!({"a": "b"}));
        let desired = obj(json!({"c": null}));
        assert!(!differs(Some(&current), &desired, &[]));

        let desired = obj(json!({"a": null}));
        assert!(!differs(Some(&current), &desired, &[]));
    }

    #[test]
    fn test_extra_remote_keys_are_ignored() {
        let current = obj(json!({"command": "echo", "issued": 12345, "history": [1, 2]}));
        let desired = obj(json!({"command": "echo"}));
        assert!(!differs(Some(&current), &desired, &[]));
    }

    #[test]
    fn test_value_change_is_detected() {
        let current = obj(json!({"command": "echo old"}));
        let desired = obj(json!({"command": "echo new"}));
        assert!(differs(Some(&current), &desired, &[]));
    }

    #[test]
    fn test_missing_remote_key_matches_empty_desired() {
        let current = obj(json!({"a": 1}));
        assert!(!differs(Some(&current), &obj(json!({"labels": {}})), &[]));
        assert!(!differs(Some(&current), &obj(json!({"handlers": []})), &[]));
        assert!(!differs(Some(&current), &obj(json!({"note": ""})), &[]));
    }

    #[test]
    fn test_missing_remote_key_differs_from_concrete_desired() {
        let current = obj(json!({"a": 1}));
        assert!(differs(Some(&current), &obj(json!({"handlers": ["slack"]})), &[]));
        assert!(differs(Some(&current), &obj(json!({"publish": false})), &[]));
        assert!(differs(Some(&current), &obj(json!({"interval": 0})), &[]));
    }

    #[test]
    fn test_null_remote_value_behaves_like_missing() {
        let current = obj(json!({"handlers": null}));
        assert!(!differs(Some(&current), &obj(json!({"handlers": []})), &[]));
        assert!(differs(Some(&current), &obj(json!({"handlers": ["slack"]})), &[]));
    }

    #[test]
    fn test_nested_objects_recurse() {
        let current = obj(json!({"metadata": {"name": "ping", "namespace": "default"}}));
        let same = obj(json!({"metadata": {"name": "ping"}}));
        let renamed = obj(json!({"metadata": {"name": "pong"}}));
        assert!(!differs(Some(&current), &same, &[]));
        assert!(differs(Some(&current), &renamed, &[]));
    }

    #[test]
    fn test_created_by_is_ignored_when_both_have_metadata() {
        let current = obj(json!({"metadata": {"a": 1, "created_by": "x"}}));
        let desired = obj(json!({"metadata": {"a": 1}}));
        assert!(!differs(Some(&current), &desired, &[]));

        let desired_with_created_by = obj(json!({"metadata": {"a": 1, "created_by": "y"}}));
        assert!(!differs(Some(&current), &desired_with_created_by, &[]));

        let changed = obj(json!({"metadata": {"a": 2, "created_by": "x"}}));
        assert!(differs(Some(&current), &changed, &[]));
    }

    #[test]
    fn test_metadata_special_case_needs_objects_on_both_sides() {
        // Remote metadata is not an object, so the generic rules apply
        // and the shape mismatch is a difference.
        let current = obj(json!({"metadata": "oops"}));
        let desired = obj(json!({"metadata": {"name": "ping"}}));
        assert!(differs(Some(&current), &desired, &[]));
    }

    #[test]
    fn test_shape_mismatch_is_a_difference() {
        let current = obj(json!({"subscriptions": {"web": true}}));
        let desired = obj(json!({"subscriptions": ["web"]}));
        assert!(differs(Some(&current), &desired, &[]));

        let current = obj(json!({"interval": "60"}));
        let desired = obj(json!({"interval": 60}));
        assert!(differs(Some(&current), &desired, &[]));
    }

    #[test]
    fn test_ignored_keys_are_skipped() {
        let current = obj(json!({"rules": [1], "metadata": {"name": "ops"}}));
        let desired = obj(json!({"rules": [2], "metadata": {"name": "ops"}}));
        assert!(!differs(Some(&current), &desired, &["rules"]));
        assert!(differs(Some(&current), &desired, &[]));
    }

    #[test]
    fn test_lists_compare_by_value_and_order() {
        let current = obj(json!({"subscriptions": ["a", "b"]}));
        assert!(!differs(Some(&current), &obj(json!({"subscriptions": ["a", "b"]})), &[]));
        assert!(differs(Some(&current), &obj(json!({"subscriptions": ["b", "a"]})), &[]));
    }
}
