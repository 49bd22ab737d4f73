//! Resource modules - one file per managed kind.
//!
//! Every module follows the same shape: validate parameters, build the
//! desired payload, build the resource path, hand both to the engine,
//! report the outcome. The helpers here cover the payload pieces all
//! kinds share.

pub mod asset;
pub mod bonsai_asset;
pub mod check;
pub mod cluster_role;
pub mod cluster_role_binding;
pub mod datastore;
pub mod entity;
pub mod filter;
pub mod handler;
pub mod mutator;
pub mod namespace;
pub mod pipeline;
pub mod role;
pub mod role_binding;
pub mod secret;
pub mod silence;
pub mod user;

use serde_json::{Map, Value};

/// Build a `metadata` object from name, optional namespace, and
/// key=value label/annotation pairs.
///
/// The backend only stores string-valued labels and annotations, so
/// values arrive here already as strings.
pub fn metadata(
    name: &str,
    namespace: Option<&str>,
    labels: &[(String, String)],
    annotations: &[(String, String)],
) -> Value {
    let mut meta = Map::new();
    meta.insert("name".to_string(), Value::String(name.to_string()));
    if let Some(ns) = namespace {
        meta.insert("namespace".to_string(), Value::String(ns.to_string()));
    }
    if !labels.is_empty() {
        meta.insert("labels".to_string(), Value::Object(pairs_to_map(labels)));
    }
    if !annotations.is_empty() {
        meta.insert(
            "annotations".to_string(),
            Value::Object(pairs_to_map(annotations)),
        );
    }
    Value::Object(meta)
}

fn pairs_to_map(pairs: &[(String, String)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect()
}

/// Coerce every value in a JSON object to a string.
///
/// Registry metadata may carry numbers or bools where the backend
/// stores strings; comparing them un-coerced would report a permanent
/// diff.
pub fn string_map(value: &Value) -> Map<String, Value> {
    value
        .as_object()
        .map(|map| {
            map.iter()
                .map(|(key, value)| {
                    let coerced = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (key.clone(), Value::String(coerced))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Insert `key` only when a value was actually given.
pub fn insert_opt<T: Into<Value>>(payload: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        payload.insert(key.to_string(), value.into());
    }
}

/// Insert a string list only when it is non-empty.
pub fn insert_list(payload: &mut Map<String, Value>, key: &str, items: &[String]) {
    if !items.is_empty() {
        payload.insert(
            key.to_string(),
            Value::Array(items.iter().cloned().map(Value::String).collect()),
        );
    }
}

/// Build the `secrets` list from VAR=secret-name pairs.
///
/// Always present, possibly empty, so that removing the last secret is
/// seen as a change.
pub fn secrets_list(secrets: &[(String, String)]) -> Value {
    Value::Array(
        secrets
            .iter()
            .map(|(name, secret)| {
                let mut entry = Map::new();
                entry.insert("name".to_string(), Value::String(name.clone()));
                entry.insert("secret".to_string(), Value::String(secret.clone()));
                Value::Object(entry)
            })
            .collect(),
    )
}
