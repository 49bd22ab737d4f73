//! URL path builders for the backend API.
//!
//! Resource paths come in two scopes: namespaced
//! (`/api/core/v2/namespaces/<ns>/<kind>/<name>`) and cluster-wide
//! (`/api/core/v2/<kind>/<name>`). Enterprise-only APIs live under
//! `/api/enterprise/<group>/<version>` with the same namespace rule.
//! Every path segment is percent-encoded individually.

use std::borrow::Cow;

fn join(prefix: &str, namespace: Option<&str>, segments: &[&str]) -> String {
    let mut path = String::from(prefix);
    if let Some(ns) = namespace {
        path.push_str("/namespaces/");
        path.push_str(&escape(ns));
    }
    for segment in segments {
        path.push('/');
        path.push_str(&escape(segment));
    }
    path
}

fn escape(segment: &str) -> Cow<'_, str> {
    urlencoding::encode(segment)
}

/// Build a `/api/core/v2` path.
///
/// `namespace` is `None` for cluster-wide kinds (users, namespaces,
/// cluster roles).
#[must_use]
pub fn core_v2(namespace: Option<&str>, segments: &[&str]) -> String {
    join("/api/core/v2", namespace, segments)
}

/// Build a path for an enterprise API group, e.g. `secrets/v1`.
#[must_use]
pub fn enterprise(group: &str, version: &str, namespace: Option<&str>, segments: &[&str]) -> String {
    let prefix = format!("/api/enterprise/{}/{}", escape(group), escape(version));
    join(&prefix, namespace, segments)
}
