//! # reconcile
//!
//! The diff/sync engine behind every resource command: fetch the current
//! remote object, decide whether it already satisfies the desired
//! payload, and converge with at most one write followed by a re-fetch
//! of the authoritative state.
//!
//! ## Core Concepts
//!
//! - [`differs`]: structural comparison of a remote object against a
//!   desired payload (wildcards, server-added keys, nested objects)
//! - [`State`]: desired existence, `present` or `absent`
//! - [`sync`] / [`sync_with`]: the reconciliation state machine with
//!   check-mode support
//! - [`role_differs`] / [`role_binding_differs`] / [`secrets_differ`]:
//!   comparators for kinds whose equality is set-based
//!
//! ## Example
//!
//! ```no_run
//! use reconcile::{State, sync};
//! use sensukit::{Client, Credentials};
//! use serde_json::json;
//!
//! let mut client = Client::new(
//!     "http://localhost:8080",
//!     Credentials::basic("admin", "P@ssw0rd!"),
//!     Some("default".to_string()),
//! );
//!
//! let payload = match json!({"metadata": {"name": "ping"}, "command": "ping -c1 host"}) {
//!     serde_json::Value::Object(map) => map,
//!     _ => unreachable!(),
//! };
//! let path = client.core_v2(&["checks", "ping"]);
//! let outcome = sync(State::Present, &mut client, &path, &payload, false).unwrap();
//! println!("changed: {}", outcome.changed);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod differ;
pub mod rbac;
pub mod secrets;
pub mod sync;

pub use differ::differs;
pub use rbac::{role_binding_differs, role_differs};
pub use secrets::secrets_differ;
pub use sync::{State, SyncOutcome, delete, get, put, sync, sync_with};
