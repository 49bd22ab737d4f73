//! State reconciliation: converge one remote object on a desired state
//! with at most one mutating call, then report the authoritative result.

use crate::differ::differs;
use sensukit::{Client, Error, Result};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Desired existence of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// The resource should exist and match the payload.
    Present,
    /// The resource should not exist.
    Absent,
}

impl FromStr for State {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            other => Err(Error::validation(format!(
                "state must be 'present' or 'absent', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// Whether a change was (or, in check mode, would be) made.
    pub changed: bool,
    /// The resulting object: the remote state after convergence, or the
    /// payload itself in check mode, or `None` for absent resources.
    pub object: Option<Map<String, Value>>,
}

impl SyncOutcome {
    fn new(changed: bool, object: Option<Map<String, Value>>) -> Self {
        Self { changed, object }
    }
}

/// Fetch the current object at `path`.
///
/// 404 means the object does not exist and maps to `None`.
///
/// # Errors
///
/// `Error::Json` for a 200 answer that is not a JSON object,
/// `Error::Sync` for any other unexpected status.
pub fn get(client: &mut Client, path: &str) -> Result<Option<Map<String, Value>>> {
    let resp = client.get(path)?;
    match resp.status {
        200 => match resp.into_json() {
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(_) => Err(Error::json(path, "expected a JSON object")),
            None => Err(Error::json(path, "body does not parse")),
        },
        404 => Ok(None),
        status => Err(Error::sync(path, status, resp.data)),
    }
}

/// Create or replace the object at `path`. The backend answers 201 for
/// a successful write; anything else aborts the run.
pub fn put(client: &mut Client, path: &str, payload: &Map<String, Value>) -> Result<()> {
    let body = Value::Object(payload.clone());
    let resp = client.put(path, &body)?;
    if resp.status != 201 {
        return Err(Error::sync(path, resp.status, resp.data));
    }
    Ok(())
}

/// Remove the object at `path`. The backend answers 204 on success.
pub fn delete(client: &mut Client, path: &str) -> Result<()> {
    let resp = client.delete(path)?;
    if resp.status != 204 {
        return Err(Error::sync(path, resp.status, resp.data));
    }
    Ok(())
}

/// Reconcile with the generic structural comparison.
pub fn sync(
    state: State,
    client: &mut Client,
    path: &str,
    payload: &Map<String, Value>,
    check_mode: bool,
) -> Result<SyncOutcome> {
    sync_with(state, client, path, payload, check_mode, |current, desired| {
        differs(current, desired, &[])
    })
}

/// Reconcile with a caller-supplied comparison.
///
/// Kinds whose equality is an unordered-collection question (RBAC
/// rules and subjects, secrets lists) substitute their own comparator;
/// everything else goes through [`sync`].
///
/// The flow per desired state:
///
/// - `absent`: a missing object is a no-op; an existing one is deleted
///   (skipped in check mode) and reported as changed.
/// - `present`: an object the comparator accepts is a no-op; otherwise
///   check mode reports the payload as a preview, real mode writes and
///   re-fetches so the caller sees what the backend actually stored
///   rather than the client-built payload.
pub fn sync_with<F>(
    state: State,
    client: &mut Client,
    path: &str,
    payload: &Map<String, Value>,
    check_mode: bool,
    compare: F,
) -> Result<SyncOutcome>
where
    F: Fn(Option<&Map<String, Value>>, &Map<String, Value>) -> bool,
{
    let current = get(client, path)?;

    match state {
        State::Absent => {
            if current.is_none() {
                return Ok(SyncOutcome::new(false, None));
            }
            if !check_mode {
                delete(client, path)?;
                log::info!("deleted {}", path);
            }
            Ok(SyncOutcome::new(true, None))
        }
        State::Present => {
            if !compare(current.as_ref(), payload) {
                return Ok(SyncOutcome::new(false, current));
            }
            if check_mode {
                return Ok(SyncOutcome::new(true, Some(payload.clone())));
            }
            put(client, path, payload)?;
            log::info!("updated {}", path);
            let refreshed = get(client, path)?;
            Ok(SyncOutcome::new(true, refreshed))
        }
    }
}
