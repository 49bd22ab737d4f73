//! User resource.
//!
//! Users are cluster-wide and have two quirks the generic flow cannot
//! cover: the backend never returns password material, so password
//! drift is detected by test-authenticating with the desired password;
//! and users cannot be hard-deleted, so `absent` converges on a
//! disabled account instead of issuing a DELETE.

use crate::cli::ConnectionArgs;
use crate::output;
use clap::Args;
use reconcile::{State, SyncOutcome, differs, get, put};
use sensukit::{Client, Error, Result};
use serde_json::{Map, Value};

#[derive(Args)]
pub struct UserArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// User name
    pub name: String,

    /// Desired state; absent disables the account
    #[arg(long, default_value = "present")]
    pub state: State,

    /// Password; required when the user does not exist yet
    #[arg(long, env = "SENSU_USER_PASSWORD")]
    pub user_password: Option<String>,

    /// Group membership (repeatable)
    #[arg(long = "group")]
    pub groups: Vec<String>,
}

fn build_payload(args: &UserArgs) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("username".to_string(), Value::String(args.name.clone()));
    if !args.groups.is_empty() {
        payload.insert(
            "groups".to_string(),
            Value::Array(args.groups.iter().cloned().map(Value::String).collect()),
        );
    }
    payload.insert("disabled".to_string(), Value::Bool(false));
    if let Some(password) = &args.user_password {
        payload.insert("password".to_string(), Value::String(password.clone()));
    }
    payload
}

fn without_password(payload: &Map<String, Value>) -> Map<String, Value> {
    let mut copy = payload.clone();
    copy.remove("password");
    copy
}

fn ensure_present(
    client: &mut Client,
    args: &UserArgs,
    path: &str,
    current: Option<Map<String, Value>>,
    check_mode: bool,
) -> Result<SyncOutcome> {
    let payload = build_payload(args);

    let needs_update = match &current {
        None => {
            if args.user_password.is_none() {
                return Err(Error::validation(
                    "creating a user requires --user-password",
                ));
            }
            true
        }
        Some(current) => {
            let mut changed = differs(Some(current), &without_password(&payload), &[]);
            if let Some(password) = &args.user_password {
                if !client.validate_auth_data(&args.name, password)? {
                    changed = true;
                }
            }
            changed
        }
    };

    if !needs_update {
        return Ok(SyncOutcome {
            changed: false,
            object: current,
        });
    }
    if check_mode {
        return Ok(SyncOutcome {
            changed: true,
            object: Some(without_password(&payload)),
        });
    }
    put(client, path, &payload)?;
    log::info!("updated {}", path);
    let refreshed = get(client, path)?;
    Ok(SyncOutcome {
        changed: true,
        object: refreshed,
    })
}

fn ensure_disabled(
    client: &mut Client,
    path: &str,
    current: Option<Map<String, Value>>,
    check_mode: bool,
) -> Result<SyncOutcome> {
    let Some(current) = current else {
        return Ok(SyncOutcome {
            changed: false,
            object: None,
        });
    };
    if current.get("disabled") == Some(&Value::Bool(true)) {
        return Ok(SyncOutcome {
            changed: false,
            object: Some(current),
        });
    }

    let mut payload = current;
    payload.insert("disabled".to_string(), Value::Bool(true));

    if check_mode {
        return Ok(SyncOutcome {
            changed: true,
            object: Some(payload),
        });
    }
    put(client, path, &payload)?;
    log::info!("disabled {}", path);
    let refreshed = get(client, path)?;
    Ok(SyncOutcome {
        changed: true,
        object: refreshed,
    })
}

fn ensure(client: &mut Client, args: &UserArgs, check_mode: bool) -> Result<SyncOutcome> {
    let path = client.cluster_v2(&["users", &args.name]);
    let current = get(client, &path)?;

    match args.state {
        State::Present => ensure_present(client, args, &path, current, check_mode),
        State::Absent => ensure_disabled(client, &path, current, check_mode),
    }
}

pub fn run(args: &UserArgs, check_mode: bool, quiet: bool) -> Result<()> {
    let mut client = args.conn.client();
    let outcome = ensure(&mut client, args, check_mode)?;
    output::emit("user", &args.name, &outcome, quiet);
    Ok(())
}
