//! Role binding resource - attaches users and groups to a role.

use super::metadata;
use crate::cli::{ConnectionArgs, parse_key_value};
use crate::output;
use clap::Args;
use reconcile::{State, role_binding_differs, sync_with};
use sensukit::{Error, Result};
use serde_json::{Map, Value, json};

#[derive(Args)]
pub struct RoleBindingArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Role binding name
    pub name: String,

    /// Desired state
    #[arg(long, default_value = "present")]
    pub state: State,

    /// Namespaced role to bind (mutually exclusive with --cluster-role)
    #[arg(long)]
    pub role: Option<String>,

    /// Cluster role to bind (mutually exclusive with --role)
    #[arg(long)]
    pub cluster_role: Option<String>,

    /// User subject (repeatable)
    #[arg(long = "user")]
    pub users: Vec<String>,

    /// Group subject (repeatable)
    #[arg(long = "group")]
    pub groups: Vec<String>,

    /// Metadata label, as key=value (repeatable)
    #[arg(long = "label", value_parser = parse_key_value)]
    pub labels: Vec<(String, String)>,

    /// Metadata annotation, as key=value (repeatable)
    #[arg(long = "annotation", value_parser = parse_key_value)]
    pub annotations: Vec<(String, String)>,
}

/// Build the subject list from user and group names.
///
/// Shared with the cluster-role-binding module.
pub(crate) fn subjects(users: &[String], groups: &[String], state: State) -> Result<Value> {
    if state == State::Present && users.is_empty() && groups.is_empty() {
        return Err(Error::validation(
            "a present binding requires at least one --user or --group",
        ));
    }
    let mut list: Vec<Value> = Vec::with_capacity(users.len() + groups.len());
    for user in users {
        list.push(json!({"type": "User", "name": user}));
    }
    for group in groups {
        list.push(json!({"type": "Group", "name": group}));
    }
    Ok(Value::Array(list))
}

fn role_ref(args: &RoleBindingArgs) -> Result<Value> {
    match (&args.role, &args.cluster_role) {
        (Some(_), Some(_)) => Err(Error::validation(
            "--role and --cluster-role are mutually exclusive",
        )),
        (Some(role), None) => Ok(json!({"type": "Role", "name": role})),
        (None, Some(cluster_role)) => Ok(json!({"type": "ClusterRole", "name": cluster_role})),
        (None, None) => {
            if args.state == State::Present {
                Err(Error::validation(
                    "a present binding requires --role or --cluster-role",
                ))
            } else {
                Ok(Value::Null)
            }
        }
    }
}

fn build_payload(args: &RoleBindingArgs) -> Result<Map<String, Value>> {
    let role_ref = role_ref(args)?;
    let subjects = subjects(&args.users, &args.groups, args.state)?;

    let mut payload = Map::new();
    payload.insert(
        "metadata".to_string(),
        metadata(
            &args.name,
            Some(&args.conn.namespace),
            &args.labels,
            &args.annotations,
        ),
    );
    payload.insert("role_ref".to_string(), role_ref);
    payload.insert("subjects".to_string(), subjects);

    Ok(payload)
}

pub fn run(args: &RoleBindingArgs, check_mode: bool, quiet: bool) -> Result<()> {
    let payload = build_payload(args)?;
    let mut client = args.conn.client();
    let path = client.core_v2(&["rolebindings", &args.name]);
    let outcome = sync_with(
        args.state,
        &mut client,
        &path,
        &payload,
        check_mode,
        role_binding_differs,
    )?;
    output::emit("rolebinding", &args.name, &outcome, quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: RoleBindingArgs,
    }

    fn parse(argv: &[&str]) -> RoleBindingArgs {
        let mut full = vec!["harness"];
        full.extend_from_slice(argv);
        Harness::try_parse_from(full).unwrap().args
    }

    #[test]
    fn test_binding_payload() {
        let args = parse(&[
            "dev-binding", "--role", "dev",
            "--user", "alice", "--group", "devs",
        ]);
        let payload = build_payload(&args).unwrap();
        assert_eq!(payload["role_ref"], json!({"type": "Role", "name": "dev"}));
        assert_eq!(
            payload["subjects"],
            json!([
                {"type": "User", "name": "alice"},
                {"type": "Group", "name": "devs"}
            ])
        );
    }

    #[test]
    fn test_cluster_role_reference() {
        let args = parse(&["ops-binding", "--cluster-role", "admin", "--group", "ops"]);
        let payload = build_payload(&args).unwrap();
        assert_eq!(payload["role_ref"]["type"], "ClusterRole");
    }

    #[test]
    fn test_validation() {
        // No role reference.
        assert!(build_payload(&parse(&["b", "--user", "alice"])).is_err());
        // Both role references.
        assert!(
            build_payload(&parse(&["b", "--role", "x", "--cluster-role", "y", "--user", "a"]))
                .is_err()
        );
        // No subjects.
        assert!(build_payload(&parse(&["b", "--role", "x"])).is_err());
        // Absent needs nothing.
        assert!(build_payload(&parse(&["b", "--state", "absent"])).is_ok());
    }
}
