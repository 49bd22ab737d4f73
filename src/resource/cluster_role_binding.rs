//! Cluster role binding resource - attaches subjects to a cluster role.

use super::metadata;
use super::role_binding::subjects;
use crate::cli::{ConnectionArgs, parse_key_value};
use crate::output;
use clap::Args;
use reconcile::{State, role_binding_differs, sync_with};
use sensukit::{Error, Result};
use serde_json::{Map, Value, json};

#[derive(Args)]
pub struct ClusterRoleBindingArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Cluster role binding name
    pub name: String,

    /// Desired state
    #[arg(long, default_value = "present")]
    pub state: State,

    /// Cluster role to bind
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

fn build_payload(args: &ClusterRoleBindingArgs) -> Result<Map<String, Value>> {
    if args.state == State::Present && args.cluster_role.is_none() {
        return Err(Error::validation(
            "a present cluster role binding requires --cluster-role",
        ));
    }
    let subjects = subjects(&args.users, &args.groups, args.state)?;

    let mut payload = Map::new();
    payload.insert(
        "metadata".to_string(),
        metadata(&args.name, None, &args.labels, &args.annotations),
    );
    if let Some(cluster_role) = &args.cluster_role {
        payload.insert(
            "role_ref".to_string(),
            json!({"type": "ClusterRole", "name": cluster_role}),
        );
    }
    payload.insert("subjects".to_string(), subjects);

    Ok(payload)
}

pub fn run(args: &ClusterRoleBindingArgs, check_mode: bool, quiet: bool) -> Result<()> {
    let payload = build_payload(args)?;
    let mut client = args.conn.client();
    let path = client.cluster_v2(&["clusterrolebindings", &args.name]);
    let outcome = sync_with(
        args.state,
        &mut client,
        &path,
        &payload,
        check_mode,
        role_binding_differs,
    )?;
    output::emit("clusterrolebinding", &args.name, &outcome, quiet);
    Ok(())
}
