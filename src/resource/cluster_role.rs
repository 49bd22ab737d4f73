//! Cluster role resource - RBAC rules that apply across namespaces.

use super::metadata;
use super::role::validated_rules;
use crate::cli::{ConnectionArgs, parse_json_object, parse_key_value};
use crate::output;
use clap::Args;
use reconcile::{State, role_differs, sync_with};
use sensukit::Result;
use serde_json::{Map, Value};

#[derive(Args)]
pub struct ClusterRoleArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Cluster role name
    pub name: String,

    /// Desired state
    #[arg(long, default_value = "present")]
    pub state: State,

    /// Rule as a JSON object with verbs, resources and optional
    /// resource_names lists (repeatable)
    #[arg(long = "rule", value_parser = parse_json_object)]
    pub rules: Vec<Map<String, Value>>,

    /// Metadata label, as key=value (repeatable)
    #[arg(long = "label", value_parser = parse_key_value)]
    pub labels: Vec<(String, String)>,

    /// Metadata annotation, as key=value (repeatable)
    #[arg(long = "annotation", value_parser = parse_key_value)]
    pub annotations: Vec<(String, String)>,
}

fn build_payload(args: &ClusterRoleArgs) -> Result<Map<String, Value>> {
    let rules = validated_rules(&args.rules, args.state)?;

    let mut payload = Map::new();
    payload.insert(
        "metadata".to_string(),
        metadata(&args.name, None, &args.labels, &args.annotations),
    );
    payload.insert("rules".to_string(), rules);

    Ok(payload)
}

pub fn run(args: &ClusterRoleArgs, check_mode: bool, quiet: bool) -> Result<()> {
    let payload = build_payload(args)?;
    let mut client = args.conn.client();
    let path = client.cluster_v2(&["clusterroles", &args.name]);
    let outcome = sync_with(args.state, &mut client, &path, &payload, check_mode, role_differs)?;
    output::emit("clusterrole", &args.name, &outcome, quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: ClusterRoleArgs,
    }

    #[test]
    fn test_cluster_role_has_no_namespace() {
        let args = Harness::try_parse_from([
            "harness",
            "global-readonly",
            "--rule",
            r#"{"verbs": ["get"], "resources": ["*"]}"#,
        ])
        .unwrap()
        .args;
        let payload = build_payload(&args).unwrap();
        assert!(payload["metadata"].get("namespace").is_none());
        assert_eq!(payload["metadata"]["name"], "global-readonly");
    }
}
