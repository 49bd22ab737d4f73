//! Role resource - namespaced RBAC rules.

use super::metadata;
use crate::cli::{ConnectionArgs, parse_json_object, parse_key_value};
use crate::output;
use clap::Args;
use reconcile::{State, role_differs, sync_with};
use sensukit::{Error, Result};
use serde_json::{Map, Value};

#[derive(Args)]
pub struct RoleArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Role name
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

/// Validate rule objects and collect them into the payload list.
///
/// Shared with the cluster-role module, which differs only in scope.
pub(crate) fn validated_rules(rules: &[Map<String, Value>], state: State) -> Result<Value> {
    if state == State::Present {
        if rules.is_empty() {
            return Err(Error::validation("a present role requires at least one --rule"));
        }
        for rule in rules {
            let has_verbs = rule.get("verbs").is_some_and(Value::is_array);
            let has_resources = rule.get("resources").is_some_and(Value::is_array);
            if !has_verbs || !has_resources {
                return Err(Error::validation(
                    "every rule needs verbs and resources lists",
                ));
            }
        }
    }
    Ok(Value::Array(rules.iter().cloned().map(Value::Object).collect()))
}

fn build_payload(args: &RoleArgs) -> Result<Map<String, Value>> {
    let rules = validated_rules(&args.rules, args.state)?;

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
    payload.insert("rules".to_string(), rules);

    Ok(payload)
}

pub fn run(args: &RoleArgs, check_mode: bool, quiet: bool) -> Result<()> {
    let payload = build_payload(args)?;
    let mut client = args.conn.client();
    let path = client.core_v2(&["roles", &args.name]);
    let outcome = sync_with(args.state, &mut client, &path, &payload, check_mode, role_differs)?;
    output::emit("role", &args.name, &outcome, quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::json;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: RoleArgs,
    }

    fn parse(argv: &[&str]) -> RoleArgs {
        let mut full = vec!["harness"];
        full.extend_from_slice(argv);
        Harness::try_parse_from(full).unwrap().args
    }

    #[test]
    fn test_role_payload() {
        let args = parse(&[
            "readonly",
            "--rule", r#"{"verbs": ["get", "list"], "resources": ["checks", "entities"]}"#,
        ]);
        let payload = build_payload(&args).unwrap();
        assert_eq!(payload["metadata"]["namespace"], "default");
        assert_eq!(
            payload["rules"],
            json!([{"verbs": ["get", "list"], "resources": ["checks", "entities"]}])
        );
    }

    #[test]
    fn test_present_requires_complete_rules() {
        assert!(build_payload(&parse(&["r"])).is_err());

        let args = parse(&["r", "--rule", r#"{"verbs": ["get"]}"#]);
        let err = build_payload(&args).unwrap_err();
        assert!(err.to_string().contains("resources"));
    }

    #[test]
    fn test_absent_accepts_no_rules() {
        assert!(build_payload(&parse(&["r", "--state", "absent"])).is_ok());
    }
}
