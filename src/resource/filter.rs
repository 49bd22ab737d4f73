//! Event filter resource.

use super::{insert_list, insert_opt, metadata};
use crate::cli::{ConnectionArgs, parse_key_value};
use crate::output;
use clap::{Args, ValueEnum};
use reconcile::{State, sync};
use sensukit::{Error, Result};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterAction {
    Allow,
    Deny,
}

impl FilterAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }
}

#[derive(Args)]
pub struct FilterArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Filter name
    pub name: String,

    /// Desired state
    #[arg(long, default_value = "present")]
    pub state: State,

    /// Whether matching events are allowed through or denied
    #[arg(long, value_enum)]
    pub action: Option<FilterAction>,

    /// Filter expression; all must match (repeatable)
    #[arg(long = "expression")]
    pub expressions: Vec<String>,

    /// Runtime asset the expressions need (repeatable)
    #[arg(long = "runtime-asset")]
    pub runtime_assets: Vec<String>,

    /// Metadata label, as key=value (repeatable)
    #[arg(long = "label", value_parser = parse_key_value)]
    pub labels: Vec<(String, String)>,

    /// Metadata annotation, as key=value (repeatable)
    #[arg(long = "annotation", value_parser = parse_key_value)]
    pub annotations: Vec<(String, String)>,
}

fn build_payload(args: &FilterArgs) -> Result<Map<String, Value>> {
    if args.state == State::Present {
        if args.action.is_none() {
            return Err(Error::validation("a present filter requires --action"));
        }
        if args.expressions.is_empty() {
            return Err(Error::validation(
                "a present filter requires at least one --expression",
            ));
        }
    }

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
    insert_opt(&mut payload, "action", args.action.map(FilterAction::as_str));
    insert_list(&mut payload, "expressions", &args.expressions);
    insert_list(&mut payload, "runtime_assets", &args.runtime_assets);

    Ok(payload)
}

pub fn run(args: &FilterArgs, check_mode: bool, quiet: bool) -> Result<()> {
    let payload = build_payload(args)?;
    let mut client = args.conn.client();
    let path = client.core_v2(&["filters", &args.name]);
    let outcome = sync(args.state, &mut client, &path, &payload, check_mode)?;
    output::emit("filter", &args.name, &outcome, quiet);
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
        args: FilterArgs,
    }

    fn parse(argv: &[&str]) -> FilterArgs {
        let mut full = vec!["harness"];
        full.extend_from_slice(argv);
        Harness::try_parse_from(full).unwrap().args
    }

    #[test]
    fn test_filter_payload() {
        let args = parse(&[
            "is_incident", "--action", "allow",
            "--expression", "event.check.occurrences == 1",
        ]);
        let payload = build_payload(&args).unwrap();
        assert_eq!(payload["action"], "allow");
        assert_eq!(payload["expressions"], json!(["event.check.occurrences == 1"]));
    }

    #[test]
    fn test_present_requires_action_and_expressions() {
        assert!(build_payload(&parse(&["f", "--expression", "true"])).is_err());
        assert!(build_payload(&parse(&["f", "--action", "deny"])).is_err());
    }
}
