//! Entity resource - an agent or proxy the backend monitors.

use super::{insert_list, insert_opt, metadata};
use crate::cli::{ConnectionArgs, parse_key_value};
use crate::output;
use clap::{Args, ValueEnum};
use reconcile::{State, sync};
use sensukit::{Error, Result};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityClass {
    Agent,
    Proxy,
}

impl EntityClass {
    fn as_str(self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Proxy => "proxy",
        }
    }
}

#[derive(Args)]
pub struct EntityArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Entity name
    pub name: String,

    /// Desired state
    #[arg(long, default_value = "present")]
    pub state: State,

    /// Entity class
    #[arg(long, value_enum)]
    pub entity_class: Option<EntityClass>,

    /// Subscription the entity listens on (repeatable)
    #[arg(long = "subscription")]
    pub subscriptions: Vec<String>,

    /// Deregister the entity when its agent stops
    #[arg(long)]
    pub deregister: Option<bool>,

    /// Handler invoked on deregistration
    #[arg(long)]
    pub deregistration_handler: Option<String>,

    /// Keyword redacted from logs and dashboards (repeatable)
    #[arg(long = "redact")]
    pub redact: Vec<String>,

    /// Metadata label, as key=value (repeatable)
    #[arg(long = "label", value_parser = parse_key_value)]
    pub labels: Vec<(String, String)>,

    /// Metadata annotation, as key=value (repeatable)
    #[arg(long = "annotation", value_parser = parse_key_value)]
    pub annotations: Vec<(String, String)>,
}

fn build_payload(args: &EntityArgs) -> Result<Map<String, Value>> {
    if args.state == State::Present && args.entity_class.is_none() {
        return Err(Error::validation("a present entity requires --entity-class"));
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
    insert_opt(
        &mut payload,
        "entity_class",
        args.entity_class.map(EntityClass::as_str),
    );
    insert_list(&mut payload, "subscriptions", &args.subscriptions);
    insert_opt(&mut payload, "deregister", args.deregister);
    if let Some(handler) = &args.deregistration_handler {
        payload.insert(
            "deregistration".to_string(),
            serde_json::json!({"handler": handler}),
        );
    }
    insert_list(&mut payload, "redact", &args.redact);

    Ok(payload)
}

pub fn run(args: &EntityArgs, check_mode: bool, quiet: bool) -> Result<()> {
    let payload = build_payload(args)?;
    let mut client = args.conn.client();
    let path = client.core_v2(&["entities", &args.name]);
    let outcome = sync(args.state, &mut client, &path, &payload, check_mode)?;
    output::emit("entity", &args.name, &outcome, quiet);
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
        args: EntityArgs,
    }

    fn parse(argv: &[&str]) -> EntityArgs {
        let mut full = vec!["harness"];
        full.extend_from_slice(argv);
        Harness::try_parse_from(full).unwrap().args
    }

    #[test]
    fn test_proxy_entity_payload() {
        let args = parse(&[
            "switch-01", "--entity-class", "proxy",
            "--subscription", "snmp", "--deregister", "true",
        ]);
        let payload = build_payload(&args).unwrap();
        assert_eq!(payload["entity_class"], "proxy");
        assert_eq!(payload["subscriptions"], json!(["snmp"]));
        assert_eq!(payload["deregister"], true);
    }

    #[test]
    fn test_present_requires_class() {
        let args = parse(&["switch-01"]);
        assert!(build_payload(&args).is_err());
    }

    #[test]
    fn test_deregistration_handler_nesting() {
        let args = parse(&[
            "host", "--entity-class", "agent", "--deregistration-handler", "slack",
        ]);
        let payload = build_payload(&args).unwrap();
        assert_eq!(payload["deregistration"], json!({"handler": "slack"}));
    }
}
