//! Check resource - a scheduled command the agents execute.

use super::{insert_list, insert_opt, metadata, secrets_list};
use crate::cli::{ConnectionArgs, parse_key_value};
use crate::output;
use clap::Args;
use reconcile::{State, secrets_differ, sync_with};
use sensukit::{Error, Result};
use serde_json::{Map, Value};

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Check name
    pub name: String,

    /// Desired state
    #[arg(long, default_value = "present")]
    pub state: State,

    /// Command the agent runs
    #[arg(long)]
    pub command: Option<String>,

    /// Subscription the check is published to (repeatable)
    #[arg(long = "subscription")]
    pub subscriptions: Vec<String>,

    /// Handler for events the check produces (repeatable)
    #[arg(long = "handler")]
    pub handlers: Vec<String>,

    /// Scheduling interval in seconds (mutually exclusive with --cron)
    #[arg(long)]
    pub interval: Option<u64>,

    /// Cron schedule (mutually exclusive with --interval)
    #[arg(long)]
    pub cron: Option<String>,

    /// Whether check requests are published to agents
    #[arg(long)]
    pub publish: Option<bool>,

    /// Execution timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Time after which an event is considered stale, in seconds
    #[arg(long)]
    pub ttl: Option<u64>,

    /// Write the event to the command's stdin
    #[arg(long)]
    pub stdin: Option<bool>,

    /// Flap detection low threshold
    #[arg(long)]
    pub low_flap_threshold: Option<u64>,

    /// Flap detection high threshold
    #[arg(long)]
    pub high_flap_threshold: Option<u64>,

    /// Entity name to report proxy results under
    #[arg(long)]
    pub proxy_entity_name: Option<String>,

    /// Distribute executions across subscribed agents
    #[arg(long)]
    pub round_robin: Option<bool>,

    /// Runtime asset the command needs (repeatable)
    #[arg(long = "runtime-asset")]
    pub runtime_assets: Vec<String>,

    /// Secret exposed to the command, as VAR=secret-name (repeatable)
    #[arg(long = "secret", value_parser = parse_key_value)]
    pub secrets: Vec<(String, String)>,

    /// Metadata label, as key=value (repeatable)
    #[arg(long = "label", value_parser = parse_key_value)]
    pub labels: Vec<(String, String)>,

    /// Metadata annotation, as key=value (repeatable)
    #[arg(long = "annotation", value_parser = parse_key_value)]
    pub annotations: Vec<(String, String)>,
}

fn build_payload(args: &CheckArgs) -> Result<Map<String, Value>> {
    if args.state == State::Present {
        if args.command.is_none() {
            return Err(Error::validation("a present check requires --command"));
        }
        if args.subscriptions.is_empty() {
            return Err(Error::validation(
                "a present check requires at least one --subscription",
            ));
        }
        match (&args.interval, &args.cron) {
            (Some(_), Some(_)) => {
                return Err(Error::validation(
                    "--interval and --cron are mutually exclusive",
                ));
            }
            (None, None) => {
                return Err(Error::validation(
                    "a present check requires --interval or --cron",
                ));
            }
            _ => {}
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
    insert_opt(&mut payload, "command", args.command.clone());
    insert_list(&mut payload, "subscriptions", &args.subscriptions);
    insert_list(&mut payload, "handlers", &args.handlers);
    insert_opt(&mut payload, "interval", args.interval);
    insert_opt(&mut payload, "cron", args.cron.clone());
    insert_opt(&mut payload, "publish", args.publish);
    insert_opt(&mut payload, "timeout", args.timeout);
    insert_opt(&mut payload, "ttl", args.ttl);
    insert_opt(&mut payload, "stdin", args.stdin);
    insert_opt(&mut payload, "low_flap_threshold", args.low_flap_threshold);
    insert_opt(&mut payload, "high_flap_threshold", args.high_flap_threshold);
    insert_opt(&mut payload, "proxy_entity_name", args.proxy_entity_name.clone());
    insert_opt(&mut payload, "round_robin", args.round_robin);
    insert_list(&mut payload, "runtime_assets", &args.runtime_assets);
    payload.insert("secrets".to_string(), secrets_list(&args.secrets));

    Ok(payload)
}

pub fn run(args: &CheckArgs, check_mode: bool, quiet: bool) -> Result<()> {
    let payload = build_payload(args)?;
    let mut client = args.conn.client();
    let path = client.core_v2(&["checks", &args.name]);
    let outcome = sync_with(args.state, &mut client, &path, &payload, check_mode, secrets_differ)?;
    output::emit("check", &args.name, &outcome, quiet);
    Ok(())
}
