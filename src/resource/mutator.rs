//! Mutator resource - transforms event data before handlers see it.

use super::{insert_list, insert_opt, metadata, secrets_list};
use crate::cli::{ConnectionArgs, parse_key_value};
use crate::output;
use clap::Args;
use reconcile::{State, secrets_differ, sync_with};
use sensukit::{Error, Result};
use serde_json::{Map, Value};

#[derive(Args)]
pub struct MutatorArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Mutator name
    pub name: String,

    /// Desired state
    #[arg(long, default_value = "present")]
    pub state: State,

    /// Command that receives the event on stdin
    #[arg(long)]
    pub command: Option<String>,

    /// Execution timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

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

fn build_payload(args: &MutatorArgs) -> Result<Map<String, Value>> {
    if args.state == State::Present && args.command.is_none() {
        return Err(Error::validation("a present mutator requires --command"));
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
    insert_opt(&mut payload, "timeout", args.timeout);
    insert_list(&mut payload, "runtime_assets", &args.runtime_assets);
    payload.insert("secrets".to_string(), secrets_list(&args.secrets));

    Ok(payload)
}

pub fn run(args: &MutatorArgs, check_mode: bool, quiet: bool) -> Result<()> {
    let payload = build_payload(args)?;
    let mut client = args.conn.client();
    let path = client.core_v2(&["mutators", &args.name]);
    let outcome = sync_with(args.state, &mut client, &path, &payload, check_mode, secrets_differ)?;
    output::emit("mutator", &args.name, &outcome, quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: MutatorArgs,
    }

    fn parse(argv: &[&str]) -> MutatorArgs {
        let mut full = vec!["harness"];
        full.extend_from_slice(argv);
        Harness::try_parse_from(full).unwrap().args
    }

    #[test]
    fn test_mutator_payload() {
        let args = parse(&["anonymize", "--command", "strip-pii.py", "--timeout", "10"]);
        let payload = build_payload(&args).unwrap();
        assert_eq!(payload["command"], "strip-pii.py");
        assert_eq!(payload["timeout"], 10);
    }

    #[test]
    fn test_present_requires_command() {
        assert!(build_payload(&parse(&["anonymize"])).is_err());
        assert!(build_payload(&parse(&["anonymize", "--state", "absent"])).is_ok());
    }
}
