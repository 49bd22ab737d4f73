//! Silence entry resource.
//!
//! A silence is addressed by `<subscription>:<check>`, with `*`
//! standing in for whichever side is unconstrained.

use super::{insert_opt, metadata};
use crate::cli::{ConnectionArgs, parse_key_value};
use crate::output;
use clap::Args;
use reconcile::{State, sync};
use sensukit::{Error, Result};
use serde_json::{Map, Value};

#[derive(Args)]
pub struct SilenceArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Desired state
    #[arg(long, default_value = "present")]
    pub state: State,

    /// Subscription to silence; every subscription when omitted
    #[arg(long)]
    pub subscription: Option<String>,

    /// Check to silence; every check when omitted
    #[arg(long)]
    pub check_name: Option<String>,

    /// Unix timestamp at which the silence takes effect
    #[arg(long)]
    pub begin: Option<i64>,

    /// Seconds until the silence expires
    #[arg(long)]
    pub expire: Option<i64>,

    /// Clear the silence when the silenced events resolve
    #[arg(long)]
    pub expire_on_resolve: Option<bool>,

    /// Reason for the silence
    #[arg(long)]
    pub reason: Option<String>,

    /// Metadata label, as key=value (repeatable)
    #[arg(long = "label", value_parser = parse_key_value)]
    pub labels: Vec<(String, String)>,

    /// Metadata annotation, as key=value (repeatable)
    #[arg(long = "annotation", value_parser = parse_key_value)]
    pub annotations: Vec<(String, String)>,
}

/// The entry name the backend derives from subscription and check.
pub(crate) fn entry_name(subscription: Option<&str>, check: Option<&str>) -> String {
    format!(
        "{}:{}",
        subscription.unwrap_or("*"),
        check.unwrap_or("*")
    )
}

fn build_payload(args: &SilenceArgs) -> Result<Map<String, Value>> {
    if args.subscription.is_none() && args.check_name.is_none() {
        return Err(Error::validation(
            "a silence requires --subscription or --check-name",
        ));
    }

    let name = entry_name(args.subscription.as_deref(), args.check_name.as_deref());
    let mut payload = Map::new();
    payload.insert(
        "metadata".to_string(),
        metadata(&name, Some(&args.conn.namespace), &args.labels, &args.annotations),
    );
    insert_opt(&mut payload, "subscription", args.subscription.clone());
    insert_opt(&mut payload, "check", args.check_name.clone());
    insert_opt(&mut payload, "begin", args.begin);
    insert_opt(&mut payload, "expire", args.expire);
    insert_opt(&mut payload, "expire_on_resolve", args.expire_on_resolve);
    insert_opt(&mut payload, "reason", args.reason.clone());

    Ok(payload)
}

pub fn run(args: &SilenceArgs, check_mode: bool, quiet: bool) -> Result<()> {
    let payload = build_payload(args)?;
    let name = entry_name(args.subscription.as_deref(), args.check_name.as_deref());
    let mut client = args.conn.client();
    let path = client.core_v2(&["silenced", &name]);
    let outcome = sync(args.state, &mut client, &path, &payload, check_mode)?;
    output::emit("silence", &name, &outcome, quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: SilenceArgs,
    }

    fn parse(argv: &[&str]) -> SilenceArgs {
        let mut full = vec!["harness"];
        full.extend_from_slice(argv);
        Harness::try_parse_from(full).unwrap().args
    }

    #[test]
    fn test_entry_name_wildcards() {
        assert_eq!(entry_name(Some("web"), Some("ping")), "web:ping");
        assert_eq!(entry_name(Some("web"), None), "web:*");
        assert_eq!(entry_name(None, Some("ping")), "*:ping");
    }

    #[test]
    fn test_silence_payload() {
        let args = parse(&[
            "--subscription", "web", "--expire", "3600",
            "--expire-on-resolve", "true", "--reason", "rolling deploy",
        ]);
        let payload = build_payload(&args).unwrap();
        assert_eq!(payload["metadata"]["name"], "web:*");
        assert_eq!(payload["subscription"], "web");
        assert_eq!(payload["expire"], 3600);
        assert_eq!(payload["expire_on_resolve"], true);
        assert!(!payload.contains_key("check"));
    }

    #[test]
    fn test_requires_a_target() {
        assert!(build_payload(&parse(&[])).is_err());
    }
}
