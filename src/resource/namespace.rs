//! Namespace resource - cluster-wide, and the only kind whose wire
//! form has no metadata object.

use crate::cli::ConnectionArgs;
use crate::output;
use clap::Args;
use reconcile::{State, sync};
use sensukit::Result;
use serde_json::{Map, Value};

#[derive(Args)]
pub struct NamespaceArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Namespace name
    pub name: String,

    /// Desired state
    #[arg(long, default_value = "present")]
    pub state: State,
}

fn build_payload(args: &NamespaceArgs) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("name".to_string(), Value::String(args.name.clone()));
    payload
}

pub fn run(args: &NamespaceArgs, check_mode: bool, quiet: bool) -> Result<()> {
    let payload = build_payload(args);
    let mut client = args.conn.client();
    let path = client.cluster_v2(&["namespaces", &args.name]);
    let outcome = sync(args.state, &mut client, &path, &payload, check_mode)?;
    output::emit("namespace", &args.name, &outcome, quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: NamespaceArgs,
    }

    #[test]
    fn test_namespace_payload_is_flat() {
        let args = Harness::try_parse_from(["harness", "production"]).unwrap().args;
        let payload = build_payload(&args);
        assert_eq!(payload["name"], "production");
        assert!(!payload.contains_key("metadata"));
    }
}
