//! Asset resource - a runtime artifact agents download on demand.

use super::metadata;
use crate::cli::{ConnectionArgs, parse_json_object, parse_key_value};
use crate::output;
use clap::Args;
use reconcile::{State, sync};
use sensukit::{Error, Result};
use serde_json::{Map, Value};

#[derive(Args)]
pub struct AssetArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Asset name
    pub name: String,

    /// Desired state
    #[arg(long, default_value = "present")]
    pub state: State,

    /// Build definition as a JSON object with url, sha512 and optional
    /// filters/headers (repeatable)
    #[arg(long = "build", value_parser = parse_json_object)]
    pub builds: Vec<Map<String, Value>>,

    /// Metadata label, as key=value (repeatable)
    #[arg(long = "label", value_parser = parse_key_value)]
    pub labels: Vec<(String, String)>,

    /// Metadata annotation, as key=value (repeatable)
    #[arg(long = "annotation", value_parser = parse_key_value)]
    pub annotations: Vec<(String, String)>,
}

fn build_payload(args: &AssetArgs) -> Result<Map<String, Value>> {
    if args.state == State::Present {
        if args.builds.is_empty() {
            return Err(Error::validation(
                "a present asset requires at least one --build",
            ));
        }
        for build in &args.builds {
            if !build.contains_key("url") || !build.contains_key("sha512") {
                return Err(Error::validation(
                    "every asset build needs url and sha512 fields",
                ));
            }
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
    payload.insert(
        "builds".to_string(),
        Value::Array(args.builds.iter().cloned().map(Value::Object).collect()),
    );

    Ok(payload)
}

pub fn run(args: &AssetArgs, check_mode: bool, quiet: bool) -> Result<()> {
    let payload = build_payload(args)?;
    let mut client = args.conn.client();
    let path = client.core_v2(&["assets", &args.name]);
    let outcome = sync(args.state, &mut client, &path, &payload, check_mode)?;
    output::emit("asset", &args.name, &outcome, quiet);
    Ok(())
}
