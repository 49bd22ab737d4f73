//! Pipeline resource - workflows that resolve filters, mutators and
//! handlers by reference. Needs backend 6.5.0 or later.

use super::metadata;
use crate::cli::{ConnectionArgs, parse_json_object, parse_key_value};
use crate::output;
use clap::Args;
use reconcile::{State, sync};
use sensukit::{Error, Result};
use serde_json::{Map, Value};

#[derive(Args)]
pub struct PipelineArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Pipeline name
    pub name: String,

    /// Desired state
    #[arg(long, default_value = "present")]
    pub state: State,

    /// Workflow as a JSON object with name, optional filters/mutator,
    /// and a handler reference (repeatable)
    #[arg(long = "workflow", value_parser = parse_json_object)]
    pub workflows: Vec<Map<String, Value>>,

    /// Metadata label, as key=value (repeatable)
    #[arg(long = "label", value_parser = parse_key_value)]
    pub labels: Vec<(String, String)>,

    /// Metadata annotation, as key=value (repeatable)
    #[arg(long = "annotation", value_parser = parse_key_value)]
    pub annotations: Vec<(String, String)>,
}

fn build_payload(args: &PipelineArgs) -> Result<Map<String, Value>> {
    if args.state == State::Present {
        if args.workflows.is_empty() {
            return Err(Error::validation(
                "a present pipeline requires at least one --workflow",
            ));
        }
        for workflow in &args.workflows {
            if !workflow.contains_key("name") || !workflow.contains_key("handler") {
                return Err(Error::validation(
                    "every workflow needs name and handler fields",
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
        "workflows".to_string(),
        Value::Array(args.workflows.iter().cloned().map(Value::Object).collect()),
    );

    Ok(payload)
}

pub fn run(args: &PipelineArgs, check_mode: bool, quiet: bool) -> Result<()> {
    let payload = build_payload(args)?;
    let mut client = args.conn.client();

    let version = client.version()?;
    if !version.at_least(6, 5, 0) {
        return Err(Error::validation(format!(
            "pipelines need backend 6.5.0 or later, backend reports {}",
            version
        )));
    }

    let path = client.core_v2(&["pipelines", &args.name]);
    let outcome = sync(args.state, &mut client, &path, &payload, check_mode)?;
    output::emit("pipeline", &args.name, &outcome, quiet);
    Ok(())
}
