//! Bonsai-backed asset resource.
//!
//! Instead of spelling out build definitions by hand, this command
//! looks a release up on the public Bonsai registry and converges the
//! corresponding asset object from what the registry publishes.

use super::{metadata, string_map};
use crate::cli::{ConnectionArgs, parse_key_value};
use crate::output;
use clap::Args;
use reconcile::{State, SyncOutcome, sync};
use sensukit::bonsai::{BonsaiClient, BonsaiName};
use sensukit::{Client, Error, Result};
use serde_json::{Map, Value};

#[derive(Args)]
#[command(disable_version_flag = true)]
pub struct BonsaiAssetArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Registry asset name, as <namespace>/<name>
    pub name: String,

    /// Desired state
    #[arg(long, default_value = "present")]
    pub state: State,

    /// Release version to install; latest published when omitted
    #[arg(long)]
    pub version: Option<String>,

    /// Name for the asset on the backend; defaults to the registry name
    #[arg(long)]
    pub rename: Option<String>,

    /// Extra metadata label, overrides registry labels on conflict
    /// (repeatable)
    #[arg(long = "label", value_parser = parse_key_value)]
    pub labels: Vec<(String, String)>,

    /// Extra metadata annotation (repeatable)
    #[arg(long = "annotation", value_parser = parse_key_value)]
    pub annotations: Vec<(String, String)>,
}

fn merge_registry_map(
    registry_values: Option<&Value>,
    user_pairs: &[(String, String)],
) -> Map<String, Value> {
    let mut merged = registry_values.map(string_map).unwrap_or_default();
    for (key, value) in user_pairs {
        merged.insert(key.clone(), Value::String(value.clone()));
    }
    merged
}

fn ensure(
    registry: &BonsaiClient,
    client: &mut Client,
    args: &BonsaiAssetArgs,
    check_mode: bool,
) -> Result<SyncOutcome> {
    let bonsai: BonsaiName = args.name.parse()?;
    let local_name = args.rename.as_deref().unwrap_or(&args.name);
    let path = client.core_v2(&["assets", local_name]);
    let namespace = client.namespace().map(str::to_string);

    if args.state == State::Absent {
        let mut payload = Map::new();
        payload.insert(
            "metadata".to_string(),
            metadata(local_name, namespace.as_deref(), &[], &[]),
        );
        return sync(State::Absent, client, &path, &payload, check_mode);
    }

    let version = match &args.version {
        Some(version) => version.clone(),
        None => registry
            .available_versions(&bonsai)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::validation(format!("{} has no published versions", bonsai))
            })?,
    };
    let release = registry.release(&bonsai, &version)?;

    let mut meta = Map::new();
    meta.insert("name".to_string(), Value::String(local_name.to_string()));
    if let Some(ns) = namespace {
        meta.insert("namespace".to_string(), Value::String(ns));
    }
    let labels = merge_registry_map(release.labels.as_ref(), &args.labels);
    if !labels.is_empty() {
        meta.insert("labels".to_string(), Value::Object(labels));
    }
    let mut annotations = merge_registry_map(release.annotations.as_ref(), &args.annotations);
    annotations.insert(
        "io.sensu.bonsai.name".to_string(),
        Value::String(bonsai.to_string()),
    );
    annotations.insert(
        "io.sensu.bonsai.version".to_string(),
        Value::String(version.clone()),
    );
    meta.insert("annotations".to_string(), Value::Object(annotations));

    let mut payload = Map::new();
    payload.insert("metadata".to_string(), Value::Object(meta));
    payload.insert("builds".to_string(), Value::Array(release.builds));

    sync(State::Present, client, &path, &payload, check_mode)
}

pub fn run(args: &BonsaiAssetArgs, check_mode: bool, quiet: bool) -> Result<()> {
    let registry = BonsaiClient::new();
    let mut client = args.conn.client();
    let outcome = ensure(&registry, &mut client, args, check_mode)?;
    let local_name = args.rename.as_deref().unwrap_or(&args.name);
    output::emit("asset", local_name, &outcome, quiet);
    Ok(())
}
