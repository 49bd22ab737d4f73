//! External datastore provider resource (enterprise `store/v1` API).
//!
//! Offloads event storage to PostgreSQL. Cluster-wide; there is one
//! provider object per configured store.

use clap::Args;

use crate::cli::ConnectionArgs;
use crate::output;
use reconcile::{State, sync};
use sensukit::{Error, Result};
use serde_json::{Map, Value, json};

#[derive(Args)]
pub struct DatastoreArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Provider name
    pub name: String,

    /// Desired state
    #[arg(long, default_value = "present")]
    pub state: State,

    /// PostgreSQL data source name
    #[arg(long)]
    pub dsn: Option<String>,

    /// Connection pool size
    #[arg(long)]
    pub pool_size: Option<u64>,

    /// Number of events batched per transaction
    #[arg(long)]
    pub batch_size: Option<u64>,

    /// Buffer size of the event queue
    #[arg(long)]
    pub batch_buffer: Option<u64>,

    /// Query workers draining the queue
    #[arg(long)]
    pub batch_workers: Option<u64>,
}

fn build_payload(args: &DatastoreArgs) -> Result<Map<String, Value>> {
    if args.state == State::Present && args.dsn.is_none() {
        return Err(Error::validation("a present datastore requires --dsn"));
    }

    let mut spec = Map::new();
    spec.insert("dsn".to_string(), json!(args.dsn));
    if let Some(pool_size) = args.pool_size {
        spec.insert("pool_size".to_string(), json!(pool_size));
    }
    if let Some(batch_size) = args.batch_size {
        spec.insert("batch_size".to_string(), json!(batch_size));
    }
    if let Some(batch_buffer) = args.batch_buffer {
        spec.insert("batch_buffer".to_string(), json!(batch_buffer));
    }
    if let Some(batch_workers) = args.batch_workers {
        spec.insert("batch_workers".to_string(), json!(batch_workers));
    }

    let mut payload = Map::new();
    payload.insert("type".to_string(), json!("PostgresConfig"));
    payload.insert("api_version".to_string(), json!("store/v1"));
    payload.insert("metadata".to_string(), json!({"name": args.name}));
    payload.insert("spec".to_string(), Value::Object(spec));

    Ok(payload)
}

pub fn run(args: &DatastoreArgs, check_mode: bool, quiet: bool) -> Result<()> {
    let payload = build_payload(args)?;
    let mut client = args.conn.client();

    let version = client.version()?;
    if !version.at_least(5, 16, 0) {
        return Err(Error::validation(format!(
            "the external datastore needs backend 5.16.0 or later, backend reports {}",
            version
        )));
    }

    let path = client.enterprise_cluster("store", "v1", &["provider", &args.name]);
    let outcome = sync(args.state, &mut client, &path, &payload, check_mode)?;
    output::emit("datastore", &args.name, &outcome, quiet);
    Ok(())
}
