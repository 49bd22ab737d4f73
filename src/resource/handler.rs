//! Handler resource - what happens to events once they exist.

use super::{insert_list, insert_opt, metadata, secrets_list};
use crate::cli::{ConnectionArgs, parse_key_value};
use crate::output;
use clap::{Args, ValueEnum};
use reconcile::{State, secrets_differ, sync_with};
use sensukit::{Error, Result};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HandlerType {
    Pipe,
    Tcp,
    Udp,
    Set,
}

impl HandlerType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Pipe => "pipe",
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Set => "set",
        }
    }
}

#[derive(Args)]
pub struct HandlerArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Handler name
    pub name: String,

    /// Desired state
    #[arg(long, default_value = "present")]
    pub state: State,

    /// Handler type
    #[arg(long = "type", value_enum)]
    pub handler_type: Option<HandlerType>,

    /// Command a pipe handler runs
    #[arg(long)]
    pub command: Option<String>,

    /// Socket host for tcp/udp handlers
    #[arg(long)]
    pub host: Option<String>,

    /// Socket port for tcp/udp handlers
    #[arg(long)]
    pub port: Option<u16>,

    /// Member of a set handler (repeatable)
    #[arg(long = "member")]
    pub members: Vec<String>,

    /// Event filter applied before handling (repeatable)
    #[arg(long = "filter")]
    pub filters: Vec<String>,

    /// Mutator applied to the event first
    #[arg(long)]
    pub mutator: Option<String>,

    /// Execution timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Runtime asset the handler needs (repeatable)
    #[arg(long = "runtime-asset")]
    pub runtime_assets: Vec<String>,

    /// Secret exposed to the handler, as VAR=secret-name (repeatable)
    #[arg(long = "secret", value_parser = parse_key_value)]
    pub secrets: Vec<(String, String)>,

    /// Metadata label, as key=value (repeatable)
    #[arg(long = "label", value_parser = parse_key_value)]
    pub labels: Vec<(String, String)>,

    /// Metadata annotation, as key=value (repeatable)
    #[arg(long = "annotation", value_parser = parse_key_value)]
    pub annotations: Vec<(String, String)>,
}

fn build_payload(args: &HandlerArgs) -> Result<Map<String, Value>> {
    if args.state == State::Present {
        match args.handler_type {
            None => return Err(Error::validation("a present handler requires --type")),
            Some(HandlerType::Pipe) if args.command.is_none() => {
                return Err(Error::validation("a pipe handler requires --command"));
            }
            Some(HandlerType::Tcp | HandlerType::Udp)
                if args.host.is_none() || args.port.is_none() =>
            {
                return Err(Error::validation(
                    "a socket handler requires --host and --port",
                ));
            }
            Some(HandlerType::Set) if args.members.is_empty() => {
                return Err(Error::validation(
                    "a set handler requires at least one --member",
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
    insert_opt(
        &mut payload,
        "type",
        args.handler_type.map(HandlerType::as_str),
    );
    insert_opt(&mut payload, "command", args.command.clone());
    if let (Some(host), Some(port)) = (&args.host, args.port) {
        payload.insert(
            "socket".to_string(),
            serde_json::json!({"host": host, "port": port}),
        );
    }
    insert_list(&mut payload, "handlers", &args.members);
    insert_list(&mut payload, "filters", &args.filters);
    insert_opt(&mut payload, "mutator", args.mutator.clone());
    insert_opt(&mut payload, "timeout", args.timeout);
    insert_list(&mut payload, "runtime_assets", &args.runtime_assets);
    payload.insert("secrets".to_string(), secrets_list(&args.secrets));

    Ok(payload)
}

pub fn run(args: &HandlerArgs, check_mode: bool, quiet: bool) -> Result<()> {
    let payload = build_payload(args)?;
    let mut client = args.conn.client();
    let path = client.core_v2(&["handlers", &args.name]);
    let outcome = sync_with(args.state, &mut client, &path, &payload, check_mode, secrets_differ)?;
    output::emit("handler", &args.name, &outcome, quiet);
    Ok(())
}
