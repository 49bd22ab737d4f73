//! Secret resource (enterprise `secrets/v1` API).

use super::metadata;
use crate::cli::ConnectionArgs;
use crate::output;
use clap::Args;
use reconcile::{State, sync};
use sensukit::{Error, Result};
use serde_json::{Map, Value, json};

#[derive(Args)]
pub struct SecretArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Secret name
    pub name: String,

    /// Desired state
    #[arg(long, default_value = "present")]
    pub state: State,

    /// Identifier inside the provider (e.g. an env var name or a vault
    /// path)
    #[arg(long)]
    pub id: Option<String>,

    /// Secrets provider that resolves the id
    #[arg(long)]
    pub provider: Option<String>,
}

fn build_payload(args: &SecretArgs) -> Result<Map<String, Value>> {
    if args.state == State::Present && (args.id.is_none() || args.provider.is_none()) {
        return Err(Error::validation(
            "a present secret requires --id and --provider",
        ));
    }

    let mut payload = Map::new();
    payload.insert("type".to_string(), Value::String("Secret".to_string()));
    payload.insert(
        "api_version".to_string(),
        Value::String("secrets/v1".to_string()),
    );
    payload.insert(
        "metadata".to_string(),
        metadata(&args.name, Some(&args.conn.namespace), &[], &[]),
    );
    payload.insert(
        "spec".to_string(),
        json!({"id": args.id, "provider": args.provider}),
    );

    Ok(payload)
}

pub fn run(args: &SecretArgs, check_mode: bool, quiet: bool) -> Result<()> {
    let payload = build_payload(args)?;
    let mut client = args.conn.client();

    let version = client.version()?;
    if !version.at_least(5, 21, 0) {
        return Err(Error::validation(format!(
            "secrets need backend 5.21.0 or later, backend reports {}",
            version
        )));
    }

    let path = client.enterprise("secrets", "v1", &["secrets", &args.name]);
    let outcome = sync(args.state, &mut client, &path, &payload, check_mode)?;
    output::emit("secret", &args.name, &outcome, quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: SecretArgs,
    }

    fn parse(argv: &[&str]) -> SecretArgs {
        let mut full = vec!["harness"];
        full.extend_from_slice(argv);
        Harness::try_parse_from(full).unwrap().args
    }

    #[test]
    fn test_wrapped_payload_shape() {
        let args = parse(&["pg-password", "--id", "PG_PASSWORD", "--provider", "env"]);
        let payload = build_payload(&args).unwrap();
        assert_eq!(payload["type"], "Secret");
        assert_eq!(payload["api_version"], "secrets/v1");
        assert_eq!(payload["metadata"]["namespace"], "default");
        assert_eq!(payload["spec"], json!({"id": "PG_PASSWORD", "provider": "env"}));
    }

    #[test]
    fn test_present_requires_id_and_provider() {
        assert!(build_payload(&parse(&["s", "--id", "X"])).is_err());
        assert!(build_payload(&parse(&["s", "--provider", "env"])).is_err());
        assert!(build_payload(&parse(&["s", "--state", "absent"])).is_ok());
    }
}
