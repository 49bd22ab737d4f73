use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use sensukit::{Client, Credentials};
use serde_json::{Map, Value};

const DEFAULT_URL: &str = "http://localhost:8080";

#[derive(Parser)]
#[command(name = "sensu-sync")]
#[command(version)]
#[command(about = "Declarative management of Sensu Go backend resources", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Report what would change without touching the backend
    #[arg(long, global = true)]
    pub check: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage checks
    Check(crate::resource::check::CheckArgs),

    /// Manage entities
    Entity(crate::resource::entity::EntityArgs),

    /// Manage handlers (pipe, tcp, udp, set)
    Handler(crate::resource::handler::HandlerArgs),

    /// Manage event filters
    Filter(crate::resource::filter::FilterArgs),

    /// Manage mutators
    Mutator(crate::resource::mutator::MutatorArgs),

    /// Manage assets
    Asset(crate::resource::asset::AssetArgs),

    /// Create assets from the Bonsai registry
    BonsaiAsset(crate::resource::bonsai_asset::BonsaiAssetArgs),

    /// Manage namespaces
    Namespace(crate::resource::namespace::NamespaceArgs),

    /// Manage roles
    Role(crate::resource::role::RoleArgs),

    /// Manage cluster-wide roles
    ClusterRole(crate::resource::cluster_role::ClusterRoleArgs),

    /// Manage role bindings
    RoleBinding(crate::resource::role_binding::RoleBindingArgs),

    /// Manage cluster-wide role bindings
    ClusterRoleBinding(crate::resource::cluster_role_binding::ClusterRoleBindingArgs),

    /// Manage users
    User(crate::resource::user::UserArgs),

    /// Manage secrets (enterprise)
    Secret(crate::resource::secret::SecretArgs),

    /// Manage silence entries
    Silence(crate::resource::silence::SilenceArgs),

    /// Manage pipelines
    Pipeline(crate::resource::pipeline::PipelineArgs),

    /// Manage the external datastore provider (enterprise)
    Datastore(crate::resource::datastore::DatastoreArgs),

    /// Show backend version information
    Info(InfoArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub conn: ConnectionArgs,
}

/// Connection parameters shared by every backend-touching subcommand.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Backend API URL (falls back to SENSU_BACKEND_URL)
    #[arg(long, env = "SENSU_URL")]
    pub url: Option<String>,

    /// Username for token-based authentication
    #[arg(long = "username", env = "SENSU_USER", default_value = "admin")]
    pub user: String,

    /// Password for token-based authentication
    #[arg(long, env = "SENSU_PASSWORD", default_value = "P@ssw0rd!")]
    pub password: String,

    /// API key; takes precedence over username/password
    #[arg(long, env = "SENSU_API_KEY")]
    pub api_key: Option<String>,

    /// Namespace for namespaced resources
    #[arg(long, env = "SENSU_NAMESPACE", default_value = "default")]
    pub namespace: String,
}

impl ConnectionArgs {
    /// Resolve the backend URL: flag, then SENSU_URL (via clap), then
    /// the SENSU_BACKEND_URL alias, then the local default.
    pub fn resolved_url(&self) -> String {
        self.url
            .clone()
            .or_else(|| std::env::var("SENSU_BACKEND_URL").ok())
            .unwrap_or_else(|| DEFAULT_URL.to_string())
    }

    fn credentials(&self) -> Credentials {
        match &self.api_key {
            Some(key) => Credentials::api_key(key),
            None => Credentials::basic(&self.user, &self.password),
        }
    }

    /// Build a client scoped to the configured namespace.
    pub fn client(&self) -> Client {
        Client::new(
            &self.resolved_url(),
            self.credentials(),
            Some(self.namespace.clone()),
        )
    }
}

/// Parse a `key=value` argument.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

/// Parse an argument carrying an inline JSON object.
pub fn parse_json_object(raw: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("expected a JSON object".to_string()),
        Err(e) => Err(format!("invalid JSON: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("region=us-east-1").unwrap(),
            ("region".to_string(), "us-east-1".to_string())
        );
        // Values may contain '='.
        assert_eq!(
            parse_key_value("expr=a=b").unwrap(),
            ("expr".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("no-separator").is_err());
        assert!(parse_key_value("=value").is_err());
    }

    #[test]
    fn test_parse_json_object() {
        let map = parse_json_object(r#"{"url": "https://x", "sha512": "ab"}"#).unwrap();
        assert_eq!(map["url"], "https://x");
        assert!(parse_json_object("[1, 2]").is_err());
        assert!(parse_json_object("{broken").is_err());
    }
}
