mod cli;
mod output;
mod resource;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let check_mode = cli.check;
    let quiet = cli.quiet;

    match cli.command {
        Command::Check(args) => resource::check::run(&args, check_mode, quiet)?,
        Command::Entity(args) => resource::entity::run(&args, check_mode, quiet)?,
        Command::Handler(args) => resource::handler::run(&args, check_mode, quiet)?,
        Command::Filter(args) => resource::filter::run(&args, check_mode, quiet)?,
        Command::Mutator(args) => resource::mutator::run(&args, check_mode, quiet)?,
        Command::Asset(args) => resource::asset::run(&args, check_mode, quiet)?,
        Command::BonsaiAsset(args) => resource::bonsai_asset::run(&args, check_mode, quiet)?,
        Command::Namespace(args) => resource::namespace::run(&args, check_mode, quiet)?,
        Command::Role(args) => resource::role::run(&args, check_mode, quiet)?,
        Command::ClusterRole(args) => resource::cluster_role::run(&args, check_mode, quiet)?,
        Command::RoleBinding(args) => resource::role_binding::run(&args, check_mode, quiet)?,
        Command::ClusterRoleBinding(args) => {
            resource::cluster_role_binding::run(&args, check_mode, quiet)?;
        }
        Command::User(args) => resource::user::run(&args, check_mode, quiet)?,
        Command::Secret(args) => resource::secret::run(&args, check_mode, quiet)?,
        Command::Silence(args) => resource::silence::run(&args, check_mode, quiet)?,
        Command::Pipeline(args) => resource::pipeline::run(&args, check_mode, quiet)?,
        Command::Datastore(args) => resource::datastore::run(&args, check_mode, quiet)?,
        Command::Info(args) => {
            let mut client = args.conn.client();
            let version = client.version()?;
            println!("{}", serde_json::json!({"version": version.to_string()}));
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "sensu-sync", &mut io::stdout());
        }
    }

    Ok(())
}
