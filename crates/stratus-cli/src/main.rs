//! stratus CLI
//!
//! Command-line front-end for the Stratus cloud. Mutating commands block
//! until the resource settles unless `--async` is given.

mod commands;
mod config;
mod render;
mod spinner;
mod telemetry;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::Section;
use eyre::WrapErr;
use stratus_api::RegionScope;
use stratus_client::HttpClient;
use stratus_core::WaitContext;
use tracing::{debug, info, warn};

use crate::commands::Context;
use crate::commands::bucket::BucketCommand;
use crate::commands::db::DbCommand;
use crate::commands::intake::IntakeCommand;
use crate::commands::server::ServerCommand;
use crate::commands::wait::WaitArgs;
use crate::config::Config;

#[derive(Parser)]
#[command(name = "stratus", version)]
#[command(about = "Manage Stratus cloud resources", long_about = None)]
struct Cli {
    /// Project to operate on
    #[arg(long, global = true, env = "STRATUS_PROJECT_ID")]
    project_id: Option<String>,

    /// Region of the project (defaults to the configured region)
    #[arg(long, global = true, env = "STRATUS_REGION")]
    region: Option<String>,

    /// API access token
    #[arg(long, global = true, env = "STRATUS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Configuration file
    #[arg(long, global = true, env = "STRATUS_CONFIG")]
    config: Option<PathBuf>,

    /// Trigger the operation and return without waiting
    #[arg(long = "async", global = true)]
    no_wait: bool,

    /// Give up waiting after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Server lifecycle operations
    #[command(subcommand)]
    Server(ServerCommand),
    /// Object storage buckets
    #[command(subcommand)]
    Bucket(BucketCommand),
    /// Intake runners, intakes and intake users
    #[command(subcommand)]
    Intake(IntakeCommand),
    /// Managed database instances
    #[command(subcommand)]
    Db(DbCommand),
    /// Wait for an operation that was already triggered
    Wait(WaitArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = color_eyre::install() {
        eprintln!("warning: failed to install error report handler: {err}");
    }
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("Error: {report:?}");
            render::exit_code(&report)
        }
    }
}

async fn run(cli: Cli) -> eyre::Result<()> {
    let (config, source) = match &cli.config {
        Some(path) => (Config::load(path)?, Some(path.clone())),
        None => Config::load_default()?,
    };
    telemetry::init(cli.verbose, &config.log_level, config.log_format);
    match &source {
        Some(path) => debug!(path = %path.display(), "loaded configuration"),
        None => info!("no config file found, using defaults"),
    }

    let project_id = cli
        .project_id
        .or_else(|| config.project_id.clone())
        .ok_or_else(|| eyre::eyre!("no project id configured"))
        .suggestion("pass --project-id, set STRATUS_PROJECT_ID, or add project_id to the config")?;
    let region = cli.region.unwrap_or_else(|| config.region.clone());
    let scope = RegionScope::new(project_id, region);

    let http = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
        .wrap_err("failed to build HTTP client")?;
    let mut client = HttpClient::with_client(config.endpoints()?, http);
    match cli.token.or_else(|| config.token.clone()) {
        Some(token) => client = client.with_token(token),
        None => warn!("no API token configured, requests will be unauthenticated"),
    }

    let wait_ctx = WaitContext::new();
    let token = wait_ctx.cancellation_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling wait");
            token.cancel();
        }
    });

    let ctx = Context {
        client,
        scope,
        settings: config.wait.clone(),
        timeout: cli.timeout.map(Duration::from_secs),
        no_wait: cli.no_wait,
        wait_ctx,
    };

    match cli.command {
        Commands::Server(command) => commands::server::run(&ctx, command).await,
        Commands::Bucket(command) => commands::bucket::run(&ctx, command).await,
        Commands::Intake(command) => commands::intake::run(&ctx, command).await,
        Commands::Db(command) => commands::db::run(&ctx, command).await,
        Commands::Wait(args) => commands::wait::run(&ctx, args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_server_resize() {
        let cli = Cli::try_parse_from([
            "stratus",
            "--async",
            "server",
            "resize",
            "s-1",
            "--machine-type",
            "c1.4",
        ])
        .unwrap();
        assert!(cli.no_wait);
        assert!(matches!(
            cli.command,
            Commands::Server(ServerCommand::Resize { .. })
        ));
    }

    #[test]
    fn test_parse_wait_with_two_ids() {
        let cli = Cli::try_parse_from([
            "stratus",
            "wait",
            "intake-user",
            "--for",
            "delete",
            "i-1",
            "u-1",
            "--timeout",
            "60",
        ])
        .unwrap();
        assert_eq!(cli.timeout, Some(60));
        assert!(matches!(cli.command, Commands::Wait(_)));
    }

    #[test]
    fn test_db_family_is_parsed() {
        let cli = Cli::try_parse_from(["stratus", "db", "update", "mongodb", "db-1", "--name", "x"])
            .unwrap();
        let Commands::Db(DbCommand::Update { family, .. }) = cli.command else {
            panic!("expected db update");
        };
        assert_eq!(family, stratus_api::DatabaseFamily::MongoDb);
    }
}
