use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use roster_core::utils::config::DEFAULT_CONFIG_FILE;
use roster_core::utils::init_logging;
use roster_core::RosterConfig;

mod commands;

use commands::catalog::CatalogCommand;
use commands::dashboard::DashboardCommand;
use commands::role::RoleCommand;
use commands::Context;

/// Roster Command Line Interface
///
/// Compose roles from the capability catalog, bound them with scopes and
/// manage the versions of roles and their dashboards.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Configuration file
    #[clap(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Print results as JSON
    #[clap(long, global = true)]
    json: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and check the catalogs
    Catalog {
        #[clap(subcommand)]
        command: CatalogCommand,
    },

    /// Manage roles
    Role {
        #[clap(subcommand)]
        command: RoleCommand,
    },

    /// Manage dashboards
    Dashboard {
        #[clap(subcommand)]
        command: DashboardCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = RosterConfig::load(Some(cli.config.as_path()))?;
    init_logging(&config.logging)?;

    let ctx = Context::new(config, cli.json);
    match &cli.command {
        Commands::Catalog { command } => commands::catalog::execute(&ctx, command),
        Commands::Role { command } => commands::role::execute(&ctx, command).await,
        Commands::Dashboard { command } => commands::dashboard::execute(&ctx, command).await,
    }
}
