//! sqlmigrate CLI - numbered up/down SQL migrations.
//!
//! Usage:
//!   sqlmigrate <N>              Migrate to version N
//!   sqlmigrate latest           Migrate to the latest version on disk
//!   sqlmigrate create <name>    Create an empty up/down pair
//!   sqlmigrate version          Print the current version
//!   sqlmigrate pending          Print true if migrations are pending

mod commands;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use colored::*;
use sqlmigrate::{DirSource, MigrateError, Migrator, SqlVersionStore};
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "sqlmigrate")]
#[command(version, about = "Numbered up/down SQL migrations", long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Log bookkeeping SQL and catalog resolution
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the migrations and the bookkeeping table live.
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// Database URL (postgres://, mysql://, sqlite://)
    #[arg(long, env = "MIGRATIONS_CONN_STR", global = true, hide_env_values = true)]
    pub conn_str: Option<String>,

    /// Directory containing migration files [default: ./migrations]
    #[arg(long, env = "MIGRATIONS_PATH", global = true)]
    pub migrations_path: Option<PathBuf>,

    /// Schema holding the bookkeeping table
    #[arg(long, env = "MIGRATIONS_SCHEMA", global = true)]
    pub schema: Option<String>,

    /// Bookkeeping table [default: migration_version]
    #[arg(long, env = "MIGRATIONS_TABLE", global = true)]
    pub table: Option<String>,

    /// Placeholder style: dollar-sign or question-mark [default: from URL]
    #[arg(long, env = "MIGRATIONS_PARAM_TYPE", global = true)]
    pub param_type: Option<String>,

    /// Run every migration outside a transaction
    #[arg(long, env = "MIGRATIONS_NO_TRANSACTION", global = true)]
    pub no_transaction: bool,

    /// TOML config file [default: ./migrate.toml]
    #[arg(long, env = "MIGRATIONS_CONFIG", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate up or down to the given version
    To {
        #[arg(allow_negative_numbers = true)]
        version: i64,
    },
    /// Migrate to the latest version on disk
    Latest,
    /// Create a new empty up and down migration
    Create {
        /// Migration name, e.g. create_users
        name: String,
    },
    /// Print the current migration version
    Version,
    /// Print true if there are unapplied migrations, else false
    Pending,
    /// Show every migration and whether it is applied
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the steps a migration to VERSION would run, without running them
    Plan {
        #[arg(allow_negative_numbers = true)]
        version: i64,
    },
    /// Bare version number, same as `to <N>`
    #[command(external_subcommand)]
    Bare(Vec<String>),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            if let Some(MigrateError::MigrationExecution { .. }) = e.downcast_ref::<MigrateError>() {
                eprintln!(
                    "{} steps before the failing one stay applied; fix the script and re-run",
                    "hint:".yellow()
                );
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "sqlmigrate=debug"
    } else {
        "sqlmigrate=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::resolve(&cli.connection)?;
    let migrator = connect(&settings).await?;

    match cli.command {
        Commands::To { version } => commands::migrate_to(&migrator, version).await,
        Commands::Latest => commands::migrate_latest(&migrator).await,
        Commands::Create { name } => commands::migrate_create(&migrator, &name).await,
        Commands::Version => commands::print_version(&migrator).await,
        Commands::Pending => commands::print_pending(&migrator).await,
        Commands::Status { json } => commands::migrate_status(&migrator, json).await,
        Commands::Plan { version } => commands::migrate_plan(&migrator, version).await,
        Commands::Bare(args) => {
            let version = parse_bare_version(&args)?;
            commands::migrate_to(&migrator, version).await
        }
    }
}

async fn connect(settings: &Settings) -> Result<commands::CliMigrator> {
    let url = settings.conn_str()?;
    let store = SqlVersionStore::connect(url, &settings.config)
        .await
        .context("failed to connect to database")?;
    Ok(Migrator::new(
        store,
        DirSource::new(&settings.migrations_path),
        settings.config.clone(),
    ))
}

fn parse_bare_version(args: &[String]) -> Result<i64> {
    match args {
        [arg] => arg
            .parse()
            .with_context(|| format!("unrecognized command {:?}", arg)),
        [arg, ..] => bail!("unexpected arguments after {:?}", arg),
        [] => bail!("missing command"),
    }
}
