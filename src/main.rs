mod run;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use spendwise::config::{Paths, Settings};
use spendwise::{engine, logging, Database};

#[derive(Parser)]
#[command(
    name = "spendwise",
    version,
    about = "Budgets and savings goals tracked against a local transaction ledger"
)]
struct Cli {
    /// User whose data to work with; created on first use
    #[arg(long, short, global = true, env = "SPENDWISE_USER", default_value = "default")]
    user: String,

    /// Database file, overriding the configured location
    #[arg(long, global = true, env = "SPENDWISE_DB")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<run::Command>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = Paths::resolve()?;
    let settings = Settings::load(&paths).context("Failed to load settings")?;
    logging::init(&settings.log_filter);

    let db_path = match cli.database {
        Some(path) => path,
        None => {
            paths.ensure_base_dir().with_context(|| {
                format!(
                    "Failed to create data directory: {}",
                    paths.base_dir().display()
                )
            })?;
            settings.database_path(&paths)
        }
    };
    let db = Database::open(&db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

    let mut session = engine::sign_in_or_register(&db, &cli.user)
        .with_context(|| format!("Failed to sign in as '{}'", cli.user))?;

    let result = run::as_cli(cli.command.unwrap_or_default(), &db, &session);
    session.invalidate();
    result
}
