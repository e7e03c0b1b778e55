// ABOUTME: Entry point for the petstore binary.
// ABOUTME: Parses CLI arguments, initializes tracing, and runs one command against the gateway.

mod commands;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use petstore_store::PetGateway;
use tracing_subscriber::EnvFilter;

use crate::commands::Command;
use crate::config::PetstoreConfig;

#[derive(Debug, Parser)]
#[command(name = "petstore", version, about = "Manage locally stored pet records")]
struct Cli {
    /// Data directory holding pets.db
    #[arg(long, global = true, env = "PETSTORE_HOME")]
    home: Option<PathBuf>,

    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("petstore=info,petstore_store=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = PetstoreConfig::from_env()?;
    if let Some(home) = cli.home {
        config.home = home;
    }
    tracing::debug!(path = %config.database_path().display(), authority = %config.authority, "petstore starting up");

    let gateway = Arc::new(PetGateway::open(
        config.database_path(),
        &config.authority,
    ));
    let mut changes = gateway.subscribe();

    // Gateway calls block on SQLite, so keep them off the async workers.
    let worker = Arc::clone(&gateway);
    let command = cli.command;
    let json = cli.json;
    let output =
        tokio::task::spawn_blocking(move || commands::run(&worker, command, json)).await??;
    print!("{output}");

    while let Ok(change) = changes.try_recv() {
        tracing::info!(uri = %change.uri, kind = ?change.kind, rows = change.rows, "change observed");
    }

    Ok(())
}
