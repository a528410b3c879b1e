mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so stdout stays clean for --json output.
    // Only warnings show by default; RUST_LOG=debug traces every new identity.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Command::Version => commands::cmd_version(cli.json),
        Command::Demo {
            database,
            source,
            db_version,
        } => commands::cmd_demo(&database, &source, db_version, config, cli.json),
        Command::Stats { database } => commands::cmd_stats(&database, config, cli.json),
    }
}
