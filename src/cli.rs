use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "symtrail")]
#[command(about = "Record code-navigation facts into a symbol database.")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Writer configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show writer version and supported database version
    Version,

    /// Clear a database and record the sample C++ facts into it
    Demo {
        /// Database file to (re)create
        database: String,

        /// Source file the facts point into
        source: String,

        /// Refuse to run unless this matches the supported database version
        #[arg(long)]
        db_version: Option<i64>,
    },

    /// Row counts of an existing database
    Stats {
        /// Database file to inspect
        database: String,
    },
}
