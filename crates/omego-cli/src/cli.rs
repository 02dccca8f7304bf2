//! CLI argument definitions using clap derive API

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// omego - OMERO database administration
#[derive(Parser, Debug)]
#[command(name = "omego")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// More logging, repeat for more
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Less logging, repeat for less
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// Config file (default: omego.yml in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Administer an OMERO database
    Db(DbArgs),

    /// Print the omego version
    Version,
}

/// Arguments for the db command
#[derive(Args, Debug, Clone)]
pub struct DbArgs {
    /// Database action
    #[arg(value_enum)]
    pub action: DbAction,

    /// Report what would be done without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Root directory of the OMERO server
    #[arg(long, env = "OMEGO_SERVERDIR")]
    pub serverdir: Option<PathBuf>,

    /// Database host (default: this host's name)
    #[arg(long, env = "OMEGO_DBHOST")]
    pub dbhost: Option<String>,

    /// Database name
    #[arg(long, env = "OMEGO_DBNAME")]
    pub dbname: Option<String>,

    /// Database user
    #[arg(long, env = "OMEGO_DBUSER")]
    pub dbuser: Option<String>,

    /// Database password
    #[arg(long, env = "OMEGO_DBPASS", hide_env_values = true)]
    pub dbpass: Option<String>,

    /// SQL script creating a new database, generated if missing
    #[arg(long)]
    pub omerosql: Option<String>,

    /// OMERO root password for a generated creation script
    #[arg(long)]
    pub rootpass: Option<String>,

    /// Initialise or upgrade the database as needed
    #[arg(long)]
    pub managedb: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Database actions
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbAction {
    /// Create a new database
    Init,
    /// Upgrade to the latest schema, or with --dry-run report the status
    Upgrade,
    /// Dump the database to a file
    Dump,
}

/// Report output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
